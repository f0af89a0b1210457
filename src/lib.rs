//! Bpsdelta: BPS v1 binary patch encoding/decoding in Rust.
//!
//! The crate provides:
//! - The BPS patch format core (`bps`)
//! - Substring-search back-ends for the encoder (`search`)
//! - High-level one-call APIs (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! let source = b"hello old world";
//! let target = b"hello new world";
//!
//! let patch = bpsdelta::encode(source, target, "").unwrap();
//! let decoded = bpsdelta::decode(source, &patch).unwrap();
//! assert_eq!(decoded.target, target);
//! assert!(decoded.warnings.is_empty());
//! ```

pub mod bps;
pub mod engine;
pub mod io;
pub mod search;

#[cfg(feature = "cli")]
pub mod cli;

pub use engine::{decode, encode};
