// File-level helpers for patch creation and application.
//
// BPS requires both inputs fully addressable, so every file is read
// whole into memory before the codec runs; the helpers add size
// book-keeping and typed error wrapping on top of the in-memory API.

use std::path::Path;

use crate::bps::decoder::{self, DecodeError, Warning};
use crate::bps::encoder::{self, EncodeError, EncodeOptions};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    /// Source file size in bytes.
    pub source_size: u64,
    /// Target file size in bytes.
    pub target_size: u64,
    /// Patch output size in bytes.
    pub patch_size: u64,
}

impl EncodeStats {
    /// Patch size as a fraction of the target size.
    pub fn ratio(&self) -> f64 {
        self.patch_size as f64 / self.target_size as f64
    }
}

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// Source file size in bytes.
    pub source_size: u64,
    /// Patch file size in bytes.
    pub patch_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// Soft diagnostics from the decode (empty for a clean apply).
    pub warnings: Vec<Warning>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file-level operations.
#[derive(Debug)]
pub enum IoError {
    /// I/O error (file open, read, write).
    Io(std::io::Error),
    /// Patch creation error.
    Encode(EncodeError),
    /// Patch application error.
    Decode(DecodeError),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Encode(e) => write!(f, "encode error: {e}"),
            Self::Decode(e) => write!(f, "decode error: {e}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Decode(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<EncodeError> for IoError {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

impl From<DecodeError> for IoError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// encode_file
// ---------------------------------------------------------------------------

/// Create a patch from a source file and target file, writing it to
/// `patch_path`.
pub fn encode_file(
    source_path: &Path,
    target_path: &Path,
    patch_path: &Path,
    metadata: &str,
    opts: &EncodeOptions,
) -> Result<EncodeStats, IoError> {
    let source = std::fs::read(source_path)?;
    let target = std::fs::read(target_path)?;

    let patch = encoder::create_with_options(&source, &target, metadata, opts)?;
    std::fs::write(patch_path, &patch)?;

    Ok(EncodeStats {
        source_size: source.len() as u64,
        target_size: target.len() as u64,
        patch_size: patch.len() as u64,
    })
}

// ---------------------------------------------------------------------------
// decode_file
// ---------------------------------------------------------------------------

/// Apply a patch file to a source file, writing the reconstructed
/// target to `output_path`.
///
/// Warnings do not prevent the output from being written; they are
/// returned in the stats for the caller to surface.
pub fn decode_file(
    source_path: &Path,
    patch_path: &Path,
    output_path: &Path,
) -> Result<DecodeStats, IoError> {
    let source = std::fs::read(source_path)?;
    let patch = std::fs::read(patch_path)?;

    let out = decoder::apply(&source, &patch)?;
    std::fs::write(output_path, &out.target)?;

    Ok(DecodeStats {
        source_size: source.len() as u64,
        patch_size: patch.len() as u64,
        output_size: out.target.len() as u64,
        warnings: out.warnings,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
