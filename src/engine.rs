// High-level encode/decode entry points.
//
// Thin orchestration over the format core: pick a search backend from
// the input size, run the encoder or decoder, hand back the result.

use crate::bps::decoder::{self, DecodeError, DecodeOutput};
use crate::bps::encoder::{self, EncodeError, EncodeOptions};

/// Create a patch that rebuilds `target` from `source`.
///
/// The search backend is chosen from the source size; use
/// [`encoder::create_with_options`] to pick one explicitly. Zero-length
/// sources are permitted, zero-length targets are not.
pub fn encode(source: &[u8], target: &[u8], metadata: &str) -> Result<Vec<u8>, EncodeError> {
    encoder::create_with_options(source, target, metadata, &EncodeOptions::default())
}

/// Apply `patch` to `source`, reconstructing the target.
///
/// Returns the decoded bytes together with any soft diagnostics
/// (checksum or size mismatches). Hard framing errors abort.
pub fn decode(source: &[u8], patch: &[u8]) -> Result<DecodeOutput, DecodeError> {
    decoder::apply(source, patch)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
