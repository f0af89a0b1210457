// BPS patch application.
//
// Single pass over the command region with three cursors: the output
// position and the two signed copy cursors. Bounds violations are hard
// errors; checksum and size diagnostics after execution are soft
// warnings returned alongside the decoded target, so a caller patching
// a close-but-not-identical source still gets a candidate output.
//
// Performance notes:
//   - Output Vec is pre-sized to the declared target length
//   - Non-overlapping TargetCopy uses extend_from_within (bulk copy)
//   - Overlapping TargetCopy is byte-by-byte so reads observe bytes
//     written earlier by the same command (run-length expansion)

use super::checksum::{PATCH_SELF_CRC, crc32};
use super::command::{self, CommandIterator, SOURCE_COPY, SOURCE_READ, TARGET_COPY, TARGET_READ};
use super::header::{MAX_INPUT_SIZE, PatchHeader, PatchTrailer, TRAILER_LEN};
use super::varint;

// ---------------------------------------------------------------------------
// Decoder error
// ---------------------------------------------------------------------------

/// Hard decode failures. These abort the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Magic absent, short, or corrupt.
    BadHeader,
    /// A varint or command read past the end of the patch, or command
    /// execution would read outside the source or write past the
    /// declared target size.
    Truncated,
    /// The header's declared source size differs from the actual source.
    SizeMismatch { declared: usize, actual: usize },
    /// A declared or actual size exceeds the 2^31-1 limit.
    SizeOverflow,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadHeader => write!(f, "not a BPS patch (bad or missing header)"),
            Self::Truncated => write!(f, "patch is truncated or commands run out of bounds"),
            Self::SizeMismatch { declared, actual } => {
                write!(
                    f,
                    "source size mismatch: patch expects {declared} bytes, got {actual}"
                )
            }
            Self::SizeOverflow => write!(f, "size exceeds the 2^31-1 byte limit"),
        }
    }
}

impl std::error::Error for DecodeError {}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Soft diagnostics accumulated during decode.
///
/// None of these abort the operation: CRC mismatches are diagnostic,
/// not authorization. The caller may escalate them to failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// The command stream produced a different number of bytes than the
    /// header declared.
    TargetSizeMismatch { declared: usize, actual: usize },
    /// The supplied source does not match the CRC the patch was made from.
    SourceCrcMismatch { expected: u32, actual: u32 },
    /// The produced target does not match the CRC stored in the trailer.
    TargetCrcMismatch { expected: u32, actual: u32 },
    /// The patch file itself fails its self-check.
    PatchCrcMismatch { actual: u32 },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetSizeMismatch { declared, actual } => {
                write!(f, "target size mismatch: declared {declared}, produced {actual}")
            }
            Self::SourceCrcMismatch { expected, actual } => {
                write!(
                    f,
                    "source CRC32 mismatch: patch expects {expected:#010X}, got {actual:#010X} (wrong source file?)"
                )
            }
            Self::TargetCrcMismatch { expected, actual } => {
                write!(
                    f,
                    "target CRC32 mismatch: expected {expected:#010X}, got {actual:#010X}"
                )
            }
            Self::PatchCrcMismatch { actual } => {
                write!(
                    f,
                    "patch CRC32 self-check failed: residue {actual:#010X}, expected {PATCH_SELF_CRC:#010X}"
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Decode output
// ---------------------------------------------------------------------------

/// The reconstructed target plus any soft diagnostics.
#[derive(Debug, Clone)]
pub struct DecodeOutput {
    /// The reconstructed target bytes.
    pub target: Vec<u8>,
    /// Diagnostics, empty for a clean decode.
    pub warnings: Vec<Warning>,
}

// ---------------------------------------------------------------------------
// Patch inspection
// ---------------------------------------------------------------------------

/// A parsed-but-not-applied patch: header, trailer, and command region.
#[derive(Debug, Clone)]
pub struct Patch<'a> {
    pub header: PatchHeader,
    pub trailer: PatchTrailer,
    commands: &'a [u8],
}

impl<'a> Patch<'a> {
    /// Parse the framing of a complete patch without executing it.
    pub fn parse(patch: &'a [u8]) -> Result<Self, DecodeError> {
        if patch.len() > MAX_INPUT_SIZE {
            return Err(DecodeError::SizeOverflow);
        }
        let (header, cmd_start) = PatchHeader::parse(patch)?;
        let trailer = PatchTrailer::parse(patch)?;
        Ok(Self {
            header,
            trailer,
            commands: &patch[cmd_start..patch.len() - TRAILER_LEN],
        })
    }

    /// Iterate over the patch's commands.
    pub fn commands(&self) -> CommandIterator<'a> {
        CommandIterator::new(self.commands)
    }
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Apply `patch` to `source`, reconstructing the target.
///
/// Hard errors abort; checksum and size diagnostics come back as
/// warnings next to the decoded bytes.
pub fn apply(source: &[u8], patch: &[u8]) -> Result<DecodeOutput, DecodeError> {
    if source.len() > MAX_INPUT_SIZE {
        return Err(DecodeError::SizeOverflow);
    }
    let parsed = Patch::parse(patch)?;
    let header = &parsed.header;
    if header.source_size != source.len() {
        return Err(DecodeError::SizeMismatch {
            declared: header.source_size,
            actual: source.len(),
        });
    }

    let cmds = parsed.commands;
    let mut output: Vec<u8> = Vec::with_capacity(header.target_size);
    let mut pos = 0usize;
    let mut source_offset = 0usize;
    let mut target_offset = 0usize;

    while pos < cmds.len() {
        let (action, length, n) = command::read_op(&cmds[pos..])?;
        pos += n;

        // Every command writes `length` bytes; never past the declared size.
        if length > header.target_size - output.len() {
            return Err(DecodeError::Truncated);
        }

        match action {
            SOURCE_READ => {
                let start = output.len();
                let data = source
                    .get(start..start + length)
                    .ok_or(DecodeError::Truncated)?;
                output.extend_from_slice(data);
            }
            TARGET_READ => {
                let end = pos + length;
                if end > cmds.len() {
                    return Err(DecodeError::Truncated);
                }
                output.extend_from_slice(&cmds[pos..end]);
                pos = end;
            }
            SOURCE_COPY => {
                let (delta, n) = varint::read_i64(&cmds[pos..]).map_err(command::map_varint)?;
                pos += n;
                source_offset = seek(source_offset, delta)?;
                let data = source
                    .get(source_offset..source_offset + length)
                    .ok_or(DecodeError::Truncated)?;
                output.extend_from_slice(data);
                source_offset += length;
            }
            TARGET_COPY => {
                let (delta, n) = varint::read_i64(&cmds[pos..]).map_err(command::map_varint)?;
                pos += n;
                target_offset = seek(target_offset, delta)?;
                if target_offset >= output.len() {
                    return Err(DecodeError::Truncated);
                }
                if target_offset + length <= output.len() {
                    // Non-overlapping: bulk copy.
                    output.extend_from_within(target_offset..target_offset + length);
                } else {
                    // Overlapping: each write feeds the reads after it.
                    for i in 0..length {
                        let byte = output[target_offset + i];
                        output.push(byte);
                    }
                }
                target_offset += length;
            }
            _ => unreachable!(),
        }
    }

    // Post-execution validation: diagnostic, never fatal.
    let mut warnings = Vec::new();
    if output.len() != header.target_size {
        warnings.push(Warning::TargetSizeMismatch {
            declared: header.target_size,
            actual: output.len(),
        });
    }
    let source_crc = crc32(source);
    if source_crc != parsed.trailer.source_crc {
        warnings.push(Warning::SourceCrcMismatch {
            expected: parsed.trailer.source_crc,
            actual: source_crc,
        });
    }
    let target_crc = crc32(&output);
    if target_crc != parsed.trailer.target_crc {
        warnings.push(Warning::TargetCrcMismatch {
            expected: parsed.trailer.target_crc,
            actual: target_crc,
        });
    }
    let self_crc = crc32(patch);
    if self_crc != PATCH_SELF_CRC {
        warnings.push(Warning::PatchCrcMismatch { actual: self_crc });
    }

    Ok(DecodeOutput {
        target: output,
        warnings,
    })
}

/// Move a copy cursor by a signed delta, keeping it within 0..=2^31-1.
#[inline]
fn seek(cursor: usize, delta: i64) -> Result<usize, DecodeError> {
    match (cursor as i64).checked_add(delta) {
        Some(moved) if (0..=MAX_INPUT_SIZE as i64).contains(&moved) => Ok(moved as usize),
        _ => Err(DecodeError::Truncated),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
