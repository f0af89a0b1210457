// BPS patch header and trailer encoding/parsing.
//
// Layout:
//
//   offset 0:    magic "BPS1"
//                varint  source size
//                varint  target size
//                varint  metadata size
//                metadata bytes (opaque UTF-8, preserved byte-exactly)
//                (command stream)
//   offset L-12: CRC32(source)         4 bytes LE
//   offset L-8:  CRC32(target)         4 bytes LE
//   offset L-4:  CRC32(patch[0..L-4])  4 bytes LE

use std::io::{self, Write};

use super::decoder::DecodeError;
use super::varint::{self, VarIntError};

/// Patch file magic.
pub const MAGIC: [u8; 4] = *b"BPS1";

/// Trailer length: three little-endian CRC32 values.
pub const TRAILER_LEN: usize = 12;

/// Smallest well-formed patch: magic + three one-byte size varints + trailer.
pub const MIN_PATCH_SIZE: usize = 4 + 3 + TRAILER_LEN;

/// Upper bound on source, target, and patch sizes (signed 32-bit limit).
pub const MAX_INPUT_SIZE: usize = i32::MAX as usize;

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Parsed BPS patch header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchHeader {
    /// Declared source size in bytes.
    pub source_size: usize,
    /// Declared target size in bytes.
    pub target_size: usize,
    /// Metadata bytes, opaque to the codec.
    pub metadata: Vec<u8>,
}

impl PatchHeader {
    /// Encode the header to a writer.
    pub fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        varint::write_usize(w, self.source_size)?;
        varint::write_usize(w, self.target_size)?;
        varint::write_usize(w, self.metadata.len())?;
        w.write_all(&self.metadata)
    }

    /// Encoded length in bytes.
    pub fn encoded_len(&self) -> usize {
        4 + varint::sizeof_u64(self.source_size as u64)
            + varint::sizeof_u64(self.target_size as u64)
            + varint::sizeof_u64(self.metadata.len() as u64)
            + self.metadata.len()
    }

    /// Parse a header from the front of a complete patch.
    ///
    /// Returns the header and the offset of the first command byte.
    /// The size varints and metadata must not run into the trailer region.
    pub fn parse(patch: &[u8]) -> Result<(Self, usize), DecodeError> {
        if patch.len() < MIN_PATCH_SIZE {
            return Err(DecodeError::BadHeader);
        }
        if patch[..4] != MAGIC {
            return Err(DecodeError::BadHeader);
        }

        let body = &patch[..patch.len() - TRAILER_LEN];
        let mut pos = 4;

        let (source_size, n) = read_size(&body[pos..])?;
        pos += n;
        let (target_size, n) = read_size(&body[pos..])?;
        pos += n;
        let (metadata_size, n) = read_size(&body[pos..])?;
        pos += n;

        if target_size > MAX_INPUT_SIZE || source_size > MAX_INPUT_SIZE {
            return Err(DecodeError::SizeOverflow);
        }
        if metadata_size > body.len() - pos {
            return Err(DecodeError::Truncated);
        }
        let metadata = body[pos..pos + metadata_size].to_vec();
        pos += metadata_size;

        Ok((
            Self {
                source_size,
                target_size,
                metadata,
            },
            pos,
        ))
    }
}

fn read_size(data: &[u8]) -> Result<(usize, usize), DecodeError> {
    varint::read_usize(data).map_err(|e| match e {
        VarIntError::Underflow => DecodeError::Truncated,
        VarIntError::Overflow => DecodeError::SizeOverflow,
    })
}

// ---------------------------------------------------------------------------
// Trailer
// ---------------------------------------------------------------------------

/// Parsed BPS patch trailer: three CRC32 values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchTrailer {
    /// CRC32 of the source the patch was made from.
    pub source_crc: u32,
    /// CRC32 of the target the patch produces.
    pub target_crc: u32,
    /// CRC32 of the patch itself, excluding this field.
    pub patch_crc: u32,
}

impl PatchTrailer {
    /// Parse the trailer from the last 12 bytes of a patch.
    pub fn parse(patch: &[u8]) -> Result<Self, DecodeError> {
        if patch.len() < MIN_PATCH_SIZE {
            return Err(DecodeError::BadHeader);
        }
        let t = &patch[patch.len() - TRAILER_LEN..];
        Ok(Self {
            source_crc: u32::from_le_bytes([t[0], t[1], t[2], t[3]]),
            target_crc: u32::from_le_bytes([t[4], t[5], t[6], t[7]]),
            patch_crc: u32::from_le_bytes([t[8], t[9], t[10], t[11]]),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn with_trailer(mut body: Vec<u8>) -> Vec<u8> {
        body.extend_from_slice(&[0u8; TRAILER_LEN]);
        body
    }

    #[test]
    fn header_roundtrip() {
        let hdr = PatchHeader {
            source_size: 1000,
            target_size: 2000,
            metadata: b"{\"name\":\"demo\"}".to_vec(),
        };
        let mut buf = Vec::new();
        hdr.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), hdr.encoded_len());

        let patch = with_trailer(buf);
        let (parsed, cmd_start) = PatchHeader::parse(&patch).unwrap();
        assert_eq!(parsed, hdr);
        assert_eq!(cmd_start, patch.len() - TRAILER_LEN);
    }

    #[test]
    fn empty_header_is_minimum_size() {
        let hdr = PatchHeader::default();
        let mut buf = Vec::new();
        hdr.encode(&mut buf).unwrap();
        assert_eq!(buf.len() + TRAILER_LEN, MIN_PATCH_SIZE);
    }

    #[test]
    fn rejects_short_patch() {
        assert_eq!(
            PatchHeader::parse(&[0u8; MIN_PATCH_SIZE - 1]),
            Err(DecodeError::BadHeader)
        );
    }

    #[test]
    fn rejects_bad_magic() {
        let patch = with_trailer(b"BPS2\x80\x80\x80".to_vec());
        assert_eq!(PatchHeader::parse(&patch), Err(DecodeError::BadHeader));
    }

    #[test]
    fn rejects_metadata_into_trailer() {
        let mut body = MAGIC.to_vec();
        varint::write_usize(&mut body, 0).unwrap();
        varint::write_usize(&mut body, 1).unwrap();
        varint::write_usize(&mut body, 100).unwrap(); // larger than remaining body
        let patch = with_trailer(body);
        assert_eq!(PatchHeader::parse(&patch), Err(DecodeError::Truncated));
    }

    #[test]
    fn rejects_oversized_target() {
        let mut body = MAGIC.to_vec();
        varint::write_usize(&mut body, 0).unwrap();
        varint::write_u64(&mut body, MAX_INPUT_SIZE as u64 + 1).unwrap();
        varint::write_usize(&mut body, 0).unwrap();
        let patch = with_trailer(body);
        assert_eq!(PatchHeader::parse(&patch), Err(DecodeError::SizeOverflow));
    }

    #[test]
    fn trailer_is_little_endian() {
        let mut patch = vec![0u8; MIN_PATCH_SIZE];
        let n = patch.len();
        patch[n - 12..n - 8].copy_from_slice(&[0x78, 0x56, 0x34, 0x12]);
        patch[n - 8..n - 4].copy_from_slice(&[0xEF, 0xBE, 0xAD, 0xDE]);
        patch[n - 4..].copy_from_slice(&[0x01, 0x00, 0x00, 0x00]);
        let t = PatchTrailer::parse(&patch).unwrap();
        assert_eq!(t.source_crc, 0x12345678);
        assert_eq!(t.target_crc, 0xDEADBEEF);
        assert_eq!(t.patch_crc, 1);
    }
}
