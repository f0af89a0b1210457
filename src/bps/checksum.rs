// CRC-32/ISO-HDLC wrapper.
//
// The polynomial (reflected 0xEDB88320) is supplied by `crc32fast`.
// One property is load-bearing for patch self-validation: the CRC32 of
// any byte sequence concatenated with its own CRC32 (little-endian) is
// the fixed residue below. The decoder checks the whole patch file
// against it instead of needing an external copy of the patch CRC.

/// CRC32 of `data || crc32(data).to_le_bytes()` for any `data`.
pub const PATCH_SELF_CRC: u32 = 0x2144_DF1C;

/// CRC-32/ISO-HDLC over a byte range.
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        // The standard check value for "123456789".
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn concatenation_identity() {
        for data in [&b""[..], b"a", b"hello world", &[0u8; 1000]] {
            let mut buf = data.to_vec();
            buf.extend_from_slice(&crc32(data).to_le_bytes());
            assert_eq!(crc32(&buf), PATCH_SELF_CRC);
        }
    }
}
