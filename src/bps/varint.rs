// BPS variable-length integer encoding.
//
// Base-128, little-endian: least-significant group first. Each byte has
// bit 7 clear except the final byte. Every group except the last adds a
// bias of 128^(k+1), which makes the encoding unique for every value:
// there is exactly one byte sequence per integer and no short-encoding
// ambiguity.
//
// Signed offsets are sign-magnitude with the sign in bit 0 (not zigzag):
// `((|d|) << 1) | (d < 0)`. +0 and -0 share the encoding `0x80`.

use std::io::{self, Write};

/// Maximum encoded length for a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a `u64` as a BPS variable-length integer into `buf`.
/// Returns the number of bytes written (1..=10).
#[inline]
pub fn encode_u64(mut num: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    loop {
        let b = (num & 0x7F) as u8;
        num >>= 7;
        if num == 0 {
            buf[i] = b | 0x80; // high bit marks the terminator
            return i + 1;
        }
        buf[i] = b;
        i += 1;
        num -= 1; // bias
    }
}

/// Encode a `usize` and write to a `Write` sink.
pub fn write_usize<W: Write>(w: &mut W, num: usize) -> io::Result<()> {
    write_u64(w, num as u64)
}

/// Encode a `u64` and write to a `Write` sink.
pub fn write_u64<W: Write>(w: &mut W, num: u64) -> io::Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(num, &mut buf);
    w.write_all(&buf[..len])
}

/// Encode a signed offset and write to a `Write` sink.
///
/// Sign-magnitude on the low bit: the magnitude must fit in 63 bits,
/// which the 2^31-1 input size limit guarantees for every offset this
/// crate produces.
pub fn write_i64<W: Write>(w: &mut W, num: i64) -> io::Result<()> {
    write_u64(w, (num.unsigned_abs() << 1) | u64::from(num < 0))
}

// ---------------------------------------------------------------------------
// Decoding from byte slices
// ---------------------------------------------------------------------------

/// Decode a `u64` from a byte slice.
/// Returns `(value, bytes_consumed)` or an error.
///
/// Reads at most [`MAX_VARINT_LEN`] bytes, so a malicious run of
/// continuation bytes cannot stall the decoder.
pub fn read_u64(data: &[u8]) -> Result<(u64, usize), VarIntError> {
    let mut result: u64 = 0;
    let mut scale: u64 = 1;
    for (i, &byte) in data.iter().take(MAX_VARINT_LEN).enumerate() {
        let group = u64::from(byte & 0x7F)
            .checked_mul(scale)
            .ok_or(VarIntError::Overflow)?;
        result = result.checked_add(group).ok_or(VarIntError::Overflow)?;
        if byte & 0x80 != 0 {
            return Ok((result, i + 1));
        }
        scale = scale.checked_mul(128).ok_or(VarIntError::Overflow)?;
        result = result.checked_add(scale).ok_or(VarIntError::Overflow)?;
    }
    // A 10th continuation byte is caught above by the scale multiply
    // overflowing, so falling out of the loop means truncated input.
    Err(VarIntError::Underflow)
}

/// Decode a `usize` from a byte slice.
pub fn read_usize(data: &[u8]) -> Result<(usize, usize), VarIntError> {
    let (val, len) = read_u64(data)?;
    let val = usize::try_from(val).map_err(|_| VarIntError::Overflow)?;
    Ok((val, len))
}

/// Decode a signed offset from a byte slice.
pub fn read_i64(data: &[u8]) -> Result<(i64, usize), VarIntError> {
    let (val, len) = read_u64(data)?;
    let mag = (val >> 1) as i64;
    Ok((if val & 1 != 0 { -mag } else { mag }, len))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Return the encoded byte-length of a `u64` value.
#[inline]
pub fn sizeof_u64(num: u64) -> usize {
    let mut buf = [0u8; MAX_VARINT_LEN];
    encode_u64(num, &mut buf)
}

/// Return the encoded byte-length of a signed offset.
#[inline]
pub fn sizeof_i64(num: i64) -> usize {
    sizeof_u64((num.unsigned_abs() << 1) | u64::from(num < 0))
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarIntError {
    /// Not enough input bytes to complete the integer.
    Underflow,
    /// Value would overflow the target integer type.
    Overflow,
}

impl std::fmt::Display for VarIntError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarIntError::Underflow => write!(f, "varint underflow (truncated input)"),
            VarIntError::Overflow => write!(f, "varint overflow"),
        }
    }
}

impl std::error::Error for VarIntError {}

impl From<VarIntError> for io::Error {
    fn from(e: VarIntError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
