// 7-bit encoded integers.
//
// Base-128, little-endian: least-significant group first. Each byte
// carries seven payload bits; bit 7 marks a continuation. A 32-bit value
// needs at most five bytes, and a fifth byte with its continuation bit set
// is rejected rather than read past.

/// Maximum encoded length of a 32-bit value (ceil(32/7) = 5).
pub const MAX_VARINT_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a `u32` into `buf`, returning the number of bytes written (1..=5).
#[inline]
pub fn encode_u32(mut num: u32, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    while num >= 0x80 {
        buf[i] = (num as u8) | 0x80;
        num >>= 7;
        i += 1;
    }
    buf[i] = num as u8;
    i + 1
}

/// Append the encoding of `num` to `out`.
pub fn write_u32(out: &mut Vec<u8>, num: u32) {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u32(num, &mut buf);
    out.extend_from_slice(&buf[..len]);
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a `u32` from the front of `data`.
/// Returns `(value, bytes_consumed)` or an error.
///
/// Bits shifted past bit 31 by the fifth byte are discarded, matching the
/// 32-bit accumulator of the producer.
pub fn read_u32(data: &[u8]) -> Result<(u32, usize), VarIntError> {
    let mut val: u32 = 0;
    for i in 0..MAX_VARINT_LEN {
        let Some(&byte) = data.get(i) else {
            return Err(VarIntError::Underflow);
        };
        val |= u32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((val, i + 1));
        }
    }
    Err(VarIntError::Overflow)
}

/// Return the encoded byte-length of a `u32` value.
#[inline]
pub fn sizeof_u32(num: u32) -> usize {
    let bits = 32 - num.leading_zeros();
    (bits.max(1).div_ceil(7) as usize).min(MAX_VARINT_LEN)
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarIntError {
    /// Not enough input bytes to complete the integer.
    Underflow,
    /// Continuation bit still set on the fifth byte.
    Overflow,
}

impl std::fmt::Display for VarIntError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarIntError::Underflow => write!(f, "varint underflow (truncated input)"),
            VarIntError::Overflow => write!(f, "varint longer than {MAX_VARINT_LEN} bytes"),
        }
    }
}

impl std::error::Error for VarIntError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
