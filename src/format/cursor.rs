// Forward-only cursor over an immutable byte buffer.
//
// All multi-byte integers are little-endian. Strings are single-byte
// (Latin-1) code units: every byte maps to the char with the same code
// point, no UTF-8 decoding is attempted.

use crate::error::{DecodeError, Result};

use super::varint::{self, VarIntError};

/// Bounded read cursor. Offsets reported in errors are absolute: the
/// cursor's `base` is added to its local position, so a cursor opened over
/// a sub-slice of a larger buffer reports offsets in the outer buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at position 0.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_base(bytes, 0)
    }

    /// Create a cursor over `bytes`, which start at `base` in an outer buffer.
    pub fn with_base(bytes: &'a [u8], base: usize) -> Self {
        Self {
            bytes,
            pos: 0,
            base,
        }
    }

    /// Local position within this cursor's buffer.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Absolute offset of the next byte to be read.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Unread bytes remaining.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Read exactly `n` bytes and advance.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(DecodeError::UnexpectedEndOfInput {
                offset: self.offset(),
                needed: n,
                remaining: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.bytes[start..self.pos])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let raw = self.read_exact(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(raw);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_exact(1)?[0])
    }

    /// Read a 7-bit encoded `u32`.
    pub fn read_var_u32(&mut self) -> Result<u32> {
        let offset = self.offset();
        match varint::read_u32(&self.bytes[self.pos..]) {
            Ok((val, consumed)) => {
                self.pos += consumed;
                Ok(val)
            }
            Err(VarIntError::Overflow) => Err(DecodeError::MalformedVarInt { offset }),
            Err(VarIntError::Underflow) => Err(DecodeError::UnexpectedEndOfInput {
                offset: self.base + self.bytes.len(),
                needed: 1,
                remaining: 0,
            }),
        }
    }

    /// Read a 7-bit encoded integer and reinterpret it as signed.
    pub fn read_var_i32(&mut self) -> Result<i32> {
        Ok(self.read_var_u32()? as i32)
    }

    pub fn read_i16_le(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read eight bytes as a raw 64-bit value. The bits are carried
    /// through untouched.
    pub fn read_i64_le(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// Read an IEEE-754 single. The four wire bytes are reversed into a
    /// scratch buffer which is then read most-significant byte first.
    pub fn read_f32(&mut self) -> Result<f32> {
        let mut scratch: [u8; 4] = self.read_array()?;
        scratch.reverse();
        Ok(f32::from_be_bytes(scratch))
    }

    /// Read an IEEE-754 double, byte-reversed like [`Self::read_f32`].
    pub fn read_f64(&mut self) -> Result<f64> {
        let mut scratch: [u8; 8] = self.read_array()?;
        scratch.reverse();
        Ok(f64::from_be_bytes(scratch))
    }

    /// Read a string whose length is a single byte (0..=255).
    pub fn read_short_string(&mut self) -> Result<String> {
        let len = self.read_u8()?;
        self.read_latin1(len as usize)
    }

    /// Read a string whose length is a 7-bit encoded integer.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_var_u32()?;
        self.read_latin1(len as usize)
    }

    fn read_latin1(&mut self, len: usize) -> Result<String> {
        let raw = self.read_exact(len)?;
        Ok(raw.iter().copied().map(char::from).collect())
    }

    /// Read a single-byte char. Bytes above 0x7F become U+FFFD.
    pub fn read_char(&mut self) -> Result<char> {
        let byte = self.read_u8()?;
        Ok(if byte > 0x7F {
            char::REPLACEMENT_CHARACTER
        } else {
            char::from(byte)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_little_endian() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xFF];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(cur.read_i16_le().unwrap(), 0x1234);
        assert_eq!(cur.read_i32_le().unwrap(), 0x1234_5678);
        assert_eq!(cur.pos(), 6);
        assert!(!cur.at_end());
        assert_eq!(cur.read_u8().unwrap(), 0xFF);
        assert!(cur.at_end());
    }

    #[test]
    fn int64_keeps_all_bits() {
        let ticks: i64 = 0x08D9_7A3C_1234_5678;
        let data = ticks.to_le_bytes();
        let mut cur = ByteCursor::new(&data);
        assert_eq!(cur.read_i64_le().unwrap(), ticks);
    }

    #[test]
    fn single_from_reversed_bytes() {
        let data = [0x00, 0x00, 0x80, 0x3F];
        assert_eq!(ByteCursor::new(&data).read_f32().unwrap(), 1.0);
    }

    #[test]
    fn double_from_reversed_bytes() {
        let data = (-2.5f64).to_le_bytes();
        assert_eq!(ByteCursor::new(&data).read_f64().unwrap(), -2.5);
    }

    #[test]
    fn strings_are_latin1() {
        let data = [0x03, b'a', 0xE9, b'z', 0x02, b'h', b'i'];
        let mut cur = ByteCursor::new(&data);
        assert_eq!(cur.read_short_string().unwrap(), "a\u{e9}z");
        assert_eq!(cur.read_string().unwrap(), "hi");
        assert!(cur.at_end());
    }

    #[test]
    fn high_char_becomes_replacement() {
        let mut cur = ByteCursor::new(&[b'A', 0x80]);
        assert_eq!(cur.read_char().unwrap(), 'A');
        assert_eq!(cur.read_char().unwrap(), '\u{FFFD}');
    }

    #[test]
    fn short_read_reports_absolute_offset() {
        let mut cur = ByteCursor::with_base(&[0x01, 0x02], 40);
        cur.read_u8().unwrap();
        let err = cur.read_i32_le().unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedEndOfInput {
                offset: 41,
                needed: 4,
                remaining: 1,
            }
        );
        // Failed reads leave the position alone.
        assert_eq!(cur.pos(), 1);
    }

    #[test]
    fn string_length_past_end_fails() {
        let mut cur = ByteCursor::new(&[0x05, b'a', b'b']);
        assert!(matches!(
            cur.read_string(),
            Err(DecodeError::UnexpectedEndOfInput { needed: 5, .. })
        ));
    }

    #[test]
    fn malformed_varint_reports_start() {
        let data = [0x00, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00];
        let mut cur = ByteCursor::new(&data);
        cur.read_u8().unwrap();
        assert_eq!(
            cur.read_var_u32(),
            Err(DecodeError::MalformedVarInt { offset: 1 })
        );
    }

    #[test]
    fn var_i32_reinterprets_sign() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x0F];
        assert_eq!(ByteCursor::new(&data).read_var_i32().unwrap(), -1);
    }
}
