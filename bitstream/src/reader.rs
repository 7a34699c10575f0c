//! Bit-level reader with bounded operations.

use crate::error::{BitError, BitResult};
use crate::{UBIT_VAR_WIDTHS, VAR_INT_MAX_GROUPS};

/// A bit-level reader for decoding low-bit-first packed data.
///
/// A reader is a window `[start, end)` over a borrowed byte slice. Views
/// created with [`read_bit_stream`](Self::read_bit_stream) share the same
/// bytes and only differ in their window, so nothing is copied.
///
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    start: usize,
    end: usize,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` over every bit of a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            start: 0,
            end: data.len() * 8,
            pos: 0,
        }
    }

    /// Creates a reader over the first `bits` bits of a byte slice.
    pub fn with_bit_len(data: &'a [u8], bits: usize) -> BitResult<Self> {
        let available = data.len().saturating_mul(8);
        if bits > available {
            return Err(BitError::UnexpectedEof {
                requested: bits,
                available,
            });
        }
        Ok(Self {
            data,
            start: 0,
            end: bits,
            pos: 0,
        })
    }

    /// Returns the length of this stream in bits.
    #[must_use]
    pub const fn bit_len(&self) -> usize {
        self.end - self.start
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.end - self.pos
    }

    /// Returns `true` if there are no more bits to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns the current bit position, relative to the stream start.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.pos - self.start
    }

    /// Moves the cursor to `position` bits from the stream start.
    ///
    /// Seeking to exactly the end of the stream is allowed.
    pub fn set_position(&mut self, position: usize) -> BitResult<()> {
        if position > self.bit_len() {
            return Err(BitError::SeekOutOfRange {
                position,
                len: self.bit_len(),
            });
        }
        self.pos = self.start + position;
        Ok(())
    }

    /// Advances the cursor by `bits` without decoding them.
    pub fn skip_bits(&mut self, bits: usize) -> BitResult<()> {
        self.ensure_bits(bits)?;
        self.pos += bits;
        Ok(())
    }

    /// Reads a single bit as a boolean.
    pub fn read_bool(&mut self) -> BitResult<bool> {
        self.ensure_bits(1)?;
        let bit = (self.data[self.pos / 8] >> (self.pos % 8)) & 1;
        self.pos += 1;
        Ok(bit == 1)
    }

    /// Reads up to 64 bits as an unsigned integer, least significant bit first.
    pub fn read_bits(&mut self, bits: usize) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        self.ensure_bits(bits)?;

        let mut value = 0u64;
        let mut filled = 0;
        while filled < bits {
            let offset = self.pos % 8;
            let take = (8 - offset).min(bits - filled);
            let chunk = u64::from(self.data[self.pos / 8] >> offset) & ((1u64 << take) - 1);
            value |= chunk << filled;
            filled += take;
            self.pos += take;
        }
        Ok(value)
    }

    /// Reads a two's complement signed integer of `bits` width.
    pub fn read_signed_bits(&mut self, bits: usize) -> BitResult<i64> {
        let raw = self.read_bits(bits)?;
        if bits == 0 || bits == 64 {
            return Ok(raw as i64);
        }
        if raw & (1u64 << (bits - 1)) == 0 {
            Ok(raw as i64)
        } else {
            Ok(raw as i64 - (1i64 << bits))
        }
    }

    /// Reads an 8-bit unsigned integer.
    pub fn read_u8(&mut self) -> BitResult<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Reads a 16-bit unsigned integer.
    pub fn read_u16(&mut self) -> BitResult<u16> {
        Ok(self.read_bits(16)? as u16)
    }

    /// Reads a 32-bit unsigned integer.
    pub fn read_u32(&mut self) -> BitResult<u32> {
        Ok(self.read_bits(32)? as u32)
    }

    /// Reads a 32-bit signed integer.
    pub fn read_i32(&mut self) -> BitResult<i32> {
        Ok(self.read_bits(32)? as u32 as i32)
    }

    /// Reads a 32-bit IEEE 754 float.
    pub fn read_f32(&mut self) -> BitResult<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Reads `count` whole bytes.
    pub fn read_bytes(&mut self, count: usize) -> BitResult<Vec<u8>> {
        self.ensure_bits(count.saturating_mul(8))?;
        (0..count).map(|_| self.read_u8()).collect()
    }

    /// Reads the raw bytes of a string.
    ///
    /// With `None` the string is null terminated and the terminator is consumed.
    /// With `Some(len)` exactly `len` bytes are consumed and the text ends at the
    /// first null byte.
    pub fn read_string_bytes(&mut self, len: Option<usize>) -> BitResult<Vec<u8>> {
        let mut out = Vec::new();
        match len {
            Some(len) => {
                self.ensure_bits(len.saturating_mul(8))?;
                let mut terminated = false;
                for _ in 0..len {
                    let byte = self.read_u8()?;
                    if byte == 0 {
                        terminated = true;
                    }
                    if !terminated {
                        out.push(byte);
                    }
                }
            }
            None => loop {
                let byte = self.read_u8()?;
                if byte == 0 {
                    break;
                }
                out.push(byte);
            },
        }
        Ok(out)
    }

    /// Reads a string, see [`read_string_bytes`](Self::read_string_bytes).
    ///
    /// Invalid UTF-8 sequences are replaced.
    pub fn read_string(&mut self, len: Option<usize>) -> BitResult<String> {
        let bytes = self.read_string_bytes(len)?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        })
    }

    /// Splits off a view of the next `bits` bits and advances past them.
    ///
    /// The view borrows the same bytes as `self`.
    pub fn read_bit_stream(&mut self, bits: usize) -> BitResult<Self> {
        self.ensure_bits(bits)?;
        let view = Self {
            data: self.data,
            start: self.pos,
            end: self.pos + bits,
            pos: self.pos,
        };
        self.pos += bits;
        Ok(view)
    }

    /// Copies the next `bits` bits into an owned [`BitBuf`](crate::BitBuf).
    pub fn read_bit_buf(&mut self, bits: usize) -> BitResult<crate::BitBuf> {
        self.ensure_bits(bits)?;
        let mut bytes = Vec::with_capacity(bits.div_ceil(8));
        let mut left = bits;
        while left > 0 {
            let take = left.min(8);
            bytes.push(self.read_bits(take)? as u8);
            left -= take;
        }
        crate::BitBuf::from_bits(bytes, bits)
    }

    /// Reads a protocol varint: up to five 8-bit groups holding 7 payload bits
    /// and a continuation marker, least significant group first.
    pub fn read_var_int(&mut self) -> BitResult<u32> {
        let mut result = 0u32;
        for group in 0..VAR_INT_MAX_GROUPS {
            let byte = self.read_u8()?;
            result |= u32::from(byte & 0x7F) << (7 * group);
            if byte & 0x80 == 0 {
                break;
            }
        }
        Ok(result)
    }

    /// Reads a zigzag encoded protocol varint.
    pub fn read_var_int_signed(&mut self) -> BitResult<i32> {
        let value = self.read_var_int()?;
        Ok(((value >> 1) as i32) ^ (-((value & 1) as i32)))
    }

    /// Reads a selector-prefixed integer: a 2-bit selector picks a 4, 8, 12
    /// or 32-bit payload.
    pub fn read_ubit_var(&mut self) -> BitResult<u32> {
        let selector = self.read_bits(2)? as usize;
        Ok(self.read_bits(UBIT_VAR_WIDTHS[selector])? as u32)
    }

    fn ensure_bits(&self, bits: usize) -> BitResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(BitError::UnexpectedEof {
                requested: bits,
                available,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reader() {
        let reader = BitReader::new(&[]);
        assert!(reader.is_empty());
        assert_eq!(reader.bits_remaining(), 0);
        assert_eq!(reader.bit_position(), 0);
    }

    #[test]
    fn read_from_empty_fails() {
        let mut reader = BitReader::new(&[]);
        let result = reader.read_bool();
        assert!(matches!(result, Err(BitError::UnexpectedEof { .. })));
    }

    #[test]
    fn reads_low_bit_first() {
        let mut reader = BitReader::new(&[0b0000_0101]);
        assert!(reader.read_bool().unwrap());
        assert!(!reader.read_bool().unwrap());
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_bits(5).unwrap(), 0);
    }

    #[test]
    fn read_bits_across_bytes() {
        let mut reader = BitReader::new(&[0b1111_0000, 0b0000_1111]);
        assert_eq!(reader.read_bits(4).unwrap(), 0);
        assert_eq!(reader.read_bits(8).unwrap(), 0xFF);
        assert_eq!(reader.bits_remaining(), 4);
    }

    #[test]
    fn read_u32_little_endian() {
        let mut reader = BitReader::new(&[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
    }

    #[test]
    fn read_signed_bits_sign_extends() {
        let mut reader = BitReader::new(&[0b0000_1111]);
        assert_eq!(reader.read_signed_bits(4).unwrap(), -1);
        assert_eq!(reader.read_signed_bits(4).unwrap(), 0);
    }

    #[test]
    fn read_string_null_terminated() {
        let mut reader = BitReader::new(b"abc\0def\0");
        assert_eq!(reader.read_string(None).unwrap(), "abc");
        assert_eq!(reader.bit_position(), 32);
        assert_eq!(reader.read_string(None).unwrap(), "def");
        assert!(reader.is_empty());
    }

    #[test]
    fn read_string_fixed_length_stops_text_at_null() {
        let mut reader = BitReader::new(b"ab\0d");
        assert_eq!(reader.read_string(Some(4)).unwrap(), "ab");
        assert!(reader.is_empty());
    }

    #[test]
    fn read_string_without_terminator_fails() {
        let mut reader = BitReader::new(b"abc");
        assert!(matches!(
            reader.read_string(None),
            Err(BitError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn bit_stream_view_advances_parent_exactly() {
        let data = [0xAB, 0xCD, 0xEF];
        let mut reader = BitReader::new(&data);
        reader.read_bits(4).unwrap();
        let mut view = reader.read_bit_stream(12).unwrap();
        assert_eq!(reader.bit_position(), 16);
        assert_eq!(view.bit_len(), 12);
        assert_eq!(view.read_bits(12).unwrap(), 0xCDA);
        assert!(matches!(
            view.read_bool(),
            Err(BitError::UnexpectedEof { .. })
        ));
        assert_eq!(reader.read_u8().unwrap(), 0xEF);
    }

    #[test]
    fn seek_within_bounds() {
        let mut reader = BitReader::new(&[0xFF, 0x00]);
        reader.set_position(8).unwrap();
        assert_eq!(reader.read_u8().unwrap(), 0);
        reader.set_position(16).unwrap();
        assert!(reader.is_empty());
        let err = reader.set_position(17).unwrap_err();
        assert!(matches!(err, BitError::SeekOutOfRange { position: 17, len: 16 }));
    }

    #[test]
    fn seek_is_relative_to_view() {
        let data = [0x00, 0xFF];
        let mut reader = BitReader::new(&data);
        let mut view = reader.read_bit_stream(16).unwrap();
        view.set_position(8).unwrap();
        assert_eq!(view.bit_position(), 8);
        assert_eq!(view.read_u8().unwrap(), 0xFF);
    }

    #[test]
    fn with_bit_len_rejects_overlong() {
        let err = BitReader::with_bit_len(&[0], 9).unwrap_err();
        assert!(matches!(err, BitError::UnexpectedEof { .. }));
    }

    #[test]
    fn read_var_int_two_groups() {
        let mut reader = BitReader::new(&[0xAC, 0x02]);
        assert_eq!(reader.read_var_int().unwrap(), 300);
    }

    #[test]
    fn read_var_int_stops_at_group_cap() {
        let mut reader = BitReader::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
        reader.read_var_int().unwrap();
        assert_eq!(reader.bit_position(), 40);
        assert_eq!(reader.read_u8().unwrap(), 0x01);
    }

    #[test]
    fn read_var_int_signed_zigzag() {
        let mut reader = BitReader::new(&[0x01, 0x04]);
        assert_eq!(reader.read_var_int_signed().unwrap(), -1);
        assert_eq!(reader.read_var_int_signed().unwrap(), 2);
    }

    #[test]
    fn read_ubit_var_selectors() {
        // selector 1 (8-bit payload) carrying 0xAB
        let mut reader = BitReader::new(&[0b1010_1101, 0b0000_0010]);
        assert_eq!(reader.read_ubit_var().unwrap(), 0xAB);
        assert_eq!(reader.bit_position(), 10);
    }

    #[test]
    fn read_bit_buf_copies_bits() {
        let mut reader = BitReader::new(&[0b1011_0110, 0b0000_0001]);
        reader.read_bits(1).unwrap();
        let buf = reader.read_bit_buf(9).unwrap();
        assert_eq!(buf.bit_len(), 9);
        let mut inner = buf.reader();
        assert_eq!(inner.read_bits(9).unwrap(), 0b0_1101_1011);
    }
}
