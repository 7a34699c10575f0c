//! Bit-level writer for encoding low-bit-first packed data.

use crate::error::{BitError, BitResult};
use crate::{BitBuf, BitReader, UBIT_VAR_WIDTHS};

/// A growable bit-level writer.
///
/// Bits are packed least significant bit first, mirroring [`BitReader`].
/// Call [`finish`](Self::finish) to get the byte buffer, or
/// [`into_bit_buf`](Self::into_bit_buf) to keep the exact bit length.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `BitWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            bit_len: 0,
        }
    }

    /// Returns the number of bits written so far.
    #[must_use]
    pub const fn bits_written(&self) -> usize {
        self.bit_len
    }

    /// Writes a single bit.
    pub fn write_bool(&mut self, value: bool) {
        if self.bit_len % 8 == 0 {
            self.bytes.push(0);
        }
        if value {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (self.bit_len % 8);
        }
        self.bit_len += 1;
    }

    /// Writes up to 64 bits from an unsigned integer, least significant bit first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 64`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    pub fn write_bits(&mut self, value: u64, bits: usize) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits < 64 && value >> bits != 0 {
            return Err(BitError::ValueOutOfRange {
                value: i128::from(value),
                bits,
            });
        }

        let mut written = 0;
        while written < bits {
            let offset = self.bit_len % 8;
            if offset == 0 {
                self.bytes.push(0);
            }
            let take = (8 - offset).min(bits - written);
            let chunk = ((value >> written) & ((1u64 << take) - 1)) as u8;
            let last = self.bytes.len() - 1;
            self.bytes[last] |= chunk << offset;
            written += take;
            self.bit_len += take;
        }
        Ok(())
    }

    /// Writes a two's complement signed integer of `bits` width.
    pub fn write_signed_bits(&mut self, value: i64, bits: usize) -> BitResult<()> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 64 {
            return self.write_bits(value as u64, 64);
        }
        let (min, max) = if bits == 0 {
            (0, 0)
        } else {
            (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
        };
        if value < min || value > max {
            return Err(BitError::ValueOutOfRange {
                value: i128::from(value),
                bits,
            });
        }
        let mask = (1u64 << bits) - 1;
        self.write_bits(value as u64 & mask, bits)
    }

    /// Writes an 8-bit unsigned integer.
    pub fn write_u8(&mut self, value: u8) {
        self.write_raw(u64::from(value), 8);
    }

    /// Writes a 16-bit unsigned integer.
    pub fn write_u16(&mut self, value: u16) {
        self.write_raw(u64::from(value), 16);
    }

    /// Writes a 32-bit unsigned integer.
    pub fn write_u32(&mut self, value: u32) {
        self.write_raw(u64::from(value), 32);
    }

    /// Writes a 32-bit signed integer.
    pub fn write_i32(&mut self, value: i32) {
        self.write_raw(u64::from(value as u32), 32);
    }

    /// Writes a 32-bit IEEE 754 float.
    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    /// Writes whole bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_u8(byte);
        }
    }

    /// Writes a string.
    ///
    /// With `None` the bytes are followed by a null terminator. With
    /// `Some(len)` exactly `len` bytes are written, truncating or padding
    /// with nulls.
    pub fn write_string(&mut self, text: &str, len: Option<usize>) {
        match len {
            Some(len) => {
                let bytes = text.as_bytes();
                for idx in 0..len {
                    self.write_u8(bytes.get(idx).copied().unwrap_or(0));
                }
            }
            None => {
                self.write_bytes(text.as_bytes());
                self.write_u8(0);
            }
        }
    }

    /// Appends the unread bits of a reader.
    pub fn write_bit_stream(&mut self, reader: &BitReader<'_>) {
        let mut reader = reader.clone();
        while !reader.is_empty() {
            let take = reader.bits_remaining().min(32);
            // Cannot fail: `take` never exceeds the remaining bits.
            if let Ok(chunk) = reader.read_bits(take) {
                self.write_raw(chunk, take);
            }
        }
    }

    /// Appends every bit of an owned bit buffer.
    pub fn write_bit_buf(&mut self, buf: &BitBuf) {
        self.write_bit_stream(&buf.reader());
    }

    /// Appends every bit written to another writer.
    pub fn append(&mut self, other: &Self) {
        if let Ok(reader) = BitReader::with_bit_len(&other.bytes, other.bit_len) {
            self.write_bit_stream(&reader);
        }
    }

    /// Writes a protocol varint, see [`BitReader::read_var_int`].
    pub fn write_var_int(&mut self, mut value: u32) {
        while value & !0x7F != 0 {
            self.write_u8((value & 0x7F) as u8 | 0x80);
            value >>= 7;
        }
        self.write_u8(value as u8);
    }

    /// Writes a zigzag encoded protocol varint.
    pub fn write_var_int_signed(&mut self, value: i32) {
        self.write_var_int(((value << 1) ^ (value >> 31)) as u32);
    }

    /// Writes a selector-prefixed integer using the narrowest payload that fits.
    pub fn write_ubit_var(&mut self, value: u32) {
        let selector = UBIT_VAR_WIDTHS
            .iter()
            .position(|&width| width == 32 || value >> width == 0)
            .unwrap_or(UBIT_VAR_WIDTHS.len() - 1);
        self.write_raw(selector as u64, 2);
        self.write_raw(u64::from(value), UBIT_VAR_WIDTHS[selector]);
    }

    /// Returns a reader over the bits written so far.
    #[must_use]
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::with_bit_len(&self.bytes, self.bit_len).unwrap_or_else(|_| BitReader::new(&[]))
    }

    /// Finishes writing and returns the byte buffer.
    ///
    /// If the last byte is incomplete, its high bits are zero.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Finishes writing and keeps the exact bit length.
    #[must_use]
    pub fn into_bit_buf(self) -> BitBuf {
        BitBuf::from_parts(self.bytes, self.bit_len)
    }

    /// Writes a value already known to fit in `bits`, at most 32.
    fn write_raw(&mut self, value: u64, bits: usize) {
        debug_assert!(
            bits <= 32 && value >> bits == 0,
            "{value} does not fit in {bits} bits"
        );
        let mask = 1u64.checked_shl(bits as u32).map_or(u64::MAX, |bit| bit - 1);
        let written = self.write_bits(value & mask, bits);
        debug_assert!(written.is_ok(), "raw write of {bits} bits failed");
    }
}
