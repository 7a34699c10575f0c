//! Owned bit buffers.

use crate::error::{BitError, BitResult};
use crate::BitReader;

/// An owned sequence of bits.
///
/// Used wherever a decoded value keeps raw bits around, e.g. string table
/// user data or static baselines. Padding bits past `bit_len` are always
/// zero, so two buffers with the same bits compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitBuf {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitBuf {
    /// Creates a buffer holding every bit of `bytes`.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        let bit_len = bytes.len() * 8;
        Self { bytes, bit_len }
    }

    /// Creates a buffer holding the first `bits` bits of `bytes`.
    ///
    /// Surplus bytes are dropped and padding bits cleared.
    pub fn from_bits(bytes: Vec<u8>, bits: usize) -> BitResult<Self> {
        let available = bytes.len().saturating_mul(8);
        if bits > available {
            return Err(BitError::UnexpectedEof {
                requested: bits,
                available,
            });
        }
        Ok(Self::from_parts(bytes, bits))
    }

    pub(crate) fn from_parts(mut bytes: Vec<u8>, bit_len: usize) -> Self {
        bytes.truncate(bit_len.div_ceil(8));
        let tail = bit_len % 8;
        if tail != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= (1u8 << tail) - 1;
            }
        }
        Self { bytes, bit_len }
    }

    /// Length in bits.
    #[must_use]
    pub const fn bit_len(&self) -> usize {
        self.bit_len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// Backing bytes, low bit first.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns a reader positioned at the first bit.
    #[must_use]
    pub fn reader(&self) -> BitReader<'_> {
        // `bytes` always covers `bit_len` bits.
        BitReader::with_bit_len(&self.bytes, self.bit_len)
            .unwrap_or_else(|_| BitReader::new(&self.bytes))
    }
}

impl From<Vec<u8>> for BitBuf {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
