//! Error types for string table and table packet operations.

use std::fmt;

use bitstream::BitError;
use thiserror::Error;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised while decoding or encoding string tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum WireError {
    /// Underlying bit stream error.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] BitError),

    /// Compressed payload framing error.
    #[error("compression error: {0}")]
    Compression(#[from] CompressionError),

    /// Entry index beyond the table's declared maximum.
    #[error("string table entry index {index} exceeds maximum {max_entries}")]
    EntryIndexOutOfRange { index: usize, max_entries: u16 },

    /// Substring reference to an entry not in the history.
    #[error("substring reference {index} but only {history_len} entries in history")]
    InvalidSubstringReference { index: usize, history_len: usize },

    /// Text containing a NUL byte, which would end it early on the wire.
    #[error("text {text:?} contains a NUL byte")]
    EmbeddedNul { text: String },

    /// User data too long for its length field.
    #[error("user data of {bits} bits does not fit in {max_bits} bits")]
    UserDataTooLong { bits: usize, max_bits: usize },

    /// Limits exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    StringTableEntries,
    DecompressedBytes,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StringTableEntries => write!(f, "string table entries"),
            Self::DecompressedBytes => write!(f, "decompressed bytes"),
        }
    }
}

/// Errors in the `SNAP` compressed payload framing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    /// Magic bytes are not `SNAP`.
    #[error("unknown compressed string table format {found:?}")]
    InvalidMagic { found: [u8; 4] },

    /// Compressed length field too small to cover the magic.
    #[error("compressed length {declared} does not cover the magic bytes")]
    InvalidCompressedLength { declared: u32 },

    /// Decompressed data differs from the declared length.
    #[error("decompressed {actual} bytes but header declares {declared}")]
    SizeMismatch { declared: u32, actual: usize },

    /// The snappy block itself is malformed.
    #[error("snappy: {0}")]
    Snappy(String),
}
