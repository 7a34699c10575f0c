//! Error types for codec operations.

use std::fmt;

use schema::{ClassId, SendPropType};
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding or encoding packets.
///
/// None of these are recoverable within a packet: entity indices accumulate
/// sequentially, so any error invalidates the rest of the packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Bitstream error.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] bitstream::BitError),

    /// Schema error.
    #[error("schema error: {0}")]
    Schema(#[from] schema::SchemaError),

    /// String table error.
    #[error("wire error: {0}")]
    Wire(#[from] wire::WireError),

    /// Class id not present in the class registry.
    #[error("unknown server class {id}")]
    UnknownServerClass { id: u32 },

    /// Server class whose send table is not registered.
    #[error("no send table {table} for server class {class}")]
    UnknownSendTable { class: ClassId, table: String },

    /// Entity referenced without a prior ENTER.
    #[error("unknown entity {index}")]
    UnknownEntity { index: u32 },

    /// Property value that cannot be decoded or encoded with its definition.
    #[error("invalid encoding for prop {prop}: {reason}")]
    InvalidPropEncoding { prop: String, reason: EncodingReason },

    /// Property index past the end of the send table.
    #[error("prop index {index} out of range for table {table} with {len} props")]
    PropIndexOutOfRange {
        table: String,
        index: i64,
        len: usize,
    },

    /// Null-terminated text containing a NUL byte.
    #[error("text {text:?} contains a NUL byte")]
    EmbeddedNul { text: String },

    /// Entity index outside the protocol's range.
    #[error("entity index {index} out of range")]
    EntityIndexOutOfRange { index: i64 },

    /// Entities are not in ascending index order.
    #[error("entity {current} follows entity {previous}")]
    InvalidEntityOrder { previous: u32, current: u32 },

    /// Static baseline left more unread bits than tolerated.
    #[error("static baseline of class {class} has {remaining_bits} trailing bits (tolerance {tolerance})")]
    BaselineTrailingData {
        class: ClassId,
        remaining_bits: usize,
        tolerance: usize,
    },

    /// Limits exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    PropIndex,
    ArrayElements,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PropIndex => write!(f, "prop index"),
            Self::ArrayElements => write!(f, "array elements"),
        }
    }
}

/// Details for invalid property encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingReason {
    /// Bit width unsupported for the property type.
    BitCount { bits: u32 },
    /// Both rounding flags set on a quantized float.
    RoundUpAndDown,
    /// Array without element definition.
    MissingArrayElement,
    /// Table references are flattened away and never sent.
    DataTable,
    /// Value variant does not match the definition.
    TypeMismatch { expected: SendPropType },
    /// Value does not fit the property's wire range.
    OutOfRange,
    /// String value with a NUL byte, which the decoder stops at.
    EmbeddedNul,
}

impl fmt::Display for EncodingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BitCount { bits } => write!(f, "unsupported bit count {bits}"),
            Self::RoundUpAndDown => write!(f, "both round up and round down set"),
            Self::MissingArrayElement => write!(f, "array has no element definition"),
            Self::DataTable => write!(f, "data table props are not sent"),
            Self::TypeMismatch { expected } => write!(f, "expected a {expected:?} value"),
            Self::OutOfRange => write!(f, "value out of range"),
            Self::EmbeddedNul => write!(f, "string contains a NUL byte"),
        }
    }
}
