//! Schema validation errors.

use thiserror::Error;

use crate::{ClassId, SendPropFlags};

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building or validating send tables and classes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Raw property type tag outside the known set.
    #[error("unknown send prop type tag {tag}")]
    UnknownPropType { tag: u8 },

    /// Raw game event value type outside the known set.
    #[error("unknown game event value type {tag}")]
    UnknownEventValueType { tag: u8 },

    /// Bit width outside the range supported by the property type.
    #[error("prop {prop} has invalid bit count {bits}")]
    InvalidBitCount { prop: String, bits: u32 },

    /// Flag combination with no defined encoding.
    #[error("prop {prop} has conflicting flags {flags:?}")]
    ConflictingFlags { prop: String, flags: SendPropFlags },

    /// Array property without an element definition.
    #[error("array prop {prop} has no element definition")]
    MissingArrayElement { prop: String },

    /// Array element that is itself an array or a table reference.
    #[error("array prop {prop} has an element that cannot be encoded")]
    InvalidArrayElement { prop: String },

    /// Data table reference left in a flattened table.
    #[error("prop {prop} references table {table:?} and was not flattened")]
    UnflattenedDataTable { prop: String, table: Option<String> },

    /// Two server classes share an id.
    #[error("duplicate server class id {id}")]
    DuplicateClassId { id: ClassId },
}
