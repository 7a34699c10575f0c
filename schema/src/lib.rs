//! Send table, server class, and game event definitions for demo decoding.
//!
//! This crate describes the externally supplied schema that the codec decodes against:
//! - Send prop definitions (type tag, flags, bit layout)
//! - Flattened send tables, whose prop order defines the delta index
//! - Server classes binding a class id to a table name
//! - Game event definitions
//!
//! # Design Principles
//!
//! - **Explicit schemas** - Tables are built at runtime from already flattened data.
//! - **Validated up front** - Encodings with no defined wire form are rejected before decoding.

mod error;
mod event;
mod prop;
mod table;

pub use error::{SchemaError, SchemaResult};
pub use event::{
    GameEventDefinition, GameEventDefinitionMap, GameEventEntry, GameEventTypeId,
    GameEventValueType,
};
pub use prop::{SendPropDefinition, SendPropFlags, SendPropType};
pub use table::{validate_classes, ClassId, SendTable, SendTableBuilder, ServerClass};
