//! String tables and table packets for demo decoding.
//!
//! This crate handles the string table wire format: the entry list codec
//! (with substring history), the `SNAP` compression framing, and the
//! create-string-table packet. It does not know about entities or send tables.
//!
//! # Design Principles
//!
//! - **Bounded decoding** - Table sizes and decompressed payloads are validated against limits.
//! - **Canonical encoding** - Re-encoding a table never emits substring references.

mod compression;
mod create_table;
mod error;
mod limits;
mod string_table;

pub use compression::{compress_payload, decompress_payload, SNAP_HEADER_BYTES, SNAP_MAGIC};
pub use create_table::{
    decode_create_string_table, encode_create_string_table, CreateStringTablePacket,
};
pub use error::{CompressionError, LimitKind, WireError, WireResult};
pub use limits::WireLimits;
pub use string_table::{
    StringTable, StringTableEntry, STRING_HISTORY_LEN, USER_DATA_LENGTH_BITS,
};
