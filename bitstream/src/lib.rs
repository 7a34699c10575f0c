//! Low-level bit packing primitives for demo decoding.
//!
//! This crate provides [`BitWriter`] and [`BitReader`] for bit-level encoding and decoding,
//! plus [`BitBuf`] for owned runs of bits.
//! Bits are packed least significant bit first: bit `i` of a stream is
//! `(bytes[i / 8] >> (i % 8)) & 1`, and multi-bit values are assembled low bit first.
//!
//! # Design Principles
//!
//! - **No unsafe code**
//! - **Bounded operations** - All reads are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about entities, tables, or events.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitWriter, BitReader};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bool(true);
//! writer.write_bits(42, 7).unwrap();
//! writer.write_var_int(300);
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bool().unwrap(), true);
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! assert_eq!(reader.read_var_int().unwrap(), 300);
//! ```

mod buf;
mod error;
mod reader;
mod writer;

pub use buf::BitBuf;
pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::BitWriter;

/// Maximum number of 8-bit groups in a protocol varint.
pub const VAR_INT_MAX_GROUPS: usize = 5;

/// Payload widths selectable by the 2-bit prefix of a ubit var.
pub const UBIT_VAR_WIDTHS: [usize; 4] = [4, 8, 12, 32];

/// Number of bits needed to hold values up to `max`, never less than one.
#[must_use]
pub const fn bits_needed(max: u32) -> usize {
    let mut bits = 1;
    while bits < 32 && (max >> bits) != 0 {
        bits += 1;
    }
    bits
}

/// Floor of the base-2 logarithm, zero for inputs below two.
#[must_use]
pub const fn log2(mut value: u32) -> usize {
    let mut result = 0;
    while value > 1 {
        value >>= 1;
        result += 1;
    }
    result
}
