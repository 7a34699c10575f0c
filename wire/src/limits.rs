//! Configurable limits for bounded decoding.

/// Wire-level limits for string table decoding.
///
/// These bound the memory a single table packet can make the decoder
/// allocate, independent of the table's own declared maximum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireLimits {
    /// Maximum declared `max_entries` of a string table.
    pub max_string_table_entries: usize,

    /// Maximum size of a decompressed entry payload in bytes.
    pub max_decompressed_bytes: usize,
}

impl Default for WireLimits {
    fn default() -> Self {
        Self {
            // The entry count field is 16 bits wide
            max_string_table_entries: 65_536,
            max_decompressed_bytes: 16 * 1024 * 1024,
        }
    }
}

impl WireLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_string_table_entries: 4096,
            max_decompressed_bytes: 64 * 1024,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_string_table_entries: usize::MAX,
            max_decompressed_bytes: usize::MAX,
        }
    }
}
