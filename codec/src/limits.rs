//! Limits for codec-level decoding.

/// Codec-specific limits enforced during entity decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecLimits {
    /// Maximum property index accepted in an entity update.
    pub max_prop_index: usize,
    /// Maximum number of elements in an array property.
    pub max_array_elements: usize,
    /// Unread bits tolerated after decoding a static baseline.
    pub baseline_trailing_bits_tolerance: usize,
    /// Fail instead of warning when a static baseline exceeds the tolerance.
    pub strict_baseline_trailing: bool,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_prop_index: 4096,
            max_array_elements: 1024,
            // Up to one byte of padding
            baseline_trailing_bits_tolerance: 7,
            strict_baseline_trailing: false,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_prop_index: 256,
            max_array_elements: 64,
            baseline_trailing_bits_tolerance: 7,
            strict_baseline_trailing: true,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_prop_index: usize::MAX,
            max_array_elements: usize::MAX,
            baseline_trailing_bits_tolerance: usize::MAX,
            strict_baseline_trailing: false,
        }
    }
}
