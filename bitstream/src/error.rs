//! Error types for bitstream operations.

use thiserror::Error;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitError {
    /// Attempted to read past the end of the stream.
    #[error("attempted to read {requested} bits but only {available} bits available")]
    UnexpectedEof {
        /// Number of bits requested.
        requested: usize,
        /// Number of bits available.
        available: usize,
    },

    /// Attempted to move the cursor outside the stream.
    #[error("cannot seek to bit {position} in a stream of {len} bits")]
    SeekOutOfRange {
        /// Requested position, relative to the stream start.
        position: usize,
        /// Length of the stream in bits.
        len: usize,
    },

    /// Invalid bit count for the operation.
    #[error("invalid bit count {bits}, maximum allowed is {max_bits}")]
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: usize,
        /// Maximum allowed bits for this operation.
        max_bits: usize,
    },

    /// Value exceeds the range representable by the specified number of bits.
    #[error("value {value} cannot be represented in {bits} bits")]
    ValueOutOfRange {
        /// The value that was out of range.
        value: i128,
        /// Number of bits available.
        bits: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_numbers() {
        let cases = [
            (
                BitError::UnexpectedEof {
                    requested: 8,
                    available: 3,
                },
                &["read 8 bits", "3 bits available"][..],
            ),
            (
                BitError::SeekOutOfRange {
                    position: 100,
                    len: 64,
                },
                &["bit 100", "64 bits"][..],
            ),
            (
                BitError::InvalidBitCount {
                    bits: 128,
                    max_bits: 64,
                },
                &["128", "maximum allowed is 64"][..],
            ),
            (
                BitError::ValueOutOfRange {
                    value: -300,
                    bits: 8,
                },
                &["-300", "8 bits"][..],
            ),
        ];
        for (err, needles) in cases {
            let msg = err.to_string();
            for needle in needles {
                assert!(msg.contains(needle), "{msg:?} lacks {needle:?}");
            }
        }
    }

    #[test]
    fn eof_errors_compare_by_field() {
        let short = BitError::UnexpectedEof {
            requested: 8,
            available: 3,
        };
        assert_eq!(short.clone(), short);
        assert_ne!(
            short,
            BitError::UnexpectedEof {
                requested: 8,
                available: 4,
            }
        );
    }
}
