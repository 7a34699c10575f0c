//! `SNAP` framing for compressed string table payloads.
//!
//! A compressed payload is laid out as
//! `{decompressed_len: u32}{compressed_len + 4: u32}{"SNAP"}{raw snappy block}`,
//! both lengths little-endian in the bit stream.

use bitstream::{BitReader, BitWriter};

use crate::error::{CompressionError, LimitKind, WireError, WireResult};
use crate::limits::WireLimits;

/// Magic bytes preceding the snappy block.
pub const SNAP_MAGIC: [u8; 4] = *b"SNAP";

/// Size of the framing before the snappy block, in bytes.
pub const SNAP_HEADER_BYTES: usize = 12;

/// Reads a framed payload and returns the decompressed bytes.
pub fn decompress_payload(reader: &mut BitReader<'_>, limits: &WireLimits) -> WireResult<Vec<u8>> {
    let declared = reader.read_u32()?;
    let compressed_len = reader.read_u32()?;

    let mut found = [0u8; 4];
    found.copy_from_slice(&reader.read_bytes(4)?);
    if found != SNAP_MAGIC {
        return Err(CompressionError::InvalidMagic { found }.into());
    }

    let block_len = compressed_len
        .checked_sub(SNAP_MAGIC.len() as u32)
        .ok_or(CompressionError::InvalidCompressedLength {
            declared: compressed_len,
        })?;
    if declared as usize > limits.max_decompressed_bytes {
        return Err(WireError::LimitsExceeded {
            kind: LimitKind::DecompressedBytes,
            limit: limits.max_decompressed_bytes,
            actual: declared as usize,
        });
    }

    let block = reader.read_bytes(block_len as usize)?;
    let block_decompressed_len =
        snap::raw::decompress_len(&block).map_err(|err| CompressionError::Snappy(err.to_string()))?;
    if block_decompressed_len != declared as usize {
        return Err(CompressionError::SizeMismatch {
            declared,
            actual: block_decompressed_len,
        }
        .into());
    }

    let data = snap::raw::Decoder::new()
        .decompress_vec(&block)
        .map_err(|err| CompressionError::Snappy(err.to_string()))?;
    if data.len() != declared as usize {
        return Err(CompressionError::SizeMismatch {
            declared,
            actual: data.len(),
        }
        .into());
    }

    tracing::trace!(
        compressed = block_len,
        decompressed = declared,
        "decompressed string table payload"
    );
    Ok(data)
}

/// Compresses `data` and returns the framed payload.
///
/// Both length fields are computed from the actual compressed output.
pub fn compress_payload(data: &[u8]) -> WireResult<BitWriter> {
    let block = snap::raw::Encoder::new()
        .compress_vec(data)
        .map_err(|err| CompressionError::Snappy(err.to_string()))?;

    let too_large = |actual: usize| WireError::LimitsExceeded {
        kind: LimitKind::DecompressedBytes,
        limit: u32::MAX as usize,
        actual,
    };
    let declared = u32::try_from(data.len()).map_err(|_| too_large(data.len()))?;
    let compressed_len = u32::try_from(block.len() + SNAP_MAGIC.len())
        .map_err(|_| too_large(block.len()))?;

    let mut out = BitWriter::with_capacity(SNAP_HEADER_BYTES + block.len());
    out.write_u32(declared);
    out.write_u32(compressed_len);
    out.write_bytes(&SNAP_MAGIC);
    out.write_bytes(&block);
    Ok(out)
}
