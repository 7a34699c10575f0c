//! Create-string-table packet.

use bitstream::{BitReader, BitWriter};

use crate::compression::{compress_payload, decompress_payload};
use crate::error::{LimitKind, WireError, WireResult};
use crate::limits::WireLimits;
use crate::string_table::{check_text, StringTable};

const FIXED_USER_DATA_SIZE_BITS: usize = 12;
const FIXED_USER_DATA_SIZE_BITS_BITS: usize = 4;

/// A packet announcing a new string table with its initial entries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateStringTablePacket {
    pub table: StringTable,
}

/// Decodes a create-string-table packet.
pub fn decode_create_string_table(
    reader: &mut BitReader<'_>,
    limits: &WireLimits,
) -> WireResult<CreateStringTablePacket> {
    let name = reader.read_string(None)?;
    let max_entries = reader.read_u16()?;
    if usize::from(max_entries) > limits.max_string_table_entries {
        return Err(WireError::LimitsExceeded {
            kind: LimitKind::StringTableEntries,
            limit: limits.max_string_table_entries,
            actual: usize::from(max_entries),
        });
    }

    let mut table = StringTable::new(name, max_entries);
    let entry_count = reader.read_bits(table.entry_count_bits())? as usize;
    let payload_bits = reader.read_var_int()? as usize;

    if reader.read_bool()? {
        table.fixed_user_data_size = reader.read_bits(FIXED_USER_DATA_SIZE_BITS)? as u16;
        table.fixed_user_data_size_bits = reader.read_bits(FIXED_USER_DATA_SIZE_BITS_BITS)? as u8;
    }
    table.compressed = reader.read_bool()?;

    let mut payload = reader.read_bit_stream(payload_bits)?;
    tracing::trace!(
        table = %table.name,
        entry_count,
        payload_bits,
        compressed = table.compressed,
        "create string table"
    );

    if table.compressed {
        let data = decompress_payload(&mut payload, limits)?;
        table.parse_entries(&mut BitReader::new(&data), entry_count)?;
    } else {
        table.parse_entries(&mut payload, entry_count)?;
    }

    Ok(CreateStringTablePacket { table })
}

/// Encodes a create-string-table packet.
///
/// Entries are encoded first so the payload length, compressed or not, is
/// known before the metadata is written.
pub fn encode_create_string_table(
    packet: &CreateStringTablePacket,
    writer: &mut BitWriter,
) -> WireResult<()> {
    let table = &packet.table;
    check_text(&table.name)?;

    let mut entries = BitWriter::with_capacity(table.guess_encoded_len());
    table.encode_entries(&mut entries, None)?;
    let payload = if table.compressed {
        compress_payload(&entries.finish())?
    } else {
        entries
    };
    let payload_bits = u32::try_from(payload.bits_written()).map_err(|_| {
        WireError::LimitsExceeded {
            kind: LimitKind::DecompressedBytes,
            limit: u32::MAX as usize,
            actual: payload.bits_written(),
        }
    })?;

    writer.write_string(&table.name, None);
    writer.write_u16(table.max_entries);
    writer.write_bits(table.present_entries() as u64, table.entry_count_bits())?;
    writer.write_var_int(payload_bits);

    if table.fixed_user_data_size != 0 || table.fixed_user_data_size_bits != 0 {
        writer.write_bool(true);
        writer.write_bits(
            u64::from(table.fixed_user_data_size),
            FIXED_USER_DATA_SIZE_BITS,
        )?;
        writer.write_bits(
            u64::from(table.fixed_user_data_size_bits),
            FIXED_USER_DATA_SIZE_BITS_BITS,
        )?;
    } else {
        writer.write_bool(false);
    }
    writer.write_bool(table.compressed);
    writer.append(&payload);
    Ok(())
}
