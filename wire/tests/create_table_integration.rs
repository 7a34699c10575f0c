use bitstream::{BitBuf, BitReader, BitWriter};
use proptest::prelude::*;
use wire::{
    decode_create_string_table, encode_create_string_table, CreateStringTablePacket,
    StringTable, StringTableEntry, WireError, WireLimits, SNAP_MAGIC,
};

fn three_entry_table() -> StringTable {
    StringTable {
        entries: vec![
            Some(StringTableEntry::new("instancebaseline")),
            Some(StringTableEntry::new("lightstyles").with_extra_data(BitBuf::new(vec![b'm', 0]))),
            Some(StringTableEntry::new("userinfo").with_extra_data(BitBuf::new(vec![1, 2, 3, 4]))),
        ],
        compressed: true,
        ..StringTable::new("downloadables", 4096)
    }
}

/// Walks the metadata of an encoded packet and returns the payload bits.
fn payload_of(bytes: &[u8]) -> (usize, Vec<u8>) {
    let mut reader = BitReader::new(bytes);
    reader.read_string(None).unwrap();
    let max_entries = reader.read_u16().unwrap();
    let count_bits = (31 - u32::from(max_entries).leading_zeros()) as usize + 1;
    let count = reader.read_bits(count_bits).unwrap() as usize;
    let payload_bits = reader.read_var_int().unwrap() as usize;
    if reader.read_bool().unwrap() {
        reader.skip_bits(16).unwrap();
    }
    assert!(reader.read_bool().unwrap());
    let payload = reader.read_bit_buf(payload_bits).unwrap();
    (count, payload.as_bytes().to_vec())
}

#[test]
fn compressed_table_roundtrip() {
    let packet = CreateStringTablePacket {
        table: three_entry_table(),
    };
    let mut writer = BitWriter::new();
    encode_create_string_table(&packet, &mut writer).unwrap();
    let bytes = writer.finish();

    let (count, payload) = payload_of(&bytes);
    assert_eq!(count, 3);
    assert_eq!(&payload[8..12], &SNAP_MAGIC);
    let declared = u32::from_le_bytes(payload[0..4].try_into().unwrap()) as usize;

    let mut entries = BitWriter::new();
    packet.table.encode_entries(&mut entries, None).unwrap();
    assert_eq!(declared, entries.bits_written().div_ceil(8));

    let decoded =
        decode_create_string_table(&mut BitReader::new(&bytes), &WireLimits::default()).unwrap();
    assert_eq!(decoded, packet);
}

#[test]
fn entry_count_width_for_4096() {
    let table = three_entry_table();
    assert_eq!(table.entry_count_bits(), 13);

    let packet = CreateStringTablePacket {
        table: StringTable {
            compressed: false,
            ..table
        },
    };
    let mut writer = BitWriter::new();
    encode_create_string_table(&packet, &mut writer).unwrap();

    let mut reader = writer.reader();
    assert_eq!(reader.read_string(None).unwrap(), "downloadables");
    assert_eq!(reader.read_u16().unwrap(), 4096);
    assert_eq!(reader.read_bits(13).unwrap(), 3);
}

#[test]
fn decode_rejects_truncated_payload() {
    let packet = CreateStringTablePacket {
        table: three_entry_table(),
    };
    let mut writer = BitWriter::new();
    encode_create_string_table(&packet, &mut writer).unwrap();
    let mut bytes = writer.finish();
    bytes.truncate(bytes.len() - 4);

    assert!(decode_create_string_table(&mut BitReader::new(&bytes), &WireLimits::default()).is_err());
}

#[test]
fn table_name_with_nul_is_rejected() {
    let packet = CreateStringTablePacket {
        table: StringTable::new("user\0info", 64),
    };
    let mut writer = BitWriter::new();
    let err = encode_create_string_table(&packet, &mut writer).unwrap_err();
    assert_eq!(
        err,
        WireError::EmbeddedNul {
            text: "user\0info".to_owned()
        }
    );
    assert_eq!(writer.bits_written(), 0);
}

fn entry_strategy() -> impl Strategy<Value = Option<StringTableEntry>> {
    prop::option::of(
        (
            prop::option::of("[a-z/_.]{0,20}"),
            prop::option::of(prop::collection::vec(any::<u8>(), 0..16)),
        )
            .prop_map(|(text, data)| StringTableEntry {
                text,
                extra_data: data.map(BitBuf::new),
            }),
    )
}

proptest! {
    #[test]
    fn prop_table_roundtrip(
        entries in prop::collection::vec(entry_strategy(), 0..48),
        compressed in any::<bool>(),
    ) {
        // trailing absent entries are not on the wire
        let mut entries = entries;
        while matches!(entries.last(), Some(None)) {
            entries.pop();
        }
        let packet = CreateStringTablePacket {
            table: StringTable {
                entries,
                compressed,
                ..StringTable::new("soundprecache", 256)
            },
        };

        let mut writer = BitWriter::new();
        encode_create_string_table(&packet, &mut writer).unwrap();
        let decoded = decode_create_string_table(&mut writer.reader(), &WireLimits::default()).unwrap();
        prop_assert_eq!(decoded, packet);
    }
}
