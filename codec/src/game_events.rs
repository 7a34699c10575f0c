//! Game event list packet.

use bitstream::{BitReader, BitWriter};
use schema::{GameEventDefinition, GameEventDefinitionMap, GameEventEntry, GameEventValueType};
use tracing::trace;

use crate::error::{CodecError, CodecResult};

const EVENT_COUNT_BITS: usize = 9;
const EVENT_ID_BITS: usize = 9;
const LENGTH_BITS: usize = 20;
const VALUE_TYPE_BITS: usize = 3;

/// Game event definitions announced by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameEventListPacket {
    pub events: Vec<GameEventDefinition>,
}

/// Decodes a game event list, inserting every definition into `definitions`.
///
/// A definition replaces any earlier one with the same id.
pub fn decode_game_event_list(
    reader: &mut BitReader<'_>,
    definitions: &mut GameEventDefinitionMap,
) -> CodecResult<GameEventListPacket> {
    let count = reader.read_bits(EVENT_COUNT_BITS)? as usize;
    let length = reader.read_bits(LENGTH_BITS)?;
    trace!(count, length, "game event list");

    let mut events = Vec::with_capacity(count);
    for _ in 0..count {
        let id = reader.read_bits(EVENT_ID_BITS)? as u16;
        let mut definition = GameEventDefinition::new(id, reader.read_string(None)?);
        loop {
            let tag = reader.read_bits(VALUE_TYPE_BITS)? as u8;
            if tag == 0 {
                break;
            }
            let kind = GameEventValueType::try_from(tag)?;
            definition.entries.push(GameEventEntry {
                name: reader.read_string(None)?,
                kind,
            });
        }
        definitions.insert(id, definition.clone());
        events.push(definition);
    }
    Ok(GameEventListPacket { events })
}

/// Encodes a game event list.
pub fn encode_game_event_list(packet: &GameEventListPacket, writer: &mut BitWriter) -> CodecResult<()> {
    let mut body = BitWriter::new();
    for event in &packet.events {
        body.write_bits(u64::from(event.id), EVENT_ID_BITS)?;
        write_name(&event.name, &mut body)?;
        for entry in &event.entries {
            body.write_bits(u64::from(entry.kind.tag()), VALUE_TYPE_BITS)?;
            write_name(&entry.name, &mut body)?;
        }
        body.write_bits(0, VALUE_TYPE_BITS)?;
    }

    writer.write_bits(packet.events.len() as u64, EVENT_COUNT_BITS)?;
    writer.write_bits(body.bits_written() as u64, LENGTH_BITS)?;
    writer.append(&body);
    Ok(())
}

fn write_name(name: &str, writer: &mut BitWriter) -> CodecResult<()> {
    if name.contains('\0') {
        return Err(CodecError::EmbeddedNul {
            text: name.to_owned(),
        });
    }
    writer.write_string(name, None);
    Ok(())
}
