//! Packet-entities decoding and encoding.
//!
//! A packet carries a header, then one record per updated entity: a ubit_var
//! index delta, the two PVS bits and, for ENTER and PRESERVE, a property
//! update list. Delta packets end the body with a removal list. The header's
//! length field is authoritative: after decoding the reader is moved to the
//! declared end whatever the body consumed.

use bitstream::{BitReader, BitWriter};
use schema::{ClassId, SendTable};
use tracing::{debug, trace, warn};

use crate::baseline::BaselineCache;
use crate::entity::{read_prop_updates, read_pvs, write_prop_updates, write_pvs, PacketEntity, Pvs};
use crate::error::{CodecError, CodecResult};
use crate::limits::CodecLimits;
use crate::live::LiveEntities;
use crate::registry::ClassRegistry;

/// Width of entity indices and entry counts.
pub const ENTITY_INDEX_BITS: usize = 11;

/// Number of addressable entity slots.
pub const MAX_ENTITIES: u32 = 1 << ENTITY_INDEX_BITS;

/// Width of an entity serial number.
pub const SERIAL_NUMBER_BITS: usize = 10;

const UPDATED_ENTRIES_BITS: usize = 11;
const LENGTH_BITS: usize = 20;

/// A decoded packet-entities message.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PacketEntitiesPacket {
    pub entities: Vec<PacketEntity>,
    pub removed_entities: Vec<u32>,
    pub max_entries: u16,
    /// Tick this packet is a delta from, if any.
    pub delta: Option<i32>,
    pub base_line: bool,
    pub updated_base_line: bool,
}

impl PacketEntitiesPacket {
    /// Creates an empty full (non-delta) packet.
    #[must_use]
    pub const fn new(max_entries: u16) -> Self {
        Self {
            entities: Vec::new(),
            removed_entities: Vec::new(),
            max_entries,
            delta: None,
            base_line: false,
            updated_base_line: false,
        }
    }

    #[must_use]
    pub const fn is_delta(&self) -> bool {
        self.delta.is_some()
    }
}

/// Decodes a packet-entities message.
///
/// `baselines` is updated with static baselines decoded on first use and,
/// when the packet sets `updated_base_line`, with every entering entity.
/// `live` is only read; fold the result in with [`LiveEntities::apply`].
pub fn decode_packet_entities(
    reader: &mut BitReader<'_>,
    registry: &ClassRegistry,
    baselines: &mut BaselineCache,
    live: &LiveEntities,
    limits: &CodecLimits,
) -> CodecResult<PacketEntitiesPacket> {
    let max_entries = reader.read_bits(ENTITY_INDEX_BITS)? as u16;
    let delta = if reader.read_bool()? {
        Some(reader.read_i32()?)
    } else {
        None
    };
    let base_line = reader.read_bool()?;
    let updated_entries = reader.read_bits(UPDATED_ENTRIES_BITS)? as usize;
    let length = reader.read_bits(LENGTH_BITS)? as usize;
    let updated_base_line = reader.read_bool()?;
    let end = reader.bit_position() + length;
    trace!(
        max_entries,
        ?delta,
        base_line,
        updated_entries,
        length,
        updated_base_line,
        "packet entities"
    );

    let mut packet = PacketEntitiesPacket {
        entities: Vec::with_capacity(updated_entries),
        removed_entities: Vec::new(),
        max_entries,
        delta,
        base_line,
        updated_base_line,
    };

    let mut entity_index: i64 = -1;
    for _ in 0..updated_entries {
        entity_index += i64::from(reader.read_ubit_var()?) + 1;
        if entity_index >= i64::from(MAX_ENTITIES) {
            return Err(CodecError::EntityIndexOutOfRange {
                index: entity_index,
            });
        }
        let index = entity_index as u32;

        let pvs = read_pvs(reader)?;
        let entity = match pvs {
            Pvs::Enter => {
                read_enter(index, reader, registry, baselines, limits, updated_base_line)?
            }
            Pvs::Preserve => {
                let class = live.class_of(index)?;
                let table = registry.table_for(class)?;
                let mut entity = PacketEntity::new(class, index, 0, pvs);
                read_prop_updates(&mut entity.props, table, reader, limits)?;
                entity.in_pvs = true;
                entity
            }
            Pvs::Leave | Pvs::Delete => PacketEntity::new(live.class_of(index)?, index, 0, pvs),
        };
        packet.entities.push(entity);
    }

    if packet.is_delta() {
        while reader.read_bool()? {
            packet
                .removed_entities
                .push(reader.read_bits(ENTITY_INDEX_BITS)? as u32);
        }
    }

    reader.set_position(end)?;
    Ok(packet)
}

fn read_enter(
    index: u32,
    reader: &mut BitReader<'_>,
    registry: &ClassRegistry,
    baselines: &mut BaselineCache,
    limits: &CodecLimits,
    updated_base_line: bool,
) -> CodecResult<PacketEntity> {
    let raw_class = reader.read_bits(registry.class_bits())?;
    let class = u16::try_from(raw_class)
        .map(ClassId::new)
        .map_err(|_| CodecError::UnknownServerClass {
            id: raw_class as u32,
        })?;
    let serial_number = reader.read_bits(SERIAL_NUMBER_BITS)? as u32;
    let table = registry.table_for(class)?;

    let mut entity = resolve_baseline(class, table, registry, baselines, limits)?;
    entity.entity_index = index;
    entity.serial_number = serial_number;
    entity.pvs = Pvs::Enter;
    entity.in_pvs = false;
    read_prop_updates(&mut entity.props, table, reader, limits)?;

    if updated_base_line {
        baselines.insert(class, entity.clone());
    }
    entity.in_pvs = true;
    Ok(entity)
}

/// Returns the starting state of an entering entity of `class`.
///
/// A cached baseline wins. Otherwise the class's static baseline, if one is
/// registered, is decoded once and cached.
fn resolve_baseline(
    class: ClassId,
    table: &SendTable,
    registry: &ClassRegistry,
    baselines: &mut BaselineCache,
    limits: &CodecLimits,
) -> CodecResult<PacketEntity> {
    if let Some(cached) = baselines.get(class) {
        return Ok(cached.clone());
    }

    let mut entity = PacketEntity::new(class, 0, 0, Pvs::Enter);
    if let Some(data) = registry.static_baseline(class) {
        let mut reader = data.reader();
        read_prop_updates(&mut entity.props, table, &mut reader, limits)?;
        check_baseline_trailing(class, reader.bits_remaining(), limits)?;
        debug!(%class, props = entity.props.len(), "decoded static baseline");
        baselines.insert(class, entity.clone());
    }
    Ok(entity)
}

fn check_baseline_trailing(
    class: ClassId,
    remaining_bits: usize,
    limits: &CodecLimits,
) -> CodecResult<()> {
    let tolerance = limits.baseline_trailing_bits_tolerance;
    if remaining_bits <= tolerance {
        return Ok(());
    }
    if limits.strict_baseline_trailing {
        return Err(CodecError::BaselineTrailingData {
            class,
            remaining_bits,
            tolerance,
        });
    }
    warn!(%class, remaining_bits, tolerance, "static baseline has trailing data");
    Ok(())
}

/// Encodes a packet-entities message.
///
/// Entities must be in ascending index order. ENTER entities are written as
/// the difference from the baseline the decoder will resolve, which is
/// tracked in `baselines` under the same rules the decoder applies.
pub fn encode_packet_entities(
    packet: &PacketEntitiesPacket,
    writer: &mut BitWriter,
    registry: &ClassRegistry,
    baselines: &mut BaselineCache,
    limits: &CodecLimits,
) -> CodecResult<()> {
    let mut body = BitWriter::new();
    let mut last: i64 = -1;
    for entity in &packet.entities {
        let index = i64::from(entity.entity_index);
        if index >= i64::from(MAX_ENTITIES) {
            return Err(CodecError::EntityIndexOutOfRange { index });
        }
        if index <= last {
            return Err(CodecError::InvalidEntityOrder {
                previous: last as u32,
                current: entity.entity_index,
            });
        }
        body.write_ubit_var((index - last - 1) as u32);
        write_pvs(entity.pvs, &mut body);
        match entity.pvs {
            Pvs::Enter => write_enter(
                entity,
                &mut body,
                registry,
                baselines,
                limits,
                packet.updated_base_line,
            )?,
            Pvs::Preserve => {
                let table = registry.table_for(entity.server_class)?;
                write_prop_updates(&entity.props, table, &mut body)?;
            }
            Pvs::Leave | Pvs::Delete => {}
        }
        last = index;
    }

    if packet.is_delta() {
        for index in &packet.removed_entities {
            body.write_bool(true);
            body.write_bits(u64::from(*index), ENTITY_INDEX_BITS)?;
        }
        body.write_bool(false);
    }

    writer.write_bits(u64::from(packet.max_entries), ENTITY_INDEX_BITS)?;
    match packet.delta {
        Some(tick) => {
            writer.write_bool(true);
            writer.write_i32(tick);
        }
        None => writer.write_bool(false),
    }
    writer.write_bool(packet.base_line);
    writer.write_bits(packet.entities.len() as u64, UPDATED_ENTRIES_BITS)?;
    writer.write_bits(body.bits_written() as u64, LENGTH_BITS)?;
    writer.write_bool(packet.updated_base_line);
    writer.append(&body);
    Ok(())
}

fn write_enter(
    entity: &PacketEntity,
    writer: &mut BitWriter,
    registry: &ClassRegistry,
    baselines: &mut BaselineCache,
    limits: &CodecLimits,
    updated_base_line: bool,
) -> CodecResult<()> {
    let class = entity.server_class;
    let table = registry.table_for(class)?;
    writer.write_bits(u64::from(class.get()), registry.class_bits())?;
    writer.write_bits(u64::from(entity.serial_number), SERIAL_NUMBER_BITS)?;

    let mut baseline = resolve_baseline(class, table, registry, baselines, limits)?;
    let changed = entity.changed_props(&baseline);
    write_prop_updates(&changed, table, writer)?;

    if updated_base_line {
        baseline.props.extend(changed);
        baseline.entity_index = entity.entity_index;
        baseline.serial_number = entity.serial_number;
        baseline.pvs = Pvs::Enter;
        baseline.in_pvs = false;
        baselines.insert(class, baseline);
    }
    Ok(())
}
