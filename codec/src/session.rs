//! Per-demo decoding state.

use bitstream::{BitReader, BitWriter};
use schema::GameEventDefinitionMap;
use wire::{decode_create_string_table, encode_create_string_table, StringTable, WireLimits};

use crate::baseline::BaselineCache;
use crate::error::CodecResult;
use crate::game_events::{decode_game_event_list, encode_game_event_list};
use crate::limits::CodecLimits;
use crate::live::LiveEntities;
use crate::packet::{Packet, PacketKind};
use crate::packet_entities::{decode_packet_entities, encode_packet_entities};
use crate::registry::{ClassRegistry, INSTANCE_BASELINE_TABLE};

/// State shared by all packets of one demo.
///
/// Packets must be fed in stream order. Sessions are independent of each
/// other; run one per demo to decode several in parallel.
#[derive(Debug, Clone)]
pub struct Session {
    registry: ClassRegistry,
    baselines: BaselineCache,
    encode_baselines: BaselineCache,
    live: LiveEntities,
    game_events: GameEventDefinitionMap,
    string_tables: Vec<StringTable>,
    limits: CodecLimits,
    wire_limits: WireLimits,
}

impl Session {
    /// Creates a session with default limits.
    #[must_use]
    pub fn new(registry: ClassRegistry) -> Self {
        Self::with_limits(registry, CodecLimits::default(), WireLimits::default())
    }

    #[must_use]
    pub fn with_limits(registry: ClassRegistry, limits: CodecLimits, wire_limits: WireLimits) -> Self {
        Self {
            registry,
            baselines: BaselineCache::new(),
            encode_baselines: BaselineCache::new(),
            live: LiveEntities::new(),
            game_events: GameEventDefinitionMap::new(),
            string_tables: Vec::new(),
            limits,
            wire_limits,
        }
    }

    /// Decodes one packet body of the given kind.
    ///
    /// Packet entities update the live entity table. An `instancebaseline`
    /// string table registers its entries as static baselines.
    pub fn decode_packet(&mut self, kind: PacketKind, reader: &mut BitReader<'_>) -> CodecResult<Packet> {
        match kind {
            PacketKind::PacketEntities => {
                let packet = decode_packet_entities(
                    reader,
                    &self.registry,
                    &mut self.baselines,
                    &self.live,
                    &self.limits,
                )?;
                self.live.apply(&packet);
                Ok(Packet::PacketEntities(packet))
            }
            PacketKind::CreateStringTable => {
                let packet = decode_create_string_table(reader, &self.wire_limits)?;
                self.track_string_table(&packet.table);
                Ok(Packet::CreateStringTable(packet))
            }
            PacketKind::GameEventList => {
                decode_game_event_list(reader, &mut self.game_events).map(Packet::GameEventList)
            }
        }
    }

    /// Encodes one packet body.
    ///
    /// Encoding keeps its own baseline cache, so a session that encodes a
    /// packet sequence produces the bits a decoding session expects.
    pub fn encode_packet(&mut self, packet: &Packet, writer: &mut BitWriter) -> CodecResult<()> {
        match packet {
            Packet::PacketEntities(packet) => encode_packet_entities(
                packet,
                writer,
                &self.registry,
                &mut self.encode_baselines,
                &self.limits,
            ),
            Packet::CreateStringTable(packet) => {
                encode_create_string_table(packet, writer)?;
                if packet.table.name == INSTANCE_BASELINE_TABLE {
                    self.registry.load_static_baselines(&packet.table);
                }
                Ok(())
            }
            Packet::GameEventList(packet) => encode_game_event_list(packet, writer),
        }
    }

    fn track_string_table(&mut self, table: &StringTable) {
        if table.name == INSTANCE_BASELINE_TABLE {
            self.registry.load_static_baselines(table);
        }
        match self.string_tables.iter_mut().find(|known| known.name == table.name) {
            Some(known) => *known = table.clone(),
            None => self.string_tables.push(table.clone()),
        }
    }

    /// Drops all per-demo state, keeping the class schema and limits.
    pub fn reset(&mut self) {
        self.registry.clear_static_baselines();
        self.baselines.reset();
        self.encode_baselines.reset();
        self.live.reset();
        self.game_events.clear();
        self.string_tables.clear();
    }

    #[must_use]
    pub const fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn baselines(&self) -> &BaselineCache {
        &self.baselines
    }

    #[must_use]
    pub const fn live_entities(&self) -> &LiveEntities {
        &self.live
    }

    #[must_use]
    pub const fn game_events(&self) -> &GameEventDefinitionMap {
        &self.game_events
    }

    #[must_use]
    pub fn string_tables(&self) -> &[StringTable] {
        &self.string_tables
    }

    #[must_use]
    pub fn string_table(&self, name: &str) -> Option<&StringTable> {
        self.string_tables.iter().find(|table| table.name == name)
    }

    #[must_use]
    pub const fn limits(&self) -> &CodecLimits {
        &self.limits
    }
}
