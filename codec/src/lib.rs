//! Entity delta decoding and packet codecs for demo streams.
//!
//! This is the main codec crate that ties together bitstream, wire, and schema
//! to decode and re-encode the packets that carry entity state.
//!
//! # Features
//!
//! - Send prop value codecs (ints, quantized and coordinate floats, vectors, strings, arrays)
//! - Sparse property update lists
//! - The packet-entities PVS state machine with per-class baselines
//! - Game event list and create-string-table packets
//! - A [`Session`] owning all state shared between packets of one demo
//!
//! # Design Principles
//!
//! - **Correctness first** - Any decode error aborts the packet; no partial results.
//! - **Explicit state** - Baselines and live entities are owned by the session, never global.
//! - **Deterministic** - Same inputs produce same outputs.
//!
//! # Example
//!
//! ```
//! use bitstream::BitWriter;
//! use codec::{ClassRegistry, Packet, PacketEntitiesPacket, PacketEntity, PacketKind, Pvs, Session};
//! use schema::{ClassId, SendPropDefinition, SendTable, ServerClass};
//!
//! let table = SendTable::new("DT_Player", vec![SendPropDefinition::int("m_iHealth", 8)]).unwrap();
//! let registry = ClassRegistry::new(
//!     vec![ServerClass::new(0, "CPlayer", "DT_Player")],
//!     vec![table],
//! )
//! .unwrap();
//! let mut session = Session::new(registry);
//!
//! let mut packet = PacketEntitiesPacket::new(2047);
//! let mut entity = PacketEntity::new(ClassId::new(0), 1, 0, Pvs::Enter).with_prop(0, 100i64);
//! entity.in_pvs = true;
//! packet.entities.push(entity);
//! let packet = Packet::PacketEntities(packet);
//!
//! let mut writer = BitWriter::new();
//! session.encode_packet(&packet, &mut writer).unwrap();
//! let decoded = session
//!     .decode_packet(PacketKind::PacketEntities, &mut writer.reader())
//!     .unwrap();
//! assert_eq!(decoded, packet);
//! ```

mod baseline;
mod entity;
mod error;
mod game_events;
mod limits;
mod live;
mod packet;
mod packet_entities;
mod props;
mod registry;
mod session;
mod types;

pub use baseline::BaselineCache;
pub use entity::{read_prop_updates, write_prop_updates, PacketEntity, PropMap, Pvs};
pub use error::{CodecError, CodecResult, EncodingReason, LimitKind};
pub use game_events::{decode_game_event_list, encode_game_event_list, GameEventListPacket};
pub use limits::CodecLimits;
pub use live::LiveEntities;
pub use packet::{Packet, PacketKind};
pub use packet_entities::{
    decode_packet_entities, encode_packet_entities, PacketEntitiesPacket, ENTITY_INDEX_BITS,
    MAX_ENTITIES, SERIAL_NUMBER_BITS,
};
pub use props::{decode_prop_value, encode_prop_value, STRING_LENGTH_BITS};
pub use registry::{ClassRegistry, INSTANCE_BASELINE_TABLE};
pub use session::Session;
pub use types::{SendPropValue, Vector, VectorXY};
pub use wire::WireLimits;
