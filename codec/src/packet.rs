//! Packet sum type.

use std::fmt;

use wire::CreateStringTablePacket;

use crate::game_events::GameEventListPacket;
use crate::packet_entities::PacketEntitiesPacket;

/// Kind of a packet body, chosen by the caller's message dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    PacketEntities,
    CreateStringTable,
    GameEventList,
}

impl PacketKind {
    /// Returns the `packetType` tag of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PacketEntities => "packetEntities",
            Self::CreateStringTable => "createStringTable",
            Self::GameEventList => "gameEventList",
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded packet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "packetType", rename_all = "camelCase")
)]
pub enum Packet {
    PacketEntities(PacketEntitiesPacket),
    CreateStringTable(CreateStringTablePacket),
    GameEventList(GameEventListPacket),
}

impl Packet {
    #[must_use]
    pub const fn kind(&self) -> PacketKind {
        match self {
            Self::PacketEntities(_) => PacketKind::PacketEntities,
            Self::CreateStringTable(_) => PacketKind::CreateStringTable,
            Self::GameEventList(_) => PacketKind::GameEventList,
        }
    }

    /// Returns the `packetType` tag, e.g. `"packetEntities"`.
    #[must_use]
    pub const fn packet_type(&self) -> &'static str {
        self.kind().name()
    }
}

impl From<PacketEntitiesPacket> for Packet {
    fn from(packet: PacketEntitiesPacket) -> Self {
        Self::PacketEntities(packet)
    }
}

impl From<CreateStringTablePacket> for Packet {
    fn from(packet: CreateStringTablePacket) -> Self {
        Self::CreateStringTable(packet)
    }
}

impl From<GameEventListPacket> for Packet {
    fn from(packet: GameEventListPacket) -> Self {
        Self::GameEventList(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::StringTable;

    #[test]
    fn packet_type_tags() {
        let entities = Packet::from(PacketEntitiesPacket::new(2047));
        assert_eq!(entities.packet_type(), "packetEntities");
        assert_eq!(entities.kind(), PacketKind::PacketEntities);

        let table = Packet::from(CreateStringTablePacket {
            table: StringTable::new("userinfo", 256),
        });
        assert_eq!(table.packet_type(), "createStringTable");

        let events = Packet::from(GameEventListPacket::default());
        assert_eq!(events.packet_type(), "gameEventList");
        assert_eq!(PacketKind::GameEventList.to_string(), "gameEventList");
    }
}
