//! Game event definitions.

use std::collections::BTreeMap;

use crate::error::{SchemaError, SchemaResult};

/// Game event id, 9 bits on the wire.
pub type GameEventTypeId = u16;

/// Definitions keyed by event id.
pub type GameEventDefinitionMap = BTreeMap<GameEventTypeId, GameEventDefinition>;

/// Value type of a game event parameter.
///
/// Tag zero terminates a parameter list and has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum GameEventValueType {
    String = 1,
    Float = 2,
    Long = 3,
    Short = 4,
    Byte = 5,
    Boolean = 6,
    Local = 7,
}

impl GameEventValueType {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for GameEventValueType {
    type Error = SchemaError;

    fn try_from(tag: u8) -> SchemaResult<Self> {
        Ok(match tag {
            1 => Self::String,
            2 => Self::Float,
            3 => Self::Long,
            4 => Self::Short,
            5 => Self::Byte,
            6 => Self::Boolean,
            7 => Self::Local,
            _ => return Err(SchemaError::UnknownEventValueType { tag }),
        })
    }
}

/// A named, typed parameter of a game event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameEventEntry {
    pub name: String,
    pub kind: GameEventValueType,
}

/// Schema of one game event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameEventDefinition {
    pub id: GameEventTypeId,
    pub name: String,
    pub entries: Vec<GameEventEntry>,
}

impl GameEventDefinition {
    #[must_use]
    pub fn new(id: GameEventTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn entry(mut self, name: impl Into<String>, kind: GameEventValueType) -> Self {
        self.entries.push(GameEventEntry {
            name: name.into(),
            kind,
        });
        self
    }
}
