//! Entities and their property update lists.

use std::collections::BTreeMap;

use bitstream::{BitReader, BitResult, BitWriter};
use schema::{ClassId, SendTable};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;
use crate::props::{decode_prop_value, encode_prop_value};
use crate::types::SendPropValue;

/// Property values keyed by their index in the flattened send table.
pub type PropMap = BTreeMap<u16, SendPropValue>;

/// Visibility transition of an entity within one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum Pvs {
    /// Entity becomes visible; carries a class id, serial and full delta.
    Enter,
    /// Entity stays visible; carries a delta.
    ///
    /// Decoded entities hold only the changed props, applied to an empty
    /// map, and report `in_pvs = true` since the entity is still visible.
    /// Merging the delta into earlier state is left to the caller.
    Preserve,
    /// Entity leaves visibility but stays alive.
    Leave,
    /// Entity leaves visibility and is destroyed.
    Delete,
}

impl Pvs {
    /// Maps the two wire bits to a transition.
    #[must_use]
    pub const fn from_bits(hi: bool, low: bool) -> Self {
        match (hi, low) {
            (false, true) => Self::Enter,
            (false, false) => Self::Preserve,
            (true, false) => Self::Leave,
            (true, true) => Self::Delete,
        }
    }

    /// Returns the `(hi, low)` wire bits.
    #[must_use]
    pub const fn bits(self) -> (bool, bool) {
        match self {
            Self::Enter => (false, true),
            Self::Preserve => (false, false),
            Self::Leave => (true, false),
            Self::Delete => (true, true),
        }
    }

    /// Returns `true` if a property update list follows on the wire.
    #[must_use]
    pub const fn has_props(self) -> bool {
        matches!(self, Self::Enter | Self::Preserve)
    }
}

pub(crate) fn read_pvs(reader: &mut BitReader<'_>) -> BitResult<Pvs> {
    let hi = reader.read_bool()?;
    let low = reader.read_bool()?;
    Ok(Pvs::from_bits(hi, low))
}

pub(crate) fn write_pvs(pvs: Pvs, writer: &mut BitWriter) {
    let (hi, low) = pvs.bits();
    writer.write_bool(hi);
    writer.write_bool(low);
}

/// An entity as seen in one packet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PacketEntity {
    pub server_class: ClassId,
    pub entity_index: u32,
    pub serial_number: u32,
    pub pvs: Pvs,
    pub in_pvs: bool,
    #[cfg_attr(feature = "serde", serde(with = "prop_keys"))]
    pub props: PropMap,
}

/// Prop maps keyed by decimal strings, so they survive the buffering done
/// by internally tagged enums.
#[cfg(feature = "serde")]
mod prop_keys {
    use std::collections::BTreeMap;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::PropMap;
    use crate::types::SendPropValue;

    pub fn serialize<S: Serializer>(props: &PropMap, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(props.iter().map(|(index, value)| (index.to_string(), value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PropMap, D::Error> {
        BTreeMap::<String, SendPropValue>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, value)| {
                key.parse::<u16>()
                    .map(|index| (index, value))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

impl PacketEntity {
    /// Creates an entity with no properties.
    #[must_use]
    pub fn new(server_class: ClassId, entity_index: u32, serial_number: u32, pvs: Pvs) -> Self {
        Self {
            server_class,
            entity_index,
            serial_number,
            pvs,
            in_pvs: false,
            props: PropMap::new(),
        }
    }

    /// Returns the value at a property index.
    #[must_use]
    pub fn prop(&self, index: u16) -> Option<&SendPropValue> {
        self.props.get(&index)
    }

    /// Sets a property value, returning `self` for chaining.
    #[must_use]
    pub fn with_prop(mut self, index: u16, value: impl Into<SendPropValue>) -> Self {
        self.props.insert(index, value.into());
        self
    }

    /// Returns the properties of `self` that are missing from or differ in `baseline`.
    #[must_use]
    pub fn changed_props(&self, baseline: &Self) -> PropMap {
        self.props
            .iter()
            .filter(|(index, value)| baseline.props.get(*index) != Some(*value))
            .map(|(index, value)| (*index, value.clone()))
            .collect()
    }
}

/// Reads a property update list and applies it over `props`.
///
/// Indices accumulate: each entry is `previous + ubit_var + 1`, starting
/// from -1.
pub fn read_prop_updates(
    props: &mut PropMap,
    table: &SendTable,
    reader: &mut BitReader<'_>,
    limits: &CodecLimits,
) -> CodecResult<()> {
    let mut index: i64 = -1;
    while reader.read_bool()? {
        index += i64::from(reader.read_ubit_var()?) + 1;
        if index as u64 > limits.max_prop_index as u64 {
            return Err(CodecError::LimitsExceeded {
                kind: LimitKind::PropIndex,
                limit: limits.max_prop_index,
                actual: index as usize,
            });
        }
        let (key, def) = u16::try_from(index)
            .ok()
            .and_then(|key| table.prop(usize::from(key)).map(|def| (key, def)))
            .ok_or_else(|| CodecError::PropIndexOutOfRange {
                table: table.name.clone(),
                index,
                len: table.len(),
            })?;
        let value = decode_prop_value(def, reader, limits)?;
        props.insert(key, value);
    }
    Ok(())
}

/// Writes `props` as a property update list.
pub fn write_prop_updates(
    props: &PropMap,
    table: &SendTable,
    writer: &mut BitWriter,
) -> CodecResult<()> {
    let mut last: i64 = -1;
    for (&index, value) in props {
        let def = table
            .prop(usize::from(index))
            .ok_or_else(|| CodecError::PropIndexOutOfRange {
                table: table.name.clone(),
                index: i64::from(index),
                len: table.len(),
            })?;
        writer.write_bool(true);
        writer.write_ubit_var((i64::from(index) - last - 1) as u32);
        encode_prop_value(value, def, writer)?;
        last = i64::from(index);
    }
    writer.write_bool(false);
    Ok(())
}
