//! Send prop definitions: type tags, encoding flags, and per-property layout.

use crate::error::{SchemaError, SchemaResult};

/// Wire type of a send prop, keyed by the protocol's integer tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SendPropType {
    Int = 0,
    Float = 1,
    Vector = 2,
    VectorXY = 3,
    String = 4,
    Array = 5,
    DataTable = 6,
}

impl SendPropType {
    /// Returns the protocol tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SendPropType {
    type Error = SchemaError;

    fn try_from(tag: u8) -> SchemaResult<Self> {
        Ok(match tag {
            0 => Self::Int,
            1 => Self::Float,
            2 => Self::Vector,
            3 => Self::VectorXY,
            4 => Self::String,
            5 => Self::Array,
            6 => Self::DataTable,
            _ => return Err(SchemaError::UnknownPropType { tag }),
        })
    }
}

/// Encoding flags of a send prop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SendPropFlags(u32);

impl SendPropFlags {
    /// Integers are unsigned.
    pub const UNSIGNED: u32 = 1 << 0;
    /// Float is a world coordinate.
    pub const COORD: u32 = 1 << 1;
    /// Float is sent as raw IEEE bits.
    pub const NO_SCALE: u32 = 1 << 2;
    /// Quantized float never reaches the high value.
    pub const ROUND_DOWN: u32 = 1 << 3;
    /// Quantized float never reaches the low value.
    pub const ROUND_UP: u32 = 1 << 4;
    /// Float is a unit normal; vector z is derived from x and y.
    pub const NORMAL: u32 = 1 << 5;
    /// Integer is sent as a protocol varint. Shares its bit with `NORMAL`.
    pub const VARINT: u32 = Self::NORMAL;
    pub const EXCLUDE: u32 = 1 << 6;
    pub const XYZE: u32 = 1 << 7;
    pub const INSIDE_ARRAY: u32 = 1 << 8;
    pub const PROXY_ALWAYS_YES: u32 = 1 << 9;
    pub const CHANGES_OFTEN: u32 = 1 << 10;
    pub const IS_VECTOR_ELEM: u32 = 1 << 11;
    pub const COLLAPSIBLE: u32 = 1 << 12;
    /// Multiplayer coordinate encoding.
    pub const COORD_MP: u32 = 1 << 13;
    pub const COORD_MP_LOW_PRECISION: u32 = 1 << 14;
    pub const COORD_MP_INTEGRAL: u32 = 1 << 15;

    /// Creates flags from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `flag` is set.
    #[must_use]
    pub const fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    /// Returns a copy with `flag` set.
    #[must_use]
    pub const fn with(self, flag: u32) -> Self {
        Self(self.0 | flag)
    }
}

/// One property of a flattened send table.
///
/// Scalar types use `bit_count`, `low_value` and `high_value` according to
/// their flags. Arrays carry their element definition in `element` and the
/// maximum element count in `num_elements`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SendPropDefinition {
    pub name: String,
    pub prop_type: SendPropType,
    pub flags: SendPropFlags,
    pub bit_count: u32,
    pub low_value: f32,
    pub high_value: f32,
    pub num_elements: u32,
    pub element: Option<Box<SendPropDefinition>>,
    pub table_name: Option<String>,
}

impl SendPropDefinition {
    /// Creates a definition with no flags and zeroed layout.
    #[must_use]
    pub fn new(name: impl Into<String>, prop_type: SendPropType) -> Self {
        Self {
            name: name.into(),
            prop_type,
            flags: SendPropFlags::default(),
            bit_count: 0,
            low_value: 0.0,
            high_value: 0.0,
            num_elements: 0,
            element: None,
            table_name: None,
        }
    }

    /// Creates a fixed-width integer definition.
    #[must_use]
    pub fn int(name: impl Into<String>, bit_count: u32) -> Self {
        Self {
            bit_count,
            ..Self::new(name, SendPropType::Int)
        }
    }

    /// Creates a quantized float definition over `[low_value, high_value]`.
    #[must_use]
    pub fn float(name: impl Into<String>, bit_count: u32, low_value: f32, high_value: f32) -> Self {
        Self {
            bit_count,
            low_value,
            high_value,
            ..Self::new(name, SendPropType::Float)
        }
    }

    /// Creates a three component vector whose components use the float rules.
    #[must_use]
    pub fn vector(name: impl Into<String>, bit_count: u32, low_value: f32, high_value: f32) -> Self {
        Self {
            prop_type: SendPropType::Vector,
            ..Self::float(name, bit_count, low_value, high_value)
        }
    }

    /// Creates a two component vector whose components use the float rules.
    #[must_use]
    pub fn vector_xy(
        name: impl Into<String>,
        bit_count: u32,
        low_value: f32,
        high_value: f32,
    ) -> Self {
        Self {
            prop_type: SendPropType::VectorXY,
            ..Self::float(name, bit_count, low_value, high_value)
        }
    }

    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, SendPropType::String)
    }

    /// Creates an array of up to `num_elements` values of `element`.
    #[must_use]
    pub fn array(name: impl Into<String>, num_elements: u32, element: Self) -> Self {
        Self {
            num_elements,
            element: Some(Box::new(element.with_flags(SendPropFlags::INSIDE_ARRAY))),
            ..Self::new(name, SendPropType::Array)
        }
    }

    /// Creates a reference to a nested table.
    #[must_use]
    pub fn data_table(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            table_name: Some(table_name.into()),
            ..Self::new(name, SendPropType::DataTable)
        }
    }

    /// Adds flags to the definition.
    #[must_use]
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = self.flags.with(flags);
        self
    }

    /// Returns `true` if the given flag bits are all set.
    #[must_use]
    pub const fn has_flag(&self, flag: u32) -> bool {
        self.flags.contains(flag)
    }

    /// Checks that the definition describes an encodable property.
    pub fn validate(&self) -> SchemaResult<()> {
        match self.prop_type {
            SendPropType::Int => {
                if !self.has_flag(SendPropFlags::VARINT) && self.bit_count > 64 {
                    return Err(self.invalid_bits());
                }
            }
            SendPropType::Float | SendPropType::Vector | SendPropType::VectorXY => {
                self.validate_float()?;
            }
            SendPropType::String => {}
            SendPropType::Array => {
                let element = self
                    .element
                    .as_deref()
                    .ok_or_else(|| SchemaError::MissingArrayElement {
                        prop: self.name.clone(),
                    })?;
                if matches!(
                    element.prop_type,
                    SendPropType::Array | SendPropType::DataTable
                ) {
                    return Err(SchemaError::InvalidArrayElement {
                        prop: self.name.clone(),
                    });
                }
                element.validate()?;
            }
            SendPropType::DataTable => {
                return Err(SchemaError::UnflattenedDataTable {
                    prop: self.name.clone(),
                    table: self.table_name.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_float(&self) -> SchemaResult<()> {
        const SPECIAL: u32 = SendPropFlags::COORD
            | SendPropFlags::COORD_MP
            | SendPropFlags::COORD_MP_LOW_PRECISION
            | SendPropFlags::COORD_MP_INTEGRAL
            | SendPropFlags::NO_SCALE
            | SendPropFlags::NORMAL;

        if self.flags.raw() & SPECIAL != 0 {
            return Ok(());
        }
        if self.has_flag(SendPropFlags::ROUND_DOWN | SendPropFlags::ROUND_UP) {
            return Err(SchemaError::ConflictingFlags {
                prop: self.name.clone(),
                flags: self.flags,
            });
        }
        if self.bit_count == 0 || self.bit_count > 32 {
            return Err(self.invalid_bits());
        }
        Ok(())
    }

    fn invalid_bits(&self) -> SchemaError {
        SchemaError::InvalidBitCount {
            prop: self.name.clone(),
            bits: self.bit_count,
        }
    }
}
