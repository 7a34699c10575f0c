//! Decoded property values.

use schema::SendPropType;

/// A three component vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A two component vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VectorXY {
    pub x: f32,
    pub y: f32,
}

impl VectorXY {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A decoded send prop value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SendPropValue {
    Integer(i64),
    Float(f32),
    Vector(Vector),
    VectorXY(VectorXY),
    String(String),
    Array(Vec<SendPropValue>),
}

impl SendPropValue {
    /// Returns the prop type that produces this variant.
    #[must_use]
    pub const fn prop_type(&self) -> SendPropType {
        match self {
            Self::Integer(_) => SendPropType::Int,
            Self::Float(_) => SendPropType::Float,
            Self::Vector(_) => SendPropType::Vector,
            Self::VectorXY(_) => SendPropType::VectorXY,
            Self::String(_) => SendPropType::String,
            Self::Array(_) => SendPropType::Array,
        }
    }
}

impl From<i64> for SendPropValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f32> for SendPropValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<Vector> for SendPropValue {
    fn from(value: Vector) -> Self {
        Self::Vector(value)
    }
}

impl From<VectorXY> for SendPropValue {
    fn from(value: VectorXY) -> Self {
        Self::VectorXY(value)
    }
}

impl From<&str> for SendPropValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
