//! Send tables, server classes, and validation.

use std::collections::HashSet;
use std::fmt;

use crate::error::{SchemaError, SchemaResult};
use crate::SendPropDefinition;

/// Server class identifier, also the class id sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClassId(u16);

impl ClassId {
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for ClassId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

/// A flattened send table.
///
/// The position of a prop in `props` is the index used by the delta protocol,
/// so reordering props breaks compatibility with recorded data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SendTable {
    pub name: String,
    pub props: Vec<SendPropDefinition>,
}

impl SendTable {
    /// Creates a table after validation.
    pub fn new(name: impl Into<String>, props: Vec<SendPropDefinition>) -> SchemaResult<Self> {
        let table = Self {
            name: name.into(),
            props,
        };
        table.validate()?;
        Ok(table)
    }

    /// Creates a table builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SendTableBuilder {
        SendTableBuilder {
            name: name.into(),
            props: Vec::new(),
        }
    }

    /// Validates every prop.
    pub fn validate(&self) -> SchemaResult<()> {
        self.props.iter().try_for_each(SendPropDefinition::validate)
    }

    /// Returns the prop at a delta index.
    #[must_use]
    pub fn prop(&self, index: usize) -> Option<&SendPropDefinition> {
        self.props.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

/// Builder for `SendTable`.
#[derive(Debug, Default)]
pub struct SendTableBuilder {
    name: String,
    props: Vec<SendPropDefinition>,
}

impl SendTableBuilder {
    /// Appends a prop; it receives the next delta index.
    #[must_use]
    pub fn prop(mut self, prop: SendPropDefinition) -> Self {
        self.props.push(prop);
        self
    }

    /// Builds the table after validation.
    pub fn build(self) -> SchemaResult<SendTable> {
        SendTable::new(self.name, self.props)
    }
}

/// An entity type bound to a send table by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerClass {
    pub id: ClassId,
    pub name: String,
    pub data_table: String,
}

impl ServerClass {
    #[must_use]
    pub fn new(id: u16, name: impl Into<String>, data_table: impl Into<String>) -> Self {
        Self {
            id: ClassId::new(id),
            name: name.into(),
            data_table: data_table.into(),
        }
    }
}

/// Checks that no two classes share an id.
pub fn validate_classes(classes: &[ServerClass]) -> SchemaResult<()> {
    let mut seen = HashSet::new();
    for class in classes {
        if !seen.insert(class.id) {
            return Err(SchemaError::DuplicateClassId { id: class.id });
        }
    }
    Ok(())
}
