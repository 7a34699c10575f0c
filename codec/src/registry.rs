//! Server classes, send tables and static baselines of a session.

use std::collections::HashMap;

use bitstream::{bits_needed, BitBuf};
use schema::{validate_classes, ClassId, SendTable, ServerClass};
use wire::StringTable;

use crate::error::{CodecError, CodecResult};

/// Name of the string table carrying static baselines.
pub const INSTANCE_BASELINE_TABLE: &str = "instancebaseline";

/// Immutable class schema plus the static baselines announced for it.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<ClassId, ServerClass>,
    tables: HashMap<String, SendTable>,
    static_baselines: HashMap<ClassId, BitBuf>,
}

impl ClassRegistry {
    /// Builds a registry after validating every class and table.
    pub fn new(classes: Vec<ServerClass>, tables: Vec<SendTable>) -> CodecResult<Self> {
        validate_classes(&classes)?;
        for table in &tables {
            table.validate()?;
        }
        Ok(Self {
            classes: classes.into_iter().map(|class| (class.id, class)).collect(),
            tables: tables
                .into_iter()
                .map(|table| (table.name.clone(), table))
                .collect(),
            static_baselines: HashMap::new(),
        })
    }

    /// Returns the number of server classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Width of a class id on the wire: `ceil(log2(class_count))`.
    #[must_use]
    pub fn class_bits(&self) -> usize {
        match self.classes.len() {
            0 | 1 => 0,
            count => bits_needed((count - 1) as u32),
        }
    }

    pub fn class(&self, id: ClassId) -> CodecResult<&ServerClass> {
        self.classes
            .get(&id)
            .ok_or(CodecError::UnknownServerClass {
                id: u32::from(id.get()),
            })
    }

    /// Resolves the flattened send table of a class.
    pub fn table_for(&self, id: ClassId) -> CodecResult<&SendTable> {
        let class = self.class(id)?;
        self.tables
            .get(&class.data_table)
            .ok_or_else(|| CodecError::UnknownSendTable {
                class: id,
                table: class.data_table.clone(),
            })
    }

    pub fn set_static_baseline(&mut self, id: ClassId, data: BitBuf) {
        self.static_baselines.insert(id, data);
    }

    #[must_use]
    pub fn static_baseline(&self, id: ClassId) -> Option<&BitBuf> {
        self.static_baselines.get(&id)
    }

    pub fn clear_static_baselines(&mut self) {
        self.static_baselines.clear();
    }

    /// Records the static baselines of an `instancebaseline` table.
    ///
    /// Entry text is the decimal class id and the user data holds the encoded
    /// property list. Returns the number of baselines stored.
    pub fn load_static_baselines(&mut self, table: &StringTable) -> usize {
        let mut loaded = 0;
        for entry in table.entries.iter().flatten() {
            let (Some(text), Some(data)) = (&entry.text, &entry.extra_data) else {
                continue;
            };
            match text.parse::<u16>() {
                Ok(id) => {
                    self.set_static_baseline(ClassId::new(id), data.clone());
                    loaded += 1;
                }
                Err(_) => {
                    tracing::warn!(entry = %text, "skipping static baseline with non-numeric class id");
                }
            }
        }
        tracing::debug!(table = %table.name, loaded, "static baselines loaded");
        loaded
    }
}
