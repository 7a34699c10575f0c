//! Per-class baseline storage for entity deltas.

use std::collections::HashMap;

use schema::ClassId;

use crate::entity::PacketEntity;

/// Baselines keyed by server class.
///
/// An entity entering visibility is decoded as a delta against the baseline
/// of its class. Entries are overwritten, never evicted, until [`reset`].
///
/// [`reset`]: BaselineCache::reset
#[derive(Debug, Clone, Default)]
pub struct BaselineCache {
    entries: HashMap<ClassId, PacketEntity>,
}

impl BaselineCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no baseline is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if a baseline exists for `class`.
    #[must_use]
    pub fn contains(&self, class: ClassId) -> bool {
        self.entries.contains_key(&class)
    }

    /// Returns the baseline for `class`, if present.
    #[must_use]
    pub fn get(&self, class: ClassId) -> Option<&PacketEntity> {
        self.entries.get(&class)
    }

    /// Stores `entity` as the baseline of `class`, replacing any previous one.
    pub fn insert(&mut self, class: ClassId, entity: PacketEntity) {
        self.entries.insert(class, entity);
    }

    /// Drops all baselines.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
