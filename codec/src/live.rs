//! Live entity bookkeeping across packets.

use std::collections::HashMap;

use schema::ClassId;

use crate::entity::Pvs;
use crate::error::{CodecError, CodecResult};
use crate::packet_entities::PacketEntitiesPacket;

/// Server class of every entity alive in the session, keyed by entity index.
///
/// Continuing entities carry no class id on the wire, so the decoder resolves
/// it here. The table only changes through [`LiveEntities::apply`] (or the
/// explicit insert/remove helpers), never as a side effect of decoding.
#[derive(Debug, Clone, Default)]
pub struct LiveEntities {
    classes: HashMap<u32, ClassId>,
}

impl LiveEntities {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Returns the class of a live entity.
    pub fn class_of(&self, entity_index: u32) -> CodecResult<ClassId> {
        self.classes
            .get(&entity_index)
            .copied()
            .ok_or(CodecError::UnknownEntity {
                index: entity_index,
            })
    }

    pub fn insert(&mut self, entity_index: u32, class: ClassId) {
        self.classes.insert(entity_index, class);
    }

    pub fn remove(&mut self, entity_index: u32) -> Option<ClassId> {
        self.classes.remove(&entity_index)
    }

    /// Folds a decoded packet into the table.
    ///
    /// ENTER registers the entity, DELETE and the removal list drop it.
    /// LEAVE keeps it alive.
    pub fn apply(&mut self, packet: &PacketEntitiesPacket) {
        for entity in &packet.entities {
            match entity.pvs {
                Pvs::Enter => self.insert(entity.entity_index, entity.server_class),
                Pvs::Delete => {
                    self.remove(entity.entity_index);
                }
                Pvs::Preserve | Pvs::Leave => {}
            }
        }
        for index in &packet.removed_entities {
            self.remove(*index);
        }
    }

    pub fn reset(&mut self) {
        self.classes.clear();
    }
}
