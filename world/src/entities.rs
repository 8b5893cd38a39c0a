//! Entity records owned by the world.

use std::collections::HashMap;

use town_core::{EntityId, EntityKind, EntitySnapshot, Mobility, Position};

/// Entity stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct EntityRecord {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    pub(crate) position: Position,
    pub(crate) mobility: Mobility,
}

impl EntityRecord {
    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            mobility: self.mobility,
        }
    }
}

/// Store that exclusively owns every entity record.
#[derive(Debug, Default)]
pub(crate) struct EntityStore {
    records: HashMap<EntityId, EntityRecord>,
}

impl EntityStore {
    pub(crate) fn insert(&mut self, record: EntityRecord) {
        let _ = self.records.insert(record.id, record);
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.records.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
