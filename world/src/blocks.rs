//! Block records and the index binding town cells to them.

use std::collections::HashMap;

use town_core::{
    BlockId, BlockKind, BlockSnapshot, CellCoord, Corruption, EntityId, Missing, TownError,
};

/// Block stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct BlockRecord {
    /// Identifier allocated by the world for the block.
    pub(crate) id: BlockId,
    /// Terrain of the block.
    pub(crate) kind: BlockKind,
    /// Entities situated in the block, in arrival order.
    pub(crate) entities: Vec<EntityId>,
}

impl BlockRecord {
    pub(crate) fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            entities: Vec::new(),
        }
    }

    pub(crate) fn lists(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    /// Removes `entity` from the membership list, reporting whether it was present.
    pub(crate) fn remove(&mut self, entity: EntityId) -> bool {
        match self.entities.iter().position(|member| *member == entity) {
            Some(index) => {
                let _ = self.entities.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn snapshot(&self, cell: CellCoord) -> BlockSnapshot {
        BlockSnapshot {
            id: self.id,
            kind: self.kind,
            cell,
            entities: self.entities.clone(),
        }
    }
}

/// Store that exclusively owns every block record.
#[derive(Debug, Default)]
pub(crate) struct BlockStore {
    records: HashMap<BlockId, BlockRecord>,
}

impl BlockStore {
    pub(crate) fn insert(&mut self, record: BlockRecord) {
        let _ = self.records.insert(record.id, record);
    }

    pub(crate) fn get(&self, id: BlockId) -> Option<&BlockRecord> {
        self.records.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: BlockId) -> Option<&mut BlockRecord> {
        self.records.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &BlockRecord> {
        self.records.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

/// Index from town cells to the blocks occupying them.
///
/// Holds identifiers only; records stay in the [`BlockStore`]. The reverse map
/// lets a block report its own cell without a scan.
#[derive(Debug, Default)]
pub(crate) struct TownIndex {
    cells: HashMap<CellCoord, BlockId>,
    placements: HashMap<BlockId, CellCoord>,
}

impl TownIndex {
    /// Binds `cell` to `block`, refusing to rebind either side.
    pub(crate) fn bind(&mut self, cell: CellCoord, block: BlockId) -> Result<(), TownError> {
        if let Some(existing) = self.cells.get(&cell) {
            return Err(TownError::CellAlreadyBound {
                cell,
                existing: *existing,
            });
        }
        if let Some(placed) = self.placements.get(&block) {
            return Err(TownError::BlockAlreadyPlaced {
                block,
                cell: *placed,
            });
        }

        let _ = self.cells.insert(cell, block);
        let _ = self.placements.insert(block, cell);
        Ok(())
    }

    pub(crate) fn block_id(&self, cell: CellCoord) -> Result<BlockId, TownError> {
        self.cells
            .get(&cell)
            .copied()
            .ok_or(TownError::NotFound(Missing::Cell(cell)))
    }

    pub(crate) fn cell_of(&self, block: BlockId) -> Option<CellCoord> {
        self.placements.get(&block).copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (CellCoord, BlockId)> + '_ {
        self.cells.iter().map(|(cell, block)| (*cell, *block))
    }
}

/// Resolves `cell` to its block record.
///
/// A binding without a backing record is reported as corruption, not as a
/// missing lookup.
pub(crate) fn resolve<'a>(
    index: &TownIndex,
    store: &'a BlockStore,
    cell: CellCoord,
) -> Result<&'a BlockRecord, TownError> {
    let block = index.block_id(cell)?;
    store
        .get(block)
        .ok_or(TownError::CorruptIndex(Corruption::DanglingCell { cell, block }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn block(n: u128) -> BlockId {
        BlockId::new(Uuid::from_u128(n))
    }

    fn entity(n: u128) -> EntityId {
        EntityId::new(Uuid::from_u128(n))
    }

    #[test]
    fn removal_reports_absent_members() {
        let mut record = BlockRecord::new(block(1), BlockKind::Grass);
        record.entities.push(entity(1));
        record.entities.push(entity(2));

        assert!(record.remove(entity(1)));
        assert!(!record.remove(entity(1)));
        assert_eq!(record.entities, vec![entity(2)]);
    }

    #[test]
    fn rebinding_a_cell_is_rejected() {
        let mut index = TownIndex::default();
        let cell = CellCoord::new(0, 0);
        index.bind(cell, block(1)).expect("first binding");

        assert_eq!(
            index.bind(cell, block(2)),
            Err(TownError::CellAlreadyBound {
                cell,
                existing: block(1),
            })
        );
        assert_eq!(index.block_id(cell), Ok(block(1)));
    }

    #[test]
    fn placing_a_block_twice_is_rejected() {
        let mut index = TownIndex::default();
        index.bind(CellCoord::new(0, 0), block(1)).expect("first binding");

        assert_eq!(
            index.bind(CellCoord::new(0, 1), block(1)),
            Err(TownError::BlockAlreadyPlaced {
                block: block(1),
                cell: CellCoord::new(0, 0),
            })
        );
        assert!(index.block_id(CellCoord::new(0, 1)).is_err());
    }

    #[test]
    fn dangling_binding_is_corruption() {
        let mut index = TownIndex::default();
        let store = BlockStore::default();
        let cell = CellCoord::new(2, 2);
        index.bind(cell, block(9)).expect("binding");

        let error = resolve(&index, &store, cell).expect_err("record is missing");
        assert!(error.is_fatal());
        assert_eq!(
            error,
            TownError::CorruptIndex(Corruption::DanglingCell {
                cell,
                block: block(9),
            })
        );
    }

    #[test]
    fn unbound_cell_is_not_found() {
        let index = TownIndex::default();
        let store = BlockStore::default();
        let cell = CellCoord::new(4, 4);

        assert_eq!(
            resolve(&index, &store, cell).map(|record| record.id),
            Err(TownError::NotFound(Missing::Cell(cell)))
        );
    }
}
