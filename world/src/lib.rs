#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the town.
//!
//! The world owns three stores: block records, the index binding town cells
//! to blocks, and entity records. Each block keeps the list of entities
//! situated in it; every public operation leaves that list in agreement with
//! the cell recorded on each entity.

use log::{debug, error, warn};
use town_core::{
    BlockId, BlockKind, CellCoord, Command, Corruption, EntityId, EntityKind, Event, IdSource,
    Missing, Mobility, MovementCapability, OffsetCoord, Position, RandomIds, TownError,
};
use town_system_movement::{admits_velocity, compute_step, MovementConfig};

mod blocks;
mod entities;

use blocks::{BlockRecord, BlockStore, TownIndex};
use entities::{EntityRecord, EntityStore};

/// Represents the authoritative town world state.
#[derive(Debug)]
pub struct World {
    ids: Box<dyn IdSource>,
    movement: MovementConfig,
    blocks: BlockStore,
    town: TownIndex,
    entities: EntityStore,
}

impl World {
    /// Creates an empty world that draws random identifiers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ids(RandomIds)
    }

    /// Creates an empty world drawing identifiers from `ids`.
    #[must_use]
    pub fn with_ids(ids: impl IdSource + 'static) -> Self {
        Self::with_config(ids, MovementConfig::default())
    }

    /// Creates an empty world with explicit identifier source and kinematics.
    #[must_use]
    pub fn with_config(ids: impl IdSource + 'static, movement: MovementConfig) -> Self {
        Self {
            ids: Box::new(ids),
            movement,
            blocks: BlockStore::default(),
            town: TownIndex::default(),
            entities: EntityStore::default(),
        }
    }

    /// Allocates a block with an empty membership list.
    ///
    /// The block is not reachable through any cell until [`World::place_block`]
    /// binds it.
    pub fn create_block(&mut self, kind: BlockKind, out_events: &mut Vec<Event>) -> BlockId {
        let id = BlockId::new(self.ids.new_id());
        self.blocks.insert(BlockRecord::new(id, kind));
        debug!("created {id} ({kind})");
        out_events.push(Event::BlockCreated { block: id, kind });
        id
    }

    /// Binds `cell` to an existing block.
    ///
    /// Cells and blocks are bound at most once; rebinding either is rejected.
    pub fn place_block(
        &mut self,
        cell: CellCoord,
        block: BlockId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), TownError> {
        if self.blocks.get(block).is_none() {
            return Err(Missing::Block(block).into());
        }
        self.town.bind(cell, block)?;
        debug!("placed {block} at {cell}");
        out_events.push(Event::BlockPlaced { block, cell });
        Ok(())
    }

    /// Creates an entity at the origin of the block bound to `cell`.
    ///
    /// The entity is listed in that block before this returns; nothing is
    /// created when the cell cannot be resolved.
    pub fn create_entity(
        &mut self,
        kind: EntityKind,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<EntityId, TownError> {
        let block = blocks::resolve(&self.town, &self.blocks, cell)?.id;
        let id = EntityId::new(self.ids.new_id());

        self.block_mut(cell, block)?.entities.push(id);
        self.entities.insert(EntityRecord {
            id,
            kind,
            position: Position::new(cell, OffsetCoord::ZERO),
            mobility: Mobility::Stationary,
        });

        debug!("spawned {id} ({kind}) in {block} at {cell}");
        out_events.push(Event::EntitySpawned {
            entity: id,
            kind,
            block,
            cell,
        });
        Ok(id)
    }

    /// Installs a fresh movement capability, replacing any previous one.
    ///
    /// Speeds outside `0..=max_speed` are rejected and the entity keeps its
    /// current capability.
    pub fn attach_movement(
        &mut self,
        entity: EntityId,
        speed: f32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), TownError> {
        let admitted = self.movement.admits_speed(speed);
        let record = self.entity_mut(entity)?;
        if !admitted {
            return Err(TownError::InvalidSpeed { speed });
        }
        record.mobility = Mobility::Mobile(MovementCapability::new(speed));
        out_events.push(Event::MovementAttached { entity, speed });
        Ok(())
    }

    fn set_velocity(
        &mut self,
        entity: EntityId,
        velocity: OffsetCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), TownError> {
        let record = self.entity_mut(entity)?;
        let Mobility::Mobile(capability) = record.mobility else {
            return Err(TownError::NotMobile { entity });
        };
        if !admits_velocity(velocity) {
            return Err(TownError::InvalidVelocity { entity, velocity });
        }
        record.mobility = Mobility::Mobile(capability.with_velocity(velocity));
        out_events.push(Event::VelocityChanged { entity, velocity });
        Ok(())
    }

    fn advance(&mut self, entity: EntityId, out_events: &mut Vec<Event>) -> Result<(), TownError> {
        let record = self.entity(entity)?;
        let capability = match record.mobility {
            Mobility::Stationary => return Err(TownError::NotMobile { entity }),
            Mobility::Mobile(capability) => capability,
        };

        let step = compute_step(record.position, &capability, &self.movement);
        let relocation = if step.crosses_cell() {
            Some(self.relocate(entity, step.from.cell, step.to.cell)?)
        } else {
            None
        };

        self.entity_mut(entity)?.position = step.to;
        debug!("{entity} advanced from {} to {}", step.from, step.to);
        out_events.push(Event::EntityAdvanced {
            entity,
            from: step.from,
            to: step.to,
        });
        if let Some((from, to)) = relocation {
            out_events.push(Event::EntityRelocated { entity, from, to });
        }
        Ok(())
    }

    /// Moves `entity` from the membership of the block at `from` to the block at `to`.
    ///
    /// Both blocks are resolved and the existing membership verified before
    /// either list changes, so a failure leaves the world untouched. The
    /// entity's own position is left for the caller to commit.
    fn relocate(
        &mut self,
        entity: EntityId,
        from: CellCoord,
        to: CellCoord,
    ) -> Result<(BlockId, BlockId), TownError> {
        let source = blocks::resolve(&self.town, &self.blocks, from)?;
        if !source.lists(entity) {
            return Err(Corruption::NotListed {
                entity,
                block: source.id,
            }
            .into());
        }
        let source = source.id;
        let target = blocks::resolve(&self.town, &self.blocks, to)?.id;

        if !self.block_mut(from, source)?.remove(entity) {
            return Err(Corruption::NotListed {
                entity,
                block: source,
            }
            .into());
        }
        self.block_mut(to, target)?.entities.push(entity);

        debug!("relocated {entity} from {source} at {from} to {target} at {to}");
        Ok((source, target))
    }

    fn block_mut(
        &mut self,
        cell: CellCoord,
        block: BlockId,
    ) -> Result<&mut BlockRecord, TownError> {
        self.blocks
            .get_mut(block)
            .ok_or(TownError::CorruptIndex(Corruption::DanglingCell { cell, block }))
    }

    fn entity(&self, entity: EntityId) -> Result<&EntityRecord, TownError> {
        self.entities
            .get(entity)
            .ok_or(TownError::NotFound(Missing::Entity(entity)))
    }

    fn entity_mut(&mut self, entity: EntityId) -> Result<&mut EntityRecord, TownError> {
        self.entities
            .get_mut(entity)
            .ok_or(TownError::NotFound(Missing::Entity(entity)))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world.
///
/// Failed commands emit no events and leave the world unchanged.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), TownError> {
    let result = match command {
        Command::AttachMovement { entity, speed } => {
            world.attach_movement(entity, speed, out_events)
        }
        Command::SetVelocity { entity, velocity } => {
            world.set_velocity(entity, velocity, out_events)
        }
        Command::Advance { entity } => world.advance(entity, out_events),
    };

    if let Err(failure) = &result {
        if failure.is_fatal() {
            error!("world index corrupted: {failure}");
        } else {
            warn!("command rejected: {failure}");
        }
    }
    result
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use town_core::{
        BlockId, BlockKind, BlockSnapshot, CellCoord, Corruption, EntityId, EntitySnapshot,
        Missing, TownError,
    };
    use town_system_movement::MovementConfig;

    use super::{blocks, BlockRecord, World};

    /// Resolves the block bound to `cell`.
    pub fn block_at(world: &World, cell: CellCoord) -> Result<BlockView<'_>, TownError> {
        let record = blocks::resolve(&world.town, &world.blocks, cell)?;
        Ok(BlockView { record, cell })
    }

    /// Looks up a block by identifier, whether placed or not.
    pub fn block(world: &World, block: BlockId) -> Result<BlockView<'_>, TownError> {
        let record = world
            .blocks
            .get(block)
            .ok_or(TownError::NotFound(Missing::Block(block)))?;
        Ok(BlockView {
            record,
            cell: world.town.cell_of(block).unwrap_or(CellCoord::UNSET),
        })
    }

    /// Captures the current state of an entity.
    pub fn entity(world: &World, entity: EntityId) -> Result<EntitySnapshot, TownError> {
        world.entity(entity).map(|record| record.snapshot())
    }

    /// Captures every entity listed in the block at `cell`, in membership order.
    pub fn entities_at(world: &World, cell: CellCoord) -> Result<Vec<EntitySnapshot>, TownError> {
        let block = blocks::resolve(&world.town, &world.blocks, cell)?;
        block
            .entities
            .iter()
            .map(|id| {
                world.entities.get(*id).map(|record| record.snapshot()).ok_or(
                    TownError::CorruptIndex(Corruption::DanglingMember {
                        entity: *id,
                        block: block.id,
                    }),
                )
            })
            .collect()
    }

    /// Lists every bound cell in ascending order.
    #[must_use]
    pub fn cells(world: &World) -> Vec<CellCoord> {
        let mut cells: Vec<CellCoord> = world.town.iter().map(|(cell, _)| cell).collect();
        cells.sort_unstable();
        cells
    }

    /// Captures every block, ordered by cell with unplaced blocks first.
    #[must_use]
    pub fn blocks(world: &World) -> Vec<BlockSnapshot> {
        let mut snapshots: Vec<BlockSnapshot> = world
            .blocks
            .iter()
            .map(|record| {
                let cell = world.town.cell_of(record.id).unwrap_or(CellCoord::UNSET);
                record.snapshot(cell)
            })
            .collect();
        snapshots.sort_by_key(|snapshot| (snapshot.cell, snapshot.id));
        snapshots
    }

    /// Number of block records held by the world.
    #[must_use]
    pub fn block_count(world: &World) -> usize {
        world.blocks.len()
    }

    /// Number of entity records held by the world.
    #[must_use]
    pub fn entity_count(world: &World) -> usize {
        world.entities.len()
    }

    /// Kinematics configuration used when advancing entities.
    #[must_use]
    pub fn movement_config(world: &World) -> MovementConfig {
        world.movement
    }

    /// Verifies that block memberships and entity cells agree.
    ///
    /// Every entity must be listed exactly once, in the block bound to its
    /// recorded cell, and every binding must point at an existing block. The
    /// first disagreement found is reported as [`TownError::CorruptIndex`].
    pub fn check_membership(world: &World) -> Result<(), TownError> {
        for (cell, block) in world.town.iter() {
            if world.blocks.get(block).is_none() {
                return Err(Corruption::DanglingCell { cell, block }.into());
            }
        }

        for entity in world.entities.iter() {
            let cell = entity.position.cell;
            let block = match blocks::resolve(&world.town, &world.blocks, cell) {
                Ok(block) => block,
                Err(TownError::NotFound(_)) => {
                    return Err(Corruption::Stranded {
                        entity: entity.id,
                        cell,
                    }
                    .into())
                }
                Err(other) => return Err(other),
            };
            match block.entities.iter().filter(|id| **id == entity.id).count() {
                0 => {
                    return Err(Corruption::NotListed {
                        entity: entity.id,
                        block: block.id,
                    }
                    .into())
                }
                1 => {}
                _ => return Err(Corruption::ListedTwice { entity: entity.id }.into()),
            }
        }

        for block in world.blocks.iter() {
            if block.entities.is_empty() {
                continue;
            }
            let Some(cell) = world.town.cell_of(block.id) else {
                return Err(Corruption::Unplaced { block: block.id }.into());
            };
            for id in &block.entities {
                let Some(entity) = world.entities.get(*id) else {
                    return Err(Corruption::DanglingMember {
                        entity: *id,
                        block: block.id,
                    }
                    .into());
                };
                if entity.position.cell != cell {
                    return Err(Corruption::Misplaced {
                        entity: *id,
                        block: block.id,
                    }
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Read-only view of a single block.
    #[derive(Clone, Copy, Debug)]
    pub struct BlockView<'a> {
        record: &'a BlockRecord,
        cell: CellCoord,
    }

    impl<'a> BlockView<'a> {
        /// Identifier of the block.
        #[must_use]
        pub fn id(&self) -> BlockId {
            self.record.id
        }

        /// Terrain of the block.
        #[must_use]
        pub fn kind(&self) -> BlockKind {
            self.record.kind
        }

        /// Cell the block occupies, or [`CellCoord::UNSET`] before placement.
        #[must_use]
        pub fn cell(&self) -> CellCoord {
            self.cell
        }

        /// Entities situated in the block, in membership order.
        #[must_use]
        pub fn entities(&self) -> &'a [EntityId] {
            &self.record.entities
        }

        /// Copies the view into an owned snapshot.
        #[must_use]
        pub fn snapshot(&self) -> BlockSnapshot {
            self.record.snapshot(self.cell)
        }
    }
}
