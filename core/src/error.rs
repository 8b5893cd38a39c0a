//! Failures reported by the town world.

use thiserror::Error;

use crate::{BlockId, CellCoord, EntityId, OffsetCoord};

/// Errors produced while querying or mutating the town.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum TownError {
    /// The requested cell or identifier is not known to the world.
    #[error("not found: {0}")]
    NotFound(Missing),
    /// The block/entity index disagrees with itself.
    ///
    /// Signals a defect inside the world rather than bad input.
    #[error("corrupt index: {0}")]
    CorruptIndex(Corruption),
    /// A movement command targeted an entity without a movement capability.
    #[error("{entity} cannot move")]
    NotMobile {
        /// Entity the command targeted.
        entity: EntityId,
    },
    /// A movement capability was requested with a speed outside `0..=max_speed`.
    #[error("speed {speed} is outside the configured range")]
    InvalidSpeed {
        /// Rejected speed.
        speed: f32,
    },
    /// A velocity component fell outside `-1.0..=1.0` or was not finite.
    #[error("{entity} cannot head along {velocity}")]
    InvalidVelocity {
        /// Entity the command targeted.
        entity: EntityId,
        /// Rejected velocity.
        velocity: OffsetCoord,
    },
    /// A block placement targeted a cell that is already bound.
    #[error("cell {cell} is already bound to {existing}")]
    CellAlreadyBound {
        /// Cell named by the placement.
        cell: CellCoord,
        /// Block that already occupies the cell.
        existing: BlockId,
    },
    /// A block placement targeted a block that already occupies another cell.
    #[error("{block} is already placed at {cell}")]
    BlockAlreadyPlaced {
        /// Block named by the placement.
        block: BlockId,
        /// Cell the block already occupies.
        cell: CellCoord,
    },
}

impl TownError {
    /// Reports whether the error indicates broken world state.
    ///
    /// Callers must abort instead of continuing when this returns `true`.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::CorruptIndex(_))
    }
}

impl From<Missing> for TownError {
    fn from(missing: Missing) -> Self {
        Self::NotFound(missing)
    }
}

impl From<Corruption> for TownError {
    fn from(corruption: Corruption) -> Self {
        Self::CorruptIndex(corruption)
    }
}

/// Lookup that failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Missing {
    /// No block is bound to the cell.
    #[error("no block at cell {0}")]
    Cell(CellCoord),
    /// No block record carries the identifier.
    #[error("unknown {0}")]
    Block(BlockId),
    /// No entity record carries the identifier.
    #[error("unknown {0}")]
    Entity(EntityId),
}

/// Specific way in which the world index was found to be inconsistent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Corruption {
    /// A cell is bound to a block id that has no backing record.
    #[error("cell {cell} is bound to {block} which has no record")]
    DanglingCell {
        /// Cell holding the dangling binding.
        cell: CellCoord,
        /// Identifier the cell points at.
        block: BlockId,
    },
    /// An entity is missing from the membership list of the block at its cell.
    #[error("{entity} is not listed in {block}")]
    NotListed {
        /// Entity whose membership is missing.
        entity: EntityId,
        /// Block expected to list the entity.
        block: BlockId,
    },
    /// An entity's recorded cell is not bound to any block.
    #[error("{entity} is recorded at unbound cell {cell}")]
    Stranded {
        /// Entity with the stale cell.
        entity: EntityId,
        /// Cell recorded on the entity.
        cell: CellCoord,
    },
    /// An entity appears more than once across membership lists.
    #[error("{entity} is listed more than once")]
    ListedTwice {
        /// Entity with duplicate membership.
        entity: EntityId,
    },
    /// A block lists an entity whose recorded cell is elsewhere.
    #[error("{block} lists {entity} which is recorded elsewhere")]
    Misplaced {
        /// Entity listed in the wrong block.
        entity: EntityId,
        /// Block holding the stale membership.
        block: BlockId,
    },
    /// A block lists an entity that has no record.
    #[error("{block} lists {entity} which has no record")]
    DanglingMember {
        /// Identifier without a record.
        entity: EntityId,
        /// Block holding the stale membership.
        block: BlockId,
    },
    /// A block holding members is not bound to any cell.
    #[error("{block} holds members but is not placed")]
    Unplaced {
        /// Block without a cell.
        block: BlockId,
    },
}
