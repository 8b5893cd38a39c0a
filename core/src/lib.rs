#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the town simulation.
//!
//! This crate defines the vocabulary that connects the console adapter, the
//! authoritative world, and the pure systems. Positions are tracked at two
//! resolutions: a [`CellCoord`] naming one block of the town grid and an
//! [`OffsetCoord`] locating the entity inside that block. Adapters and
//! systems submit [`Command`] values, the world executes them via its `apply`
//! entry point and reports what changed as [`Event`] values.

use std::fmt;

use serde::{Deserialize, Serialize};

mod error;
mod ids;

pub use error::{Corruption, Missing, TownError};
pub use ids::{BlockId, EntityId, IdSource, RandomIds, SequentialIds};

/// Commands that express all permissible entity mutations after seeding.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs a movement capability on an entity, replacing any previous one.
    AttachMovement {
        /// Entity receiving the capability.
        entity: EntityId,
        /// Scalar speed expressed in speed units per advance.
        speed: f32,
    },
    /// Points an entity's movement capability in a new direction.
    SetVelocity {
        /// Entity being steered.
        entity: EntityId,
        /// Direction of travel, expected but not required to be unit length.
        velocity: OffsetCoord,
    },
    /// Moves an entity by one step along its current velocity.
    Advance {
        /// Entity being moved.
        entity: EntityId,
    },
}

/// Events broadcast by the world after processing seeding calls and commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a block record was allocated.
    BlockCreated {
        /// Identifier assigned to the block.
        block: BlockId,
        /// Terrain of the block.
        kind: BlockKind,
    },
    /// Confirms that a block was bound to a cell of the town grid.
    BlockPlaced {
        /// Block that was bound.
        block: BlockId,
        /// Cell the block now occupies.
        cell: CellCoord,
    },
    /// Confirms that an entity was created and listed in its starting block.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Kind of the new entity.
        kind: EntityKind,
        /// Block the entity starts in.
        block: BlockId,
        /// Cell of that block.
        cell: CellCoord,
    },
    /// Confirms that an entity received a movement capability.
    MovementAttached {
        /// Entity that became mobile.
        entity: EntityId,
        /// Speed installed on the capability.
        speed: f32,
    },
    /// Confirms that an entity's velocity was replaced.
    VelocityChanged {
        /// Entity that was steered.
        entity: EntityId,
        /// New direction of travel.
        velocity: OffsetCoord,
    },
    /// Confirms that an entity completed a step.
    EntityAdvanced {
        /// Entity that moved.
        entity: EntityId,
        /// Position before the step.
        from: Position,
        /// Position after the step.
        to: Position,
    },
    /// Confirms that an entity left one block's membership for another's.
    EntityRelocated {
        /// Entity that changed blocks.
        entity: EntityId,
        /// Block the entity left.
        from: BlockId,
        /// Block the entity joined.
        to: BlockId,
    },
}

/// Terrain assigned to a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Open grass.
    Grass,
    /// Paved road.
    Road,
    /// Built-up plot.
    Building,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Grass => "grass",
            Self::Road => "road",
            Self::Building => "building",
        };
        f.write_str(label)
    }
}

/// Kinds of entities that may inhabit a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Placeholder kind carrying no behaviour.
    None,
    /// Player-controlled character.
    Hero,
    /// Immobile scenery.
    Tree,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "none",
            Self::Hero => "hero",
            Self::Tree => "tree",
        };
        f.write_str(label)
    }
}

/// Location of a block within the unbounded town grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Sentinel meaning "no cell assigned".
    pub const UNSET: Self = Self::new(-1, -1);

    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Index of the cell along the requested axis.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Returns a copy with the index along `axis` replaced.
    #[must_use]
    pub const fn with(self, axis: Axis, value: i32) -> Self {
        match axis {
            Axis::X => Self::new(value, self.y),
            Axis::Y => Self::new(self.x, value),
        }
    }

    /// Reports whether the coordinate is the [`CellCoord::UNSET`] sentinel.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.x == Self::UNSET.x && self.y == Self::UNSET.y
    }
}

impl Default for CellCoord {
    fn default() -> Self {
        Self::UNSET
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Position inside a block, each axis a signed fraction of the block width.
///
/// Values are meant to stay within `[-1.0, 1.0)`; nothing enforces that on
/// construction; only the movement carry keeps positions in range. The same
/// type doubles as a direction vector for velocities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetCoord {
    x: f32,
    y: f32,
}

impl OffsetCoord {
    /// Offset at the origin of a block.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new offset.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Component along the requested axis.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Returns a copy with the component along `axis` replaced.
    #[must_use]
    pub const fn with(self, axis: Axis, value: f32) -> Self {
        match axis {
            Axis::X => Self::new(value, self.y),
            Axis::Y => Self::new(self.x, value),
        }
    }

    /// Dot product with another vector.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Squared Euclidean length.
    #[must_use]
    pub fn length_sq(self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    /// Unit vector pointing the same way, or zero for the zero vector.
    #[must_use]
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return Self::ZERO;
        }
        Self::new(self.x / length, self.y / length)
    }

    /// Reports whether both components are exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl fmt::Display for OffsetCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// One of the two independent axes of the town plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis, `left` in the town's own terms.
    X,
    /// Vertical axis, `top` in the town's own terms.
    Y,
}

impl Axis {
    /// Both axes in evaluation order.
    pub const ALL: [Self; 2] = [Self::X, Self::Y];
}

/// Full position of an entity at both resolutions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Block cell the entity stands in.
    pub cell: CellCoord,
    /// Location inside that block.
    pub offset: OffsetCoord,
}

impl Position {
    /// Creates a position from its two parts.
    #[must_use]
    pub const fn new(cell: CellCoord, offset: OffsetCoord) -> Self {
        Self { cell, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.cell, self.offset)
    }
}

/// Speed and heading that make an entity mobile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementCapability {
    speed: f32,
    velocity: OffsetCoord,
}

impl MovementCapability {
    /// Creates a stationary capability travelling at `speed` once steered.
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self {
            speed,
            velocity: OffsetCoord::ZERO,
        }
    }

    /// Scalar speed in speed units per advance.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Current direction of travel.
    #[must_use]
    pub const fn velocity(&self) -> OffsetCoord {
        self.velocity
    }

    /// Returns a copy heading along `velocity`.
    #[must_use]
    pub const fn with_velocity(self, velocity: OffsetCoord) -> Self {
        Self {
            speed: self.speed,
            velocity,
        }
    }
}

/// Whether an entity can move, and how.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Mobility {
    /// The entity never moves.
    #[default]
    Stationary,
    /// The entity moves according to the capability.
    Mobile(MovementCapability),
}

impl Mobility {
    /// Reports whether the entity is mobile with a non-zero velocity.
    ///
    /// Speed is not consulted; a zero-speed entity with a heading still counts
    /// as moving even though its advances cover no distance.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        match self {
            Self::Stationary => false,
            Self::Mobile(capability) => !capability.velocity().is_zero(),
        }
    }

    /// Movement capability, if the entity has one.
    #[must_use]
    pub const fn capability(&self) -> Option<&MovementCapability> {
        match self {
            Self::Stationary => None,
            Self::Mobile(capability) => Some(capability),
        }
    }
}

/// Immutable representation of a block used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    /// Identifier of the block.
    pub id: BlockId,
    /// Terrain of the block.
    pub kind: BlockKind,
    /// Cell the block occupies, or [`CellCoord::UNSET`] before placement.
    pub cell: CellCoord,
    /// Entities currently listed in the block, in membership order.
    pub entities: Vec<EntityId>,
}

/// Immutable representation of an entity used for queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Identifier of the entity.
    pub id: EntityId,
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Position at both resolutions.
    pub position: Position,
    /// Movement capability, if any.
    pub mobility: Mobility,
}

#[cfg(test)]
mod tests {
    use super::{BlockId, CellCoord, EntityId, Mobility, MovementCapability, OffsetCoord};
    use serde::{de::DeserializeOwned, Serialize};
    use uuid::Uuid;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&BlockId::new(Uuid::from_u128(9)));
        assert_round_trip(&EntityId::new(Uuid::from_u128(11)));
    }

    #[test]
    fn default_cell_is_unset() {
        let cell = CellCoord::default();
        assert_eq!(cell, CellCoord::new(-1, -1));
        assert!(cell.is_unset());
        assert!(!CellCoord::new(0, 0).is_unset());
    }

    #[test]
    fn cell_coordinates_compare_by_value() {
        use std::collections::HashMap;

        let mut index = HashMap::new();
        let _ = index.insert(CellCoord::new(3, -2), "a");
        assert_eq!(index.get(&CellCoord::new(3, -2)), Some(&"a"));
        assert_eq!(index.get(&CellCoord::new(-2, 3)), None);
    }

    #[test]
    fn normalized_diagonal_is_unit_length() {
        let diagonal = OffsetCoord::new(1.0, 1.0).normalized();
        assert!((diagonal.length() - 1.0).abs() < 1e-6);
        assert!((diagonal.x() - diagonal.y()).abs() < f32::EPSILON);
    }

    #[test]
    fn normalizing_zero_vector_yields_zero() {
        assert_eq!(OffsetCoord::ZERO.normalized(), OffsetCoord::ZERO);
    }

    #[test]
    fn mobility_reports_motion_from_velocity_alone() {
        let idle = MovementCapability::new(20.0);
        assert!(!Mobility::Stationary.is_moving());
        assert!(!Mobility::Mobile(idle).is_moving());
        assert!(Mobility::Mobile(idle.with_velocity(OffsetCoord::new(1.0, 0.0))).is_moving());
        assert!(Mobility::Mobile(
            MovementCapability::new(0.0).with_velocity(OffsetCoord::new(1.0, 0.0))
        )
        .is_moving());
    }
}
