#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement kinematics for the town and the steering system built on them.
//!
//! An entity's position is split into a block cell and an offset inside that
//! block. A step scales the entity's velocity by its speed, adds the result to
//! the offset on each axis independently, and carries any overflow past the
//! positive edge of the block into the next cell. Overflow past the negative
//! edge is not carried; the offset is left below `-1.0`.

use log::debug;
use town_core::{Axis, Command, EntityId, MovementCapability, OffsetCoord, Position};

/// Speed that traverses one full block width per advance.
pub const MAX_MOVEMENT_SPEED: f32 = 100.0;

/// Configuration parameters of the movement kinematics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementConfig {
    max_speed: f32,
}

impl MovementConfig {
    /// Creates a configuration where `max_speed` covers one block per advance.
    ///
    /// Non-positive or non-finite values fall back to [`MAX_MOVEMENT_SPEED`].
    #[must_use]
    pub fn new(max_speed: f32) -> Self {
        if max_speed.is_finite() && max_speed > 0.0 {
            Self { max_speed }
        } else {
            Self::default()
        }
    }

    /// Speed that traverses one full block width per advance.
    #[must_use]
    pub const fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Reports whether `speed` lies within `0..=max_speed`.
    ///
    /// Faster speeds would let a single carry leave the offset at or past the
    /// positive edge of the next block.
    #[must_use]
    pub fn admits_speed(&self, speed: f32) -> bool {
        speed.is_finite() && (0.0..=self.max_speed).contains(&speed)
    }

    /// Converts speed units into the fraction of a block covered per advance.
    #[must_use]
    pub fn normalized_speed(&self, speed: f32) -> f32 {
        speed / self.max_speed
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_speed: MAX_MOVEMENT_SPEED,
        }
    }
}

/// Reports whether every component of `velocity` lies within `-1.0..=1.0`.
#[must_use]
pub fn admits_velocity(velocity: OffsetCoord) -> bool {
    Axis::ALL.into_iter().all(|axis| {
        let component = velocity.along(axis);
        component.is_finite() && (-1.0..=1.0).contains(&component)
    })
}

/// Candidate position produced by a single advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// Position before the advance.
    pub from: Position,
    /// Position after the advance.
    pub to: Position,
}

impl Step {
    /// Reports whether the step leaves the starting block.
    #[must_use]
    pub fn crosses_cell(&self) -> bool {
        self.from.cell != self.to.cell
    }
}

/// Computes where an entity ends up after one advance.
///
/// Both axes are resolved independently, so a diagonal step may carry into a
/// new cell on either axis or on both.
#[must_use]
pub fn compute_step(
    from: Position,
    capability: &MovementCapability,
    config: &MovementConfig,
) -> Step {
    let speed = config.normalized_speed(capability.speed());
    let velocity = capability.velocity();

    let mut to = from;
    for axis in Axis::ALL {
        let delta = velocity.along(axis) * speed;
        let (cell, offset) = move_axis(from.cell.along(axis), from.offset.along(axis), delta);
        to.cell = to.cell.with(axis, cell);
        to.offset = to.offset.with(axis, offset);
    }

    Step { from, to }
}

/// Applies `delta` to one axis, carrying positive overflow into the next cell.
#[must_use]
pub fn move_axis(cell: i32, offset: f32, delta: f32) -> (i32, f32) {
    let remainder = 1.0 - (offset + delta);
    if remainder < 0.0 {
        // Wraps to an unbound cell at the end of the i32 range, so the world
        // rejects the advance instead of the step panicking.
        (cell.wrapping_add(1), -1.0 + remainder.abs())
    } else {
        (cell, offset + delta)
    }
}

/// Direction a player can ask an entity to walk in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    /// Both axes at once, normalised to unit length.
    Diagonal,
    /// Along the horizontal axis only.
    Horizontal,
    /// Along the vertical axis only.
    Vertical,
}

impl Heading {
    /// Velocity installed when walking along this heading.
    #[must_use]
    pub fn velocity(self) -> OffsetCoord {
        match self {
            Self::Diagonal => OffsetCoord::new(1.0, 1.0).normalized(),
            Self::Horizontal => OffsetCoord::new(1.0, 0.0),
            Self::Vertical => OffsetCoord::new(0.0, 1.0),
        }
    }
}

/// Pure system that turns walking intents into movement commands.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Emits the commands that point `entity` along `heading` and take one step.
    pub fn steer(&self, entity: EntityId, heading: Heading, out: &mut Vec<Command>) {
        debug!("steering {entity} {heading:?}");
        out.push(Command::SetVelocity {
            entity,
            velocity: heading.velocity(),
        });
        out.push(Command::Advance { entity });
    }
}
