//! Opaque identifiers handed out to blocks and entities.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier assigned to a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(Uuid);

impl BlockId {
    /// Wraps the provided token as a block identifier.
    #[must_use]
    pub const fn new(value: Uuid) -> Self {
        Self(value)
    }

    /// Retrieves the underlying token.
    #[must_use]
    pub const fn get(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block:{}", self.0)
    }
}

/// Unique identifier assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Wraps the provided token as an entity identifier.
    #[must_use]
    pub const fn new(value: Uuid) -> Self {
        Self(value)
    }

    /// Retrieves the underlying token.
    #[must_use]
    pub const fn get(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity:{}", self.0)
    }
}

/// Capability that produces globally unique tokens for blocks and entities.
///
/// No ordering guarantee is attached to the produced tokens.
pub trait IdSource: fmt::Debug {
    /// Produces a token that has never been returned by this source before.
    fn new_id(&mut self) -> Uuid;
}

/// Random version 4 tokens.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn new_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic tokens counting upwards from a starting value.
///
/// Two sources created with the same start produce identical sequences, which
/// keeps replays and tests reproducible.
#[derive(Clone, Copy, Debug)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    /// Creates a source whose first token encodes `start`.
    #[must_use]
    pub const fn starting_at(start: u128) -> Self {
        Self { next: start }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSource for SequentialIds {
    fn new_id(&mut self) -> Uuid {
        let id = Uuid::from_u128(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}
