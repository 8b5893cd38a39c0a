#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that seeds a fresh town.

use log::info;
use town_core::{BlockKind, CellCoord, Command, EntityId, EntityKind, Event, TownError};
use town_world::{self as world, query, World};

/// Configuration parameters describing the initial town.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    columns: i32,
    rows: i32,
    road_row: Option<i32>,
    hero_speed: f32,
    tree: Option<CellCoord>,
}

impl Config {
    /// Creates a rectangular layout of `columns` by `rows` grass blocks.
    #[must_use]
    pub const fn new(columns: i32, rows: i32) -> Self {
        Self {
            columns,
            rows,
            road_row: None,
            hero_speed: 20.0,
            tree: None,
        }
    }

    /// Paves every block in `row` as road.
    #[must_use]
    pub fn with_road_row(mut self, row: i32) -> Self {
        self.road_row = Some(row);
        self
    }

    /// Sets the speed the hero starts with.
    #[must_use]
    pub fn with_hero_speed(mut self, speed: f32) -> Self {
        self.hero_speed = speed;
        self
    }

    /// Plants a tree at `cell`.
    #[must_use]
    pub fn with_tree(mut self, cell: CellCoord) -> Self {
        self.tree = Some(cell);
        self
    }

    /// Number of block columns.
    #[must_use]
    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// Number of block rows.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Reports whether the layout places a block at `cell`.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() >= 0 && cell.x() < self.columns && cell.y() >= 0 && cell.y() < self.rows
    }

    /// Terrain laid at `cell`.
    #[must_use]
    pub fn kind_at(&self, cell: CellCoord) -> BlockKind {
        match self.road_row {
            Some(row) if row == cell.y() => BlockKind::Road,
            _ => BlockKind::Grass,
        }
    }
}

impl Default for Config {
    /// Four by four town with a road along the last row and a tree next to the hero.
    fn default() -> Self {
        Self::new(4, 4)
            .with_road_row(3)
            .with_tree(CellCoord::new(0, 1))
    }
}

/// Entities created while seeding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seeded {
    /// Player-controlled entity, placed at the origin cell.
    pub hero: EntityId,
    /// Scenery planted by the layout, if any.
    pub tree: Option<EntityId>,
}

/// Seeds worlds according to a [`Config`].
#[derive(Debug, Default)]
pub struct Bootstrap {
    config: Config,
}

impl Bootstrap {
    /// Creates a bootstrap system for the provided layout.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Layout used when seeding.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Lays out every block, then spawns the hero and the optional tree.
    ///
    /// Blocks are created and placed column by column before any entity
    /// exists. The hero starts at the origin cell with a movement capability.
    /// The layout is checked against the world first; when seeding fails the
    /// world is left as it was.
    pub fn seed(
        &self,
        world: &mut World,
        out_events: &mut Vec<Event>,
    ) -> Result<Seeded, TownError> {
        self.verify(world)?;

        for x in 0..self.config.columns {
            for y in 0..self.config.rows {
                let cell = CellCoord::new(x, y);
                let block = world.create_block(self.config.kind_at(cell), out_events);
                world.place_block(cell, block, out_events)?;
            }
        }

        let hero = world.create_entity(EntityKind::Hero, CellCoord::new(0, 0), out_events)?;
        world::apply(
            world,
            Command::AttachMovement {
                entity: hero,
                speed: self.config.hero_speed,
            },
            out_events,
        )?;

        let tree = match self.config.tree {
            Some(cell) => Some(world.create_entity(EntityKind::Tree, cell, out_events)?),
            None => None,
        };

        info!(
            "seeded {}x{} town with hero {hero}",
            self.config.columns, self.config.rows
        );
        Ok(Seeded { hero, tree })
    }

    fn verify(&self, world: &World) -> Result<(), TownError> {
        for x in 0..self.config.columns {
            for y in 0..self.config.rows {
                let cell = CellCoord::new(x, y);
                match query::block_at(world, cell) {
                    Ok(existing) => {
                        return Err(TownError::CellAlreadyBound {
                            cell,
                            existing: existing.id(),
                        })
                    }
                    Err(TownError::NotFound(_)) => {}
                    Err(other) => return Err(other),
                }
            }
        }

        let origin = CellCoord::new(0, 0);
        let cells = std::iter::once(origin).chain(self.config.tree);
        for cell in cells {
            if !self.config.contains(cell) {
                let _ = query::block_at(world, cell)?;
            }
        }

        if !query::movement_config(world).admits_speed(self.config.hero_speed) {
            return Err(TownError::InvalidSpeed {
                speed: self.config.hero_speed,
            });
        }
        Ok(())
    }
}
