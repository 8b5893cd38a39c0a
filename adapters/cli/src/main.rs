#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that seeds a town and walks the hero through it.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use town_core::{RandomIds, SequentialIds};
use town_system_bootstrap::{Bootstrap, Config};
use town_system_movement::{MovementConfig, MAX_MOVEMENT_SPEED};
use town_world::World;

mod session;

use session::{Flow, Session};

/// Walk a hero around a small town of blocks.
#[derive(Debug, Parser)]
#[command(name = "town", version)]
struct Args {
    /// Number of block columns in the town.
    #[arg(long, default_value_t = 4)]
    columns: i32,
    /// Number of block rows in the town; the last row is paved as road.
    #[arg(long, default_value_t = 4)]
    rows: i32,
    /// Speed the hero walks at.
    #[arg(long, default_value_t = 20.0)]
    hero_speed: f32,
    /// Speed that crosses one full block per step.
    #[arg(long, default_value_t = MAX_MOVEMENT_SPEED)]
    max_speed: f32,
    /// Draw reproducible identifiers instead of random ones.
    #[arg(long)]
    deterministic: bool,
}

impl Args {
    fn layout(&self) -> Config {
        let mut config = Config::new(self.columns, self.rows).with_hero_speed(self.hero_speed);
        if self.rows > 0 {
            config = config.with_road_row(self.rows - 1);
        }
        if self.rows > 1 {
            config = config.with_tree(town_core::CellCoord::new(0, 1));
        }
        config
    }
}

/// Entry point for the town command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let movement = MovementConfig::new(args.max_speed);
    let mut world = if args.deterministic {
        World::with_config(SequentialIds::default(), movement)
    } else {
        World::with_config(RandomIds, movement)
    };

    let mut events = Vec::new();
    let seeded = Bootstrap::new(args.layout())
        .seed(&mut world, &mut events)
        .context("failed to seed the town")?;

    let mut session = Session::new(world, seeded.hero);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut lines = stdin.lock().lines();

    loop {
        writeln!(stdout, "Type your input:")?;
        stdout.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read input")?;
        if session.handle(&line, &mut stdout)? == Flow::Quit {
            break;
        }
    }

    Ok(())
}
