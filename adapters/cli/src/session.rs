//! Interactive loop state: parses player input and renders the town as text.

use std::io::Write;

use anyhow::{Context, Result};
use log::debug;
use town_core::{EntityId, TownError};
use town_system_movement::{Heading, Movement};
use town_world::{self as world, query, World};

/// Whether the input loop should keep reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Input {
    Walk(Heading),
    Info,
    Quit,
    Unknown,
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "" => Self::Quit,
            "walk" => Self::Walk(Heading::Diagonal),
            "left" => Self::Walk(Heading::Horizontal),
            "top" => Self::Walk(Heading::Vertical),
            "info" => Self::Info,
            _ => Self::Unknown,
        }
    }
}

/// Owns the world for the duration of one console session.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    hero: EntityId,
    movement: Movement,
}

impl Session {
    pub(crate) fn new(world: World, hero: EntityId) -> Self {
        Self {
            world,
            hero,
            movement: Movement,
        }
    }

    /// Executes one line of input, writing the response to `out`.
    ///
    /// Recoverable world errors are reported to the player; corruption of the
    /// world index is returned as an error.
    pub(crate) fn handle<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        match Input::parse(line) {
            Input::Quit => return Ok(Flow::Quit),
            Input::Walk(heading) => self.walk(heading, out)?,
            Input::Info => self.info(out)?,
            Input::Unknown => writeln!(out, "Try walk, left, top or info.")?,
        }
        Ok(Flow::Continue)
    }

    fn walk<W: Write>(&mut self, heading: Heading, out: &mut W) -> Result<()> {
        let mut commands = Vec::new();
        self.movement.steer(self.hero, heading, &mut commands);

        let mut events = Vec::new();
        for command in commands {
            if let Err(error) = world::apply(&mut self.world, command, &mut events) {
                return report(error, out);
            }
        }
        debug!("walk produced {} events", events.len());

        let message = match heading {
            Heading::Diagonal => "You walked left and top.",
            Heading::Horizontal => "You walked left.",
            Heading::Vertical => "You walked top.",
        };
        writeln!(out, "{message}")?;

        let hero = query::entity(&self.world, self.hero).or_else(fail)?;
        writeln!(out, "Town Coordinate is {}", hero.position.cell)?;
        writeln!(out, "Block Coordinate is {}", hero.position.offset)?;
        Ok(())
    }

    fn info<W: Write>(&self, out: &mut W) -> Result<()> {
        let hero = query::entity(&self.world, self.hero).or_else(fail)?;
        let cell = hero.position.cell;
        let block = query::block_at(&self.world, cell).or_else(fail)?;
        writeln!(out, "You are standing at the block: {}", block.kind())?;
        writeln!(out, "List of entities at the block:")?;
        for entity in query::entities_at(&self.world, cell).or_else(fail)? {
            writeln!(out, "Entity: {}", entity.kind)?;
        }
        Ok(())
    }
}

fn report<W: Write>(error: TownError, out: &mut W) -> Result<()> {
    if error.is_fatal() {
        return fail(error);
    }
    writeln!(out, "You cannot go there: {error}")?;
    Ok(())
}

fn fail<T>(error: TownError) -> Result<T> {
    Err(error).context("town state is inconsistent")
}

#[cfg(test)]
mod tests {
    use super::*;
    use town_core::{CellCoord, SequentialIds};
    use town_system_bootstrap::{Bootstrap, Config};

    fn session(config: Config) -> Session {
        let mut world = World::with_ids(SequentialIds::default());
        let mut events = Vec::new();
        let seeded = Bootstrap::new(config)
            .seed(&mut world, &mut events)
            .expect("seeding succeeds");
        Session::new(world, seeded.hero)
    }

    fn run(session: &mut Session, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = session.handle(line, &mut out).expect("recoverable");
        (flow, String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn parses_commands_case_insensitively() {
        assert_eq!(Input::parse("WALK"), Input::Walk(Heading::Diagonal));
        assert_eq!(Input::parse(" Left "), Input::Walk(Heading::Horizontal));
        assert_eq!(Input::parse("top"), Input::Walk(Heading::Vertical));
        assert_eq!(Input::parse("info"), Input::Info);
        assert_eq!(Input::parse(""), Input::Quit);
        assert_eq!(Input::parse("jump"), Input::Unknown);
    }

    #[test]
    fn walking_left_reports_new_coordinates() {
        let mut session = session(Config::default());

        let (flow, output) = run(&mut session, "left");

        assert_eq!(flow, Flow::Continue);
        assert!(output.contains("You walked left."));
        assert!(output.contains("Town Coordinate is [0, 0]"));
        assert!(output.contains("Block Coordinate is [0.2, 0]"));
    }

    #[test]
    fn info_lists_entities_sharing_the_block() {
        let mut session = session(Config::new(2, 2).with_tree(CellCoord::new(0, 0)));

        let (_, output) = run(&mut session, "info");

        assert!(output.contains("You are standing at the block: grass"));
        assert!(output.contains("Entity: hero"));
        assert!(output.contains("Entity: tree"));
    }

    #[test]
    fn walking_off_the_town_is_reported_not_fatal() {
        let mut session = session(Config::new(1, 1).with_hero_speed(100.0));

        let _ = run(&mut session, "top");
        let (flow, output) = run(&mut session, "top");

        assert_eq!(flow, Flow::Continue);
        assert!(output.contains("You cannot go there"));
    }

    #[test]
    fn empty_line_quits() {
        let mut session = session(Config::default());
        assert_eq!(run(&mut session, "").0, Flow::Quit);
    }
}
