use town_core::{BlockKind, CellCoord, Command, EntityKind, Event, OffsetCoord, SequentialIds};
use town_world::{self as world, query, World};

#[test]
fn replay_with_sequential_ids_is_reproducible() {
    let first = replay();
    let second = replay();

    assert_eq!(first.events, second.events, "event log diverged between runs");
    assert_eq!(first.blocks, second.blocks);
}

#[test]
fn replay_relocates_hero_along_the_diagonal() {
    let outcome = replay();

    let relocations = outcome
        .events
        .iter()
        .filter(|event| matches!(event, Event::EntityRelocated { .. }))
        .count();
    assert!(relocations >= 2, "expected several block changes, got {relocations}");

    let hero_cells: Vec<CellCoord> = outcome
        .blocks
        .iter()
        .filter(|(_, kinds)| kinds.contains(&EntityKind::Hero))
        .map(|(cell, _)| *cell)
        .collect();
    assert_eq!(hero_cells.len(), 1);
    assert!(hero_cells[0].x() > 0 && hero_cells[0].y() > 0);
}

struct ReplayOutcome {
    events: Vec<Event>,
    blocks: Vec<(CellCoord, Vec<EntityKind>)>,
}

fn replay() -> ReplayOutcome {
    let mut world = World::with_ids(SequentialIds::default());
    let mut events = Vec::new();

    for x in 0..4 {
        for y in 0..4 {
            let kind = if y == 3 {
                BlockKind::Road
            } else {
                BlockKind::Grass
            };
            let block = world.create_block(kind, &mut events);
            world
                .place_block(CellCoord::new(x, y), block, &mut events)
                .expect("fresh cell");
        }
    }

    let hero = world
        .create_entity(EntityKind::Hero, CellCoord::new(0, 0), &mut events)
        .expect("hero");
    let _ = world
        .create_entity(EntityKind::Tree, CellCoord::new(0, 1), &mut events)
        .expect("tree");

    let script = [
        Command::AttachMovement {
            entity: hero,
            speed: 40.0,
        },
        Command::SetVelocity {
            entity: hero,
            velocity: OffsetCoord::new(1.0, 1.0).normalized(),
        },
    ];
    for command in script {
        world::apply(&mut world, command, &mut events).expect("scripted command");
    }
    for _ in 0..12 {
        world::apply(&mut world, Command::Advance { entity: hero }, &mut events)
            .expect("advance inside town");
    }
    query::check_membership(&world).expect("consistent after replay");

    let blocks = query::cells(&world)
        .into_iter()
        .map(|cell| {
            let kinds = query::entities_at(&world, cell)
                .expect("bound cell")
                .into_iter()
                .map(|snapshot| snapshot.kind)
                .collect();
            (cell, kinds)
        })
        .collect();

    ReplayOutcome { events, blocks }
}
