use std::{collections::HashSet, time::Duration};

use merge_grid_core::{Command, Event, GridCoord, Level};
use merge_grid_system_spawning::{Config, Spawning};
use merge_grid_world::{self as world, query, World};

fn configured_world(width: u32, height: u32) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid { width, height },
        &mut events,
    );
    world
}

fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn tick(dt: Duration) -> Event {
    Event::TimeAdvanced { dt }
}

#[test]
fn manual_spawn_fills_exactly_one_empty_cell() {
    let mut world = configured_world(5, 5);
    let mut spawning = Spawning::new(Config::new(Duration::from_secs(3), Level::MIN, 11));
    let before = query::empty_cells(&world);

    let mut commands = Vec::new();
    let cell = spawning
        .try_spawn(Level::new(1), &before, &mut commands)
        .expect("empty board accepts a spawn");
    assert!(before.contains(&cell), "spawn must target a free cell");

    let events = apply_all(&mut world, commands);

    assert_eq!(query::empty_cells(&world).len(), before.len() - 1);
    let placed = query::element_at(&world, cell).expect("element placed on chosen cell");
    assert_eq!(placed.level, Level::new(1));
    assert_eq!(placed.cell, cell);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ElementSpawned { element } if element.cell == cell)));
}

#[test]
fn full_board_spawns_nothing() {
    let mut world = configured_world(3, 3);
    for y in 0..3 {
        for x in 0..3 {
            let _ = apply_all(
                &mut world,
                vec![Command::SpawnElement {
                    cell: GridCoord::new(x, y),
                    level: Level::MIN,
                }],
            );
        }
    }
    let empty = query::empty_cells(&world);
    assert!(empty.is_empty());

    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), Level::MIN, 3));
    let mut commands = Vec::new();
    assert_eq!(spawning.try_spawn(Level::MIN, &empty, &mut commands), None);
    spawning.handle(&[tick(Duration::from_secs(1))], &empty, &mut commands);

    assert!(commands.is_empty());
    let events = apply_all(&mut world, commands);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ElementSpawned { .. })));
}

#[test]
fn large_dt_does_not_catch_up_missed_spawns() {
    let world = configured_world(5, 5);
    let empty = query::empty_cells(&world);
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), Level::MIN, 5));

    let mut commands = Vec::new();
    spawning.handle(&[tick(Duration::from_secs(2))], &empty, &mut commands);
    assert_eq!(commands.len(), 1, "missed intervals are not replayed");

    commands.clear();
    spawning.handle(&[tick(Duration::from_millis(499))], &empty, &mut commands);
    assert!(commands.is_empty(), "timer restarts after a spawn");
}

#[test]
fn time_accumulates_across_ticks() {
    let world = configured_world(5, 5);
    let empty = query::empty_cells(&world);
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), Level::new(2), 5));

    let mut commands = Vec::new();
    spawning.handle(&[tick(Duration::from_millis(300))], &empty, &mut commands);
    assert!(commands.is_empty(), "no spawn before a full interval");

    spawning.handle(&[tick(Duration::from_millis(300))], &empty, &mut commands);
    assert_eq!(commands.len(), 1);
    match &commands[0] {
        Command::SpawnElement { level, .. } => assert_eq!(*level, Level::new(2)),
        other => panic!("unexpected command emitted: {other:?}"),
    }
}

#[test]
fn disabled_auto_spawn_keeps_manual_spawns() {
    let world = configured_world(4, 4);
    let empty = query::empty_cells(&world);
    let config = Config::new(Duration::from_millis(500), Level::MIN, 9).with_auto_spawn(false);
    let mut spawning = Spawning::new(config);

    let mut commands = Vec::new();
    spawning.handle(&[tick(Duration::from_secs(5))], &empty, &mut commands);
    assert!(commands.is_empty(), "disabled timer must not spawn");

    assert!(spawning.try_spawn(Level::MIN, &empty, &mut commands).is_some());
    assert_eq!(commands.len(), 1);

    commands.clear();
    spawning.set_auto_spawn(true);
    spawning.handle(&[tick(Duration::from_millis(250))], &empty, &mut commands);
    assert!(commands.is_empty(), "re-enabled timer starts from zero");
    spawning.handle(&[tick(Duration::from_millis(250))], &empty, &mut commands);
    assert_eq!(commands.len(), 1);
}

#[test]
fn initial_spawns_use_distinct_cells_and_stop_when_full() {
    let mut world = configured_world(3, 3);
    let empty = query::empty_cells(&world);
    let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), Level::MIN, 21));

    let mut commands = Vec::new();
    let emitted = spawning.initial_spawns(20, Level::new(2), &empty, &mut commands);
    assert_eq!(emitted, 9);

    let cells: HashSet<GridCoord> = commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnElement { cell, .. } => Some(*cell),
            _ => None,
        })
        .collect();
    assert_eq!(cells.len(), 9, "every initial spawn targets its own cell");

    let events = apply_all(&mut world, commands);
    assert!(query::empty_cells(&world).is_empty());
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SpawnRejected { .. })));
}

#[test]
fn explicit_placement_round_trips_through_queries() {
    let mut world = configured_world(5, 5);
    let cell = GridCoord::new(3, 1);
    let _ = apply_all(
        &mut world,
        vec![Command::SpawnElement {
            cell,
            level: Level::new(4),
        }],
    );

    let placed = query::element_at(&world, cell).expect("element created at cell");
    assert_eq!(placed.level, Level::new(4));
    assert_eq!(placed.cell, cell);
}

#[test]
fn identical_seeds_replay_identical_spawns() {
    assert_eq!(replay(0x4d59_5df4_d0f3_3173), replay(0x4d59_5df4_d0f3_3173));
}

fn replay(seed: u64) -> Vec<GridCoord> {
    let mut world = configured_world(6, 6);
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(750), Level::MIN, seed));
    let mut spawned = Vec::new();

    for _ in 0..12 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(750),
            },
            &mut events,
        );
        let mut commands = Vec::new();
        spawning.handle(&events, &query::empty_cells(&world), &mut commands);
        for event in apply_all(&mut world, commands) {
            if let Event::ElementSpawned { element } = event {
                spawned.push(element.cell);
            }
        }
    }

    assert_eq!(spawned.len(), 12);
    spawned
}
