use merge_grid_core::{Command, Event, GridCoord, Level};
use merge_grid_system_scoring::{MemoryStore, ScoreRecord, Scoring};
use merge_grid_world::{self as world, query, World};

fn configured_world() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            width: 6,
            height: 6,
        },
        &mut events,
    );
    world
}

fn place(world: &mut World, x: u32, y: u32, level: u32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnElement {
            cell: GridCoord::new(x, y),
            level: Level::new(level),
        },
        &mut events,
    );
    events
}

fn merge_pair(world: &mut World, a: (u32, u32), b: (u32, u32)) -> Vec<Event> {
    let anchor = query::element_at(world, GridCoord::new(a.0, a.1)).expect("anchor placed");
    let consumed = query::element_at(world, GridCoord::new(b.0, b.1)).expect("partner placed");
    let mut events = Vec::new();
    world::apply(
        world,
        Command::MergeElements {
            anchor: anchor.id,
            consumed: consumed.id,
        },
        &mut events,
    );
    events
}

#[test]
fn score_equals_sum_of_merge_points() {
    let mut world = configured_world();
    let mut scoring = Scoring::new(MemoryStore::default());
    let mut expected = 0;
    let mut raised = Vec::new();

    for (row, level) in [(0, 1), (1, 3), (2, 2), (3, 1)] {
        let _ = place(&mut world, 0, row, level);
        let _ = place(&mut world, 5, row, level);
        let events = merge_pair(&mut world, (0, row), (5, row));
        for event in &events {
            if let Event::ElementsMerged { outcome, .. } = event {
                expected += outcome.points();
            }
        }
        scoring.handle(&events, &mut raised);
    }

    assert_eq!(expected, 40 + 160 + 80 + 40);
    assert_eq!(scoring.score(), expected);
    assert_eq!(scoring.high_score(), expected);
}

#[test]
fn high_score_never_decreases_across_rounds() {
    let mut scoring = Scoring::new(MemoryStore::with_record(ScoreRecord {
        score: 0,
        high_score: 100,
    }));
    let mut out = Vec::new();
    let mut observed = vec![scoring.high_score()];

    scoring.handle(&[Event::ScoreChanged { delta: 40 }], &mut out);
    observed.push(scoring.high_score());
    assert!(out.is_empty(), "score below record raises nothing");

    scoring.handle(&[Event::ScoreChanged { delta: 80 }], &mut out);
    observed.push(scoring.high_score());
    assert_eq!(out, vec![Event::HighScoreRaised { high_score: 120 }]);

    scoring.reset();
    scoring.handle(&[Event::ScoreChanged { delta: 20 }], &mut out);
    observed.push(scoring.high_score());

    assert!(observed.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(scoring.high_score(), 120);
}

#[test]
fn new_record_is_saved_once_per_batch() {
    let mut scoring = Scoring::new(MemoryStore::default());
    let mut out = Vec::new();

    scoring.handle(
        &[
            Event::ScoreChanged { delta: 20 },
            Event::ScoreChanged { delta: 40 },
        ],
        &mut out,
    );

    assert_eq!(scoring.store().saves(), 1);
    assert_eq!(
        scoring.store().record(),
        Some(ScoreRecord {
            score: 60,
            high_score: 60,
        })
    );
    assert_eq!(out, vec![Event::HighScoreRaised { high_score: 60 }]);
}

#[test]
fn unrelated_events_do_not_score() {
    let mut scoring = Scoring::new(MemoryStore::default());
    let mut out = Vec::new();
    scoring.handle(
        &[Event::CellFreed {
            cell: GridCoord::new(0, 0),
        }],
        &mut out,
    );
    assert_eq!(scoring.score(), 0);
    assert!(out.is_empty());
    assert_eq!(scoring.store().saves(), 0);
}
