use merge_grid_core::{Command, ElementSnapshot, Event, GridCoord, Level};
use merge_grid_world::{self as world, query, World};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const WIDTH: u32 = 4;
const HEIGHT: u32 = 4;

fn assert_board_consistent(world: &World) {
    let board = query::board_view(world);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let cell = GridCoord::new(x, y);
            let placed = query::element_at(world, cell);
            assert_eq!(
                query::is_occupied(world, cell),
                placed.is_some(),
                "occupancy and element map disagree at {cell:?}"
            );
            if let Some(element) = placed {
                assert_eq!(element.cell, cell);
                assert_eq!(query::element(world, element.id), Some(element));
                assert!(!query::is_pooled(world, element.id));
            }
        }
    }

    let stats = query::pool_stats(world);
    assert_eq!(stats.active, board.len(), "every active element is placed");
    assert_eq!(
        stats.active + query::pool_free_count(world),
        stats.total,
        "every instance is either placed or pooled"
    );
    assert_eq!(
        query::empty_cells(world).len() + board.len(),
        (WIDTH * HEIGHT) as usize
    );
}

fn random_command(world: &World, rng: &mut ChaCha8Rng) -> Command {
    let placed: Vec<ElementSnapshot> = query::board_view(world).into_vec();
    if placed.len() < 2 || rng.gen_bool(0.55) {
        return Command::SpawnElement {
            cell: GridCoord::new(rng.gen_range(0..=WIDTH), rng.gen_range(0..=HEIGHT)),
            level: Level::new(rng.gen_range(1..=3)),
        };
    }

    let mut pair = placed.choose_multiple(rng, 2);
    let (Some(anchor), Some(consumed)) = (pair.next(), pair.next()) else {
        unreachable!("board holds at least two elements");
    };
    Command::MergeElements {
        anchor: anchor.id,
        consumed: consumed.id,
    }
}

#[test]
fn random_play_preserves_board_and_pool_invariants() {
    let mut world = World::with_pool_warm_up(4);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            width: WIDTH,
            height: HEIGHT,
        },
        &mut events,
    );

    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut merges = 0;
    for _ in 0..2_000 {
        let command = random_command(&world, &mut rng);
        events.clear();
        world::apply(&mut world, command, &mut events);
        merges += events
            .iter()
            .filter(|event| matches!(event, Event::ElementsMerged { .. }))
            .count();
        assert_board_consistent(&world);
    }

    assert!(merges > 0, "the sequence should exercise merges");
}

#[test]
fn removing_twice_frees_once() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            width: 3,
            height: 3,
        },
        &mut events,
    );
    for cell in [GridCoord::new(0, 0), GridCoord::new(2, 2)] {
        world::apply(
            &mut world,
            Command::SpawnElement {
                cell,
                level: Level::MIN,
            },
            &mut events,
        );
    }
    let first = query::element_at(&world, GridCoord::new(0, 0)).expect("first placed");
    let second = query::element_at(&world, GridCoord::new(2, 2)).expect("second placed");

    for _ in 0..2 {
        world::apply(
            &mut world,
            Command::MergeElements {
                anchor: first.id,
                consumed: second.id,
            },
            &mut events,
        );
    }

    let merged = events
        .iter()
        .filter(|event| matches!(event, Event::ElementsMerged { .. }))
        .count();
    let rejected = events
        .iter()
        .filter(|event| matches!(event, Event::MergeRejected { .. }))
        .count();
    assert_eq!((merged, rejected), (1, 1));
    assert_board_consistent_small(&world);
}

fn assert_board_consistent_small(world: &World) {
    let stats = query::pool_stats(world);
    assert_eq!(stats.active, query::board_view(world).len());
    assert_eq!(stats.active + query::pool_free_count(world), stats.total);
}
