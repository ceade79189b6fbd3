#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Composition root that wires the world and the gameplay systems together.
//!
//! A [`Session`] owns every piece of game state. Adapters feed it player
//! input and elapsed time; it routes commands through [`world::apply`] and
//! hands the resulting events to the merging, spawning and scoring systems
//! until no system has anything left to say.

pub mod config;

use std::time::Duration;

use merge_grid_core::{BoardView, Command, ElementSnapshot, Event, GridCoord, Level};
use merge_grid_system_merging::{self as merging, Merging, Phase, Pick};
use merge_grid_system_scoring::{ScoreStore, Scoring};
use merge_grid_system_spawning::{self as spawning, Spawning};
use merge_grid_world::{self as world, query, World};
use tracing::{debug, info};

pub use config::{ConfigError, GameConfig, ValidatedConfig};

/// One running game: board, element pool, systems and score.
#[derive(Debug)]
pub struct Session<S> {
    config: ValidatedConfig,
    world: World,
    spawning: Spawning,
    merging: Merging,
    scoring: Scoring<S>,
}

impl<S: ScoreStore> Session<S> {
    /// Builds the world, then the spawning, merging and scoring systems.
    ///
    /// The board is configured and, when enabled, seeded with the initial
    /// elements. Every event produced along the way is appended to `out`.
    pub fn initialize(config: ValidatedConfig, store: S, out: &mut Vec<Event>) -> Self {
        let world = World::with_pool_warm_up(config.pool_warm_up());
        let spawning = Spawning::new(
            spawning::Config::new(
                config.spawn_interval(),
                config.spawn_level(),
                config.rng_seed(),
            )
            .with_auto_spawn(config.auto_spawn()),
        );
        let merging = Merging::new(merging::Config::new(
            config.merge_delay(),
            config.max_level(),
        ));
        let scoring = Scoring::new(store);

        let mut session = Self {
            config,
            world,
            spawning,
            merging,
            scoring,
        };
        session.pump(
            vec![
                Command::ConfigureMaxLevel {
                    max_level: config.max_level(),
                },
                Command::ConfigureGrid {
                    width: config.width(),
                    height: config.height(),
                },
            ],
            out,
        );
        session.seed_board(out);

        info!(
            width = config.width(),
            height = config.height(),
            high_score = session.scoring.high_score(),
            "session initialized"
        );
        session
    }

    /// Routes a click to the merge engine. `None` means the click hit no cell.
    pub fn element_picked(&mut self, cell: Option<GridCoord>, out: &mut Vec<Event>) {
        let pick = Pick::from(cell.and_then(|cell| query::element_at(&self.world, cell)));
        let mut commands = Vec::new();
        self.merging.handle(&[], &[pick], &mut commands);
        self.pump(commands, out);
    }

    /// Spawns an element of `level` on a random free cell.
    ///
    /// Returns the placed element, or `None` when the board is full.
    pub fn try_spawn(&mut self, level: Level, out: &mut Vec<Event>) -> Option<ElementSnapshot> {
        let empty_cells = query::empty_cells(&self.world);
        let mut commands = Vec::new();
        let cell = self.spawning.try_spawn(level, &empty_cells, &mut commands)?;
        self.pump(commands, out);
        query::element_at(&self.world, cell)
    }

    /// Enables or disables timed spawning.
    pub fn set_auto_spawn(&mut self, enabled: bool) {
        self.spawning.set_auto_spawn(enabled);
    }

    /// Advances the session clock by `dt`.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        self.pump(vec![Command::Tick { dt }], out);
    }

    /// Clears the board and starts a new round.
    ///
    /// The running score and the spawn timer restart from zero; the high
    /// score is kept.
    pub fn restart(&mut self, out: &mut Vec<Event>) {
        self.scoring.reset();
        self.spawning.reset_timer();
        self.pump(
            vec![Command::ConfigureGrid {
                width: self.config.width(),
                height: self.config.height(),
            }],
            out,
        );
        self.seed_board(out);
        debug!("round restarted");
    }

    /// Saves the score record, releases pooled elements and returns the store.
    pub fn shutdown(mut self) -> S {
        self.scoring.persist();
        self.world.release_pool();
        info!(
            score = self.scoring.score(),
            high_score = self.scoring.high_score(),
            "session shut down"
        );
        self.scoring.into_store()
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the session was started with.
    #[must_use]
    pub const fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Snapshot of every placed element.
    #[must_use]
    pub fn board(&self) -> BoardView {
        query::board_view(&self.world)
    }

    /// State of the merge engine.
    #[must_use]
    pub const fn merge_phase(&self) -> Phase {
        self.merging.phase()
    }

    /// Reports whether timed spawning is enabled.
    #[must_use]
    pub const fn auto_spawn_enabled(&self) -> bool {
        self.spawning.auto_spawn_enabled()
    }

    /// Running score of the current round.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.scoring.score()
    }

    /// Best score observed so far.
    #[must_use]
    pub const fn high_score(&self) -> u64 {
        self.scoring.high_score()
    }

    fn seed_board(&mut self, out: &mut Vec<Event>) {
        if !self.config.spawn_on_start() {
            return;
        }
        let empty_cells = query::empty_cells(&self.world);
        let mut commands = Vec::new();
        let _ = self.spawning.initial_spawns(
            self.config.initial_spawn_count(),
            self.config.spawn_level(),
            &empty_cells,
            &mut commands,
        );
        self.pump(commands, out);
    }

    /// Applies commands and feeds the resulting events to every system until
    /// no further commands are produced.
    fn pump(&mut self, mut commands: Vec<Command>, out: &mut Vec<Event>) {
        while !commands.is_empty() {
            let mut events = Vec::new();
            for command in std::mem::take(&mut commands) {
                world::apply(&mut self.world, command, &mut events);
            }

            let empty_cells = query::empty_cells(&self.world);
            self.merging.handle(&events, &[], &mut commands);
            self.spawning.handle(&events, &empty_cells, &mut commands);

            let mut raised = Vec::new();
            self.scoring.handle(&events, &mut raised);
            out.extend(events);
            out.extend(raised);
        }
    }
}
