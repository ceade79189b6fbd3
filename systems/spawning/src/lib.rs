#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded spawning system responsible for emitting element spawn commands.

use std::time::Duration;

use merge_grid_core::{Command, Event, GridCoord, Level};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    spawn_level: Level,
    auto_spawn: bool,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration with automatic spawning enabled.
    #[must_use]
    pub const fn new(spawn_interval: Duration, spawn_level: Level, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            spawn_level,
            auto_spawn: true,
            rng_seed,
        }
    }

    /// Overrides whether the interval timer spawns elements.
    #[must_use]
    pub const fn with_auto_spawn(mut self, enabled: bool) -> Self {
        self.auto_spawn = enabled;
        self
    }
}

/// System that places new elements on random free cells.
///
/// Automatic spawns follow a periodic timer driven by
/// [`Event::TimeAdvanced`]. The timer never catches up: however much time a
/// batch of events covers, at most one automatic spawn is emitted per call to
/// [`Spawning::handle`] and the accumulated time is discarded afterwards.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    spawn_level: Level,
    auto_spawn: bool,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            spawn_level: config.spawn_level,
            auto_spawn: config.auto_spawn,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Enables or disables the interval timer. Manual spawns stay available.
    pub fn set_auto_spawn(&mut self, enabled: bool) {
        if !enabled {
            self.accumulator = Duration::ZERO;
        }
        self.auto_spawn = enabled;
    }

    /// Discards time accumulated towards the next automatic spawn.
    pub fn reset_timer(&mut self) {
        self.accumulator = Duration::ZERO;
    }

    /// Reports whether the interval timer is active.
    #[must_use]
    pub const fn auto_spawn_enabled(&self) -> bool {
        self.auto_spawn
    }

    /// Level assigned to automatically spawned elements.
    #[must_use]
    pub const fn spawn_level(&self) -> Level {
        self.spawn_level
    }

    /// Consumes events and the current free cells to emit timed spawn commands.
    pub fn handle(&mut self, events: &[Event], empty_cells: &[GridCoord], out: &mut Vec<Command>) {
        if !self.auto_spawn {
            self.accumulator = Duration::ZERO;
            return;
        }

        if self.spawn_interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        if self.accumulator < self.spawn_interval {
            return;
        }

        self.accumulator = Duration::ZERO;
        let _ = self.try_spawn(self.spawn_level, empty_cells, out);
    }

    /// Requests a spawn of `level` on a uniformly chosen free cell.
    ///
    /// Returns the chosen cell, or `None` when the board is full. A full
    /// board is an expected outcome and emits nothing.
    pub fn try_spawn(
        &mut self,
        level: Level,
        empty_cells: &[GridCoord],
        out: &mut Vec<Command>,
    ) -> Option<GridCoord> {
        if empty_cells.is_empty() {
            debug!(level = level.get(), "board full, skipping spawn");
            return None;
        }

        let index = self.rng.gen_range(0..empty_cells.len());
        let cell = empty_cells[index];
        out.push(Command::SpawnElement { cell, level });
        Some(cell)
    }

    /// Requests up to `count` spawns on distinct free cells.
    ///
    /// Stops early when the free cells run out and returns how many spawn
    /// commands were emitted.
    pub fn initial_spawns(
        &mut self,
        count: usize,
        level: Level,
        empty_cells: &[GridCoord],
        out: &mut Vec<Command>,
    ) -> usize {
        let mut remaining = empty_cells.to_vec();
        let mut emitted = 0;
        while emitted < count {
            let Some(cell) = self.try_spawn(level, &remaining, out) else {
                break;
            };
            remaining.retain(|candidate| *candidate != cell);
            emitted += 1;
        }
        emitted
    }
}
