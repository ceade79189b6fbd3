//! Game configuration loaded from TOML and clamped into playable ranges.

use std::{ops::RangeInclusive, time::Duration};

use merge_grid_core::Level;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const GRID_SIDE: RangeInclusive<u32> = 3..=10;
const CELL_SIZE: RangeInclusive<f32> = 0.5..=2.0;
const CELL_SPACING: RangeInclusive<f32> = 0.0..=0.5;
const SPAWN_INTERVAL_SECS: RangeInclusive<f32> = 0.5..=10.0;
const MAX_LEVEL: RangeInclusive<u32> = 5..=20;
const INITIAL_LEVEL: RangeInclusive<u32> = 1..=3;
const INITIAL_COUNT: RangeInclusive<u32> = 0..=10;

/// Errors that make a configuration unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse game configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A grid side was zero, leaving no cells to play on.
    #[error("grid must have at least one cell, got {width}x{height}")]
    EmptyGrid {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
}

/// Board layout settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Edge length of a rendered cell. Presentation only.
    pub cell_size: f32,
    /// Gap between rendered cells. Presentation only.
    pub cell_spacing: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            cell_size: 1.0,
            cell_spacing: 0.1,
        }
    }
}

/// Element spawning settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Seconds between automatic spawns.
    pub interval_secs: f32,
    /// Highest level an element may reach.
    pub max_level: u32,
    /// Level of spawned elements.
    pub initial_level: u32,
    /// Number of elements placed when a round starts.
    pub initial_count: u32,
    /// Whether to place the initial elements at all.
    pub spawn_on_start: bool,
    /// Whether the interval timer starts enabled.
    pub auto_spawn: bool,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            interval_secs: 3.0,
            max_level: 10,
            initial_level: 1,
            initial_count: 3,
            spawn_on_start: true,
            auto_spawn: true,
        }
    }
}

/// Merge timing settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Milliseconds between deciding a merge and applying it.
    pub delay_ms: u64,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self { delay_ms: 300 }
    }
}

/// Complete, unvalidated game configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board layout.
    pub grid: GridSettings,
    /// Spawning behaviour.
    pub spawn: SpawnSettings,
    /// Merge timing.
    pub merge: MergeSettings,
    /// Number of inactive elements created up front.
    pub pool_warm_up: usize,
    /// Seed for cell selection.
    pub rng_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings::default(),
            spawn: SpawnSettings::default(),
            merge: MergeSettings::default(),
            pool_warm_up: 20,
            rng_seed: 0x6d65_7267_6567_7264,
        }
    }
}

impl GameConfig {
    /// Parses a configuration document. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Checks the configuration and clamps values into their playable ranges.
    ///
    /// A zero grid side is fatal. Every other out-of-range value is clamped
    /// and reported with a warning.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let GridSettings {
            width,
            height,
            cell_size,
            cell_spacing,
        } = self.grid;
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }

        let grid = GridSettings {
            width: clamp_u32("grid.width", width, GRID_SIDE),
            height: clamp_u32("grid.height", height, GRID_SIDE),
            cell_size: clamp_f32("grid.cell_size", cell_size, CELL_SIZE),
            cell_spacing: clamp_f32("grid.cell_spacing", cell_spacing, CELL_SPACING),
        };
        let spawn = SpawnSettings {
            interval_secs: clamp_f32(
                "spawn.interval_secs",
                self.spawn.interval_secs,
                SPAWN_INTERVAL_SECS,
            ),
            max_level: clamp_u32("spawn.max_level", self.spawn.max_level, MAX_LEVEL),
            initial_level: clamp_u32(
                "spawn.initial_level",
                self.spawn.initial_level,
                INITIAL_LEVEL,
            ),
            initial_count: clamp_u32(
                "spawn.initial_count",
                self.spawn.initial_count,
                INITIAL_COUNT,
            ),
            ..self.spawn
        };

        Ok(ValidatedConfig {
            grid,
            spawn,
            merge: self.merge,
            pool_warm_up: self.pool_warm_up,
            rng_seed: self.rng_seed,
        })
    }
}

fn clamp_u32(key: &'static str, value: u32, range: RangeInclusive<u32>) -> u32 {
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        warn!(key, value, clamped, "configuration value out of range");
    }
    clamped
}

fn clamp_f32(key: &'static str, value: f32, range: RangeInclusive<f32>) -> f32 {
    let clamped = if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    };
    if clamped.to_bits() != value.to_bits() {
        warn!(key, value, clamped, "configuration value out of range");
    }
    clamped
}

/// Configuration whose values are known to be within their playable ranges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidatedConfig {
    grid: GridSettings,
    spawn: SpawnSettings,
    merge: MergeSettings,
    pool_warm_up: usize,
    rng_seed: u64,
}

impl ValidatedConfig {
    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.grid.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.grid.height
    }

    /// Rendered cell edge length.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.grid.cell_size
    }

    /// Rendered gap between cells.
    #[must_use]
    pub const fn cell_spacing(&self) -> f32 {
        self.grid.cell_spacing
    }

    /// Time between automatic spawns.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_secs_f32(self.spawn.interval_secs)
    }

    /// Highest level an element may reach.
    #[must_use]
    pub const fn max_level(&self) -> Level {
        Level::new(self.spawn.max_level)
    }

    /// Level of spawned elements.
    #[must_use]
    pub const fn spawn_level(&self) -> Level {
        Level::new(self.spawn.initial_level)
    }

    /// Number of elements placed when a round starts.
    #[must_use]
    pub const fn initial_spawn_count(&self) -> usize {
        self.spawn.initial_count as usize
    }

    /// Whether initial elements are placed when a round starts.
    #[must_use]
    pub const fn spawn_on_start(&self) -> bool {
        self.spawn.spawn_on_start
    }

    /// Whether the interval timer starts enabled.
    #[must_use]
    pub const fn auto_spawn(&self) -> bool {
        self.spawn.auto_spawn
    }

    /// Delay between deciding a merge and applying it.
    #[must_use]
    pub const fn merge_delay(&self) -> Duration {
        Duration::from_millis(self.merge.delay_ms)
    }

    /// Number of inactive elements created up front.
    #[must_use]
    pub const fn pool_warm_up(&self) -> usize {
        self.pool_warm_up
    }

    /// Seed for cell selection.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for ValidatedConfig {
    fn default() -> Self {
        let config = GameConfig::default();
        Self {
            grid: config.grid,
            spawn: config.spawn,
            merge: config.merge,
            pool_warm_up: config.pool_warm_up,
            rng_seed: config.rng_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = GameConfig::from_toml_str("").expect("empty document parses");
        assert_eq!(config, GameConfig::default());
        assert_eq!(
            config.validate().expect("defaults are valid"),
            ValidatedConfig::default()
        );
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            rng_seed = 42

            [grid]
            width = 7

            [merge]
            delay_ms = 0
            "#,
        )
        .expect("document parses");

        assert_eq!(config.grid.width, 7);
        assert_eq!(config.grid.height, 5);
        assert_eq!(config.spawn, SpawnSettings::default());
        assert_eq!(config.merge.delay_ms, 0);
        assert_eq!(config.rng_seed, 42);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut config = GameConfig::default();
        config.grid.width = 25;
        config.grid.height = 1;
        config.grid.cell_size = 4.0;
        config.grid.cell_spacing = f32::NAN;
        config.spawn.interval_secs = 0.1;
        config.spawn.max_level = 40;
        config.spawn.initial_level = 0;
        config.spawn.initial_count = 99;

        let validated = config.validate().expect("clamped config is valid");
        assert_eq!(validated.width(), 10);
        assert_eq!(validated.height(), 3);
        assert_eq!(validated.cell_size(), 2.0);
        assert_eq!(validated.cell_spacing(), 0.0);
        assert_eq!(validated.spawn_interval(), Duration::from_millis(500));
        assert_eq!(validated.max_level(), Level::new(20));
        assert_eq!(validated.spawn_level(), Level::new(1));
        assert_eq!(validated.initial_spawn_count(), 10);
    }

    #[test]
    fn zero_sized_grid_is_fatal() {
        let mut config = GameConfig::default();
        config.grid.height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyGrid {
                width: 5,
                height: 0,
            })
        ));
    }

    #[test]
    fn malformed_document_reports_parse_error() {
        let result = GameConfig::from_toml_str("[grid]\nwidth = \"wide\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
