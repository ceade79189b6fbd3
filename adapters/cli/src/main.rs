#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Merge Grid over stdin and stdout.

mod input;
mod render;
mod store;

use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use merge_grid_core::Event;
use merge_grid_system_bootstrap::{GameConfig, Session, ValidatedConfig};
use merge_grid_system_merging::Phase;
use merge_grid_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{input::Input, store::JsonFileStore};

/// Command-line arguments accepted by the Merge Grid binary.
#[derive(Debug, Parser)]
#[command(name = "merge-grid", version, about = "Merge same-level elements on a grid")]
struct Args {
    /// TOML file with game settings. Missing keys use their defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Number of columns, overriding the config file.
    #[arg(long)]
    width: Option<u32>,
    /// Number of rows, overriding the config file.
    #[arg(long)]
    height: Option<u32>,
    /// Seed for spawn placement, overriding the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// Start with timed spawning disabled.
    #[arg(long)]
    no_auto_spawn: bool,
    /// Where to keep the score record.
    #[arg(long, value_name = "FILE")]
    score_file: Option<PathBuf>,
}

impl Args {
    fn game_config(&self) -> Result<ValidatedConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                GameConfig::from_toml_str(&contents)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.grid.width = width;
        }
        if let Some(height) = self.height {
            config.grid.height = height;
        }
        if let Some(seed) = self.seed {
            config.rng_seed = seed;
        }
        if self.no_auto_spawn {
            config.spawn.auto_spawn = false;
        }

        config.validate().context("unusable game configuration")
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.game_config()?;
    let store = JsonFileStore::new(args.score_file.clone().unwrap_or_else(store::default_path));
    info!(path = %store.path().display(), "using score file");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut events = Vec::new();
    let mut session = Session::initialize(config, store, &mut events);
    report(&mut out, &session, &mut events)?;
    writeln!(out, "{}", input::HELP)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Input>() {
            Ok(command) => command,
            Err(error) => {
                writeln!(out, "error: {error:#}")?;
                continue;
            }
        };

        match command {
            Input::Pick(cell) => session.element_picked(Some(cell), &mut events),
            Input::Miss => session.element_picked(None, &mut events),
            Input::Tick(dt) => session.tick(dt, &mut events),
            Input::Spawn(level) => {
                let level = level.unwrap_or_else(|| session.config().spawn_level());
                if session.try_spawn(level, &mut events).is_none() {
                    writeln!(out, "board is full")?;
                }
            }
            Input::Auto(enabled) => {
                session.set_auto_spawn(enabled);
                writeln!(out, "timed spawning {}", if enabled { "on" } else { "off" })?;
            }
            Input::Board => {}
            Input::Restart => session.restart(&mut events),
            Input::Help => {
                writeln!(out, "{}", input::HELP)?;
                continue;
            }
            Input::Quit => break,
        }
        report(&mut out, &session, &mut events)?;
    }

    let score = session.score();
    let store = session.shutdown();
    writeln!(
        out,
        "final score {score}, score saved to {}",
        store.path().display()
    )?;
    Ok(())
}

/// Prints and drains pending events, then the board and score line.
fn report(
    out: &mut impl Write,
    session: &Session<JsonFileStore>,
    events: &mut Vec<Event>,
) -> io::Result<()> {
    for event in events.drain(..) {
        if let Some(line) = render::event(&event) {
            writeln!(out, "> {line}")?;
        }
    }

    let world = session.world();
    writeln!(
        out,
        "{}",
        render::board(&session.board(), query::selection(world))
    )?;
    let phase = match session.merge_phase() {
        Phase::Idle => "idle",
        Phase::Selected(_) => "selected",
        Phase::Merging { .. } => "merging",
    };
    writeln!(
        out,
        "score {} | high score {} | free cells {} | {phase}",
        session.score(),
        session.high_score(),
        query::empty_cells(world).len()
    )?;
    out.flush()
}
