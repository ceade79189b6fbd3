//! Line-oriented player commands read from stdin.

use std::{str::FromStr, time::Duration};

use anyhow::{bail, Context, Result};
use merge_grid_core::{GridCoord, Level};

/// One parsed line of player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// Click on a cell.
    Pick(GridCoord),
    /// Click beside the board.
    Miss,
    /// Let time pass.
    Tick(Duration),
    /// Spawn on a random free cell, optionally overriding the level.
    Spawn(Option<Level>),
    /// Toggle the spawn timer.
    Auto(bool),
    /// Print the board.
    Board,
    /// Start a new round.
    Restart,
    /// Print the command summary.
    Help,
    /// Leave the game.
    Quit,
}

pub(crate) const HELP: &str = "\
commands:
  pick X Y     select or merge the element at column X, row Y
  miss         click outside the board
  tick MS      advance time by MS milliseconds
  spawn [L]    spawn an element (level L, default from config)
  auto on|off  toggle timed spawning
  board        print the board
  restart      clear the board and start a new round
  help         show this text
  quit         save and exit";

impl FromStr for Input {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };
        let input = match verb {
            "pick" | "p" => {
                let x = number(words.next(), "column")?;
                let y = number(words.next(), "row")?;
                Self::Pick(GridCoord::new(x, y))
            }
            "miss" => Self::Miss,
            "tick" | "t" => Self::Tick(Duration::from_millis(number(words.next(), "milliseconds")?)),
            "spawn" | "s" => Self::Spawn(
                words
                    .next()
                    .map(|word| number(Some(word), "level").map(Level::new))
                    .transpose()?,
            ),
            "auto" => match words.next() {
                Some("on") => Self::Auto(true),
                Some("off") => Self::Auto(false),
                other => bail!("expected `auto on` or `auto off`, got {other:?}"),
            },
            "board" | "b" => Self::Board,
            "restart" => Self::Restart,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => bail!("unknown command `{other}`, try `help`"),
        };
        if let Some(extra) = words.next() {
            bail!("unexpected argument `{extra}`");
        }
        Ok(input)
    }
}

fn number<T>(word: Option<&str>, what: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let word = word.with_context(|| format!("missing {what}"))?;
    word.parse()
        .with_context(|| format!("`{word}` is not a valid {what}"))
}
