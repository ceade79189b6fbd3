//! Score record persisted as JSON under the user's config directory.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use merge_grid_system_scoring::{ScoreRecord, ScoreStore, StoreError};

const APP_DIR: &str = "merge-grid";
const FILENAME: &str = "score.json";

/// Default location: `$XDG_CONFIG_HOME/merge-grid/score.json`, falling back
/// to `~/.config` and finally the working directory.
pub(crate) fn default_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(APP_DIR).join(FILENAME)
}

/// [`ScoreStore`] backed by a single JSON file.
#[derive(Debug)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&mut self) -> Result<ScoreRecord, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(ScoreRecord::default())
            }
            Err(error) => return Err(error.into()),
        };
        serde_json::from_str(&contents).map_err(|error| StoreError::Malformed(error.to_string()))
    }

    fn save(&mut self, record: &ScoreRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(record)
            .map_err(|error| StoreError::Malformed(error.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
