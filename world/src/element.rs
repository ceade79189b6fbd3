//! Pooled game piece state.

use merge_grid_core::{GridCoord, Level};

use crate::pool::Poolable;

/// One game piece owned by the element pool.
///
/// The position is only meaningful while the element is placed on the grid;
/// it is cleared whenever the element returns to the pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    level: Level,
    position: Option<GridCoord>,
    active: bool,
}

impl Element {
    /// Creates an inactive, unplaced element at the minimum level.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: Level::MIN,
            position: None,
            active: false,
        }
    }

    /// Re-initialises the element for a new placement.
    pub fn initialize(&mut self, level: Level) {
        self.level = level;
        self.position = None;
    }

    /// Level of the element.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Cell the element occupies while placed.
    #[must_use]
    pub const fn position(&self) -> Option<GridCoord> {
        self.position
    }

    /// Reports whether the element is live on the board.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_position(&mut self, cell: GridCoord) {
        self.position = Some(cell);
    }
}

impl Default for Element {
    fn default() -> Self {
        Self::new()
    }
}

impl Poolable for Element {
    fn on_acquire(&mut self) {
        self.active = true;
    }

    fn on_release(&mut self) {
        self.active = false;
        self.position = None;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
