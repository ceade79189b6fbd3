#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Merge Grid.
//!
//! The world owns the occupancy grid and the element pool. Both are mutated
//! exclusively through [`apply`], which executes one [`Command`] to completion
//! before returning, so no caller can observe a half-applied merge.

pub mod element;
pub mod grid;
pub mod pool;

use merge_grid_core::{
    Command, ElementId, ElementSnapshot, Event, GridCoord, Level, MergeError, MergeOutcome,
    SpawnError,
};
use tracing::{debug, warn};

use crate::{element::Element, grid::Grid, pool::Pool};

const DEFAULT_GRID_WIDTH: u32 = 5;
const DEFAULT_GRID_HEIGHT: u32 = 5;
const DEFAULT_MAX_LEVEL: Level = Level::new(10);

/// Number of inactive elements the pool creates up front.
pub const DEFAULT_POOL_WARM_UP: usize = 20;

/// Represents the authoritative Merge Grid world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    pool: Pool<Element>,
    max_level: Level,
    selection: Option<ElementId>,
}

impl World {
    /// Creates a new world with a default grid and a warmed pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_pool_warm_up(DEFAULT_POOL_WARM_UP)
    }

    /// Creates a new world whose pool pre-creates `warm_up` elements.
    #[must_use]
    pub fn with_pool_warm_up(warm_up: usize) -> Self {
        Self {
            grid: Grid::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT),
            pool: Pool::new(warm_up, Element::new),
            max_level: DEFAULT_MAX_LEVEL,
            selection: None,
        }
    }

    /// Drops every pooled element that is not placed. Used on teardown.
    pub fn release_pool(&mut self) {
        self.pool.clear();
    }

    fn snapshot(&self, id: ElementId) -> Option<ElementSnapshot> {
        let element = self.pool.get(id)?;
        if !element.is_active() {
            return None;
        }
        let cell = element.position()?;
        (self.grid.element_at(cell) == Some(id)).then_some(ElementSnapshot {
            id,
            level: element.level(),
            cell,
        })
    }

    fn spawn_at(
        &mut self,
        cell: GridCoord,
        level: Level,
        out_events: &mut Vec<Event>,
    ) -> Option<ElementSnapshot> {
        let reason = if !self.grid.is_valid(cell) {
            Some(SpawnError::OutOfBounds)
        } else if self.grid.is_occupied(cell) {
            Some(SpawnError::Occupied)
        } else {
            None
        };
        if let Some(reason) = reason {
            warn!(?cell, ?reason, "rejected element placement");
            out_events.push(Event::SpawnRejected {
                cell,
                level,
                reason,
            });
            return None;
        }

        let level = level.min(self.max_level);
        let id = self.pool.acquire();
        let element = self.pool.get_mut(id)?;
        element.initialize(level);
        if !self.grid.place(cell, id, element, out_events) {
            let _ = self.pool.release(id);
            return None;
        }

        let snapshot = ElementSnapshot { id, level, cell };
        out_events.push(Event::ElementSpawned { element: snapshot });
        Some(snapshot)
    }

    fn merge(&mut self, anchor: ElementId, consumed: ElementId, out_events: &mut Vec<Event>) {
        let validated = self.validate_merge(anchor, consumed);
        let (anchor_snapshot, consumed_snapshot) = match validated {
            Ok(pair) => pair,
            Err(reason) => {
                debug!(?anchor, ?consumed, ?reason, "rejected merge");
                out_events.push(Event::MergeRejected {
                    anchor,
                    consumed,
                    reason,
                });
                return;
            }
        };

        let outcome = MergeOutcome::from_merge(anchor_snapshot.cell, anchor_snapshot.level);

        let _ = self.grid.remove(anchor_snapshot.cell, out_events);
        let _ = self.grid.remove(consumed_snapshot.cell, out_events);
        let _ = self.pool.release(anchor);
        let _ = self.pool.release(consumed);

        if self
            .spawn_at(outcome.position(), outcome.new_level(), out_events)
            .is_none()
        {
            warn!(cell = ?outcome.position(), "merge result could not be placed");
        }

        out_events.push(Event::ElementsMerged {
            anchor: anchor_snapshot,
            consumed: consumed_snapshot,
            outcome,
        });
        out_events.push(Event::ScoreChanged {
            delta: outcome.points(),
        });

        if self
            .selection
            .is_some_and(|selected| selected == anchor || selected == consumed)
        {
            self.select(None, out_events);
        }
    }

    fn validate_merge(
        &self,
        anchor: ElementId,
        consumed: ElementId,
    ) -> Result<(ElementSnapshot, ElementSnapshot), MergeError> {
        let anchor_snapshot = self.snapshot(anchor).ok_or(MergeError::MissingElement)?;
        let consumed_snapshot = self.snapshot(consumed).ok_or(MergeError::MissingElement)?;
        if anchor == consumed {
            return Err(MergeError::SameElement);
        }
        if anchor_snapshot.level != consumed_snapshot.level {
            return Err(MergeError::LevelMismatch);
        }
        if anchor_snapshot.level >= self.max_level {
            return Err(MergeError::MaxLevelReached);
        }
        Ok((anchor_snapshot, consumed_snapshot))
    }

    fn select(&mut self, element: Option<ElementId>, out_events: &mut Vec<Event>) {
        if element.is_some_and(|id| self.snapshot(id).is_none()) {
            debug!(?element, "ignored selection of an element that is not placed");
            return;
        }
        if self.selection == element {
            return;
        }
        let previous = std::mem::replace(&mut self.selection, element);
        out_events.push(Event::SelectionChanged {
            previous,
            current: element,
        });
    }

    fn reset_grid(&mut self, width: u32, height: u32, out_events: &mut Vec<Event>) {
        self.select(None, out_events);
        let placed: Vec<ElementId> = self.grid.occupants().map(|(_, id)| id).collect();
        for id in placed {
            let _ = self.pool.release(id);
        }
        self.grid = Grid::new(width, height);
        out_events.push(Event::GridConfigured {
            dimensions: self.grid.dimensions(),
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { width, height } => {
            world.reset_grid(width, height, out_events);
        }
        Command::ConfigureMaxLevel { max_level } => {
            world.max_level = max_level;
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnElement { cell, level } => {
            let _ = world.spawn_at(cell, level, out_events);
        }
        Command::MergeElements { anchor, consumed } => {
            world.merge(anchor, consumed, out_events);
        }
        Command::SetSelection { element } => {
            world.select(element, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use merge_grid_core::{
        BoardView, ElementId, ElementSnapshot, GridCoord, GridDimensions, Level, PoolStats,
    };

    use super::World;

    /// Dimensions of the active grid.
    #[must_use]
    pub fn dimensions(world: &World) -> GridDimensions {
        world.grid.dimensions()
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub fn is_valid(world: &World, cell: GridCoord) -> bool {
        world.grid.is_valid(cell)
    }

    /// Reports whether an element occupies the cell.
    #[must_use]
    pub fn is_occupied(world: &World, cell: GridCoord) -> bool {
        world.grid.is_occupied(cell)
    }

    /// Returns the element placed on `cell`, if any.
    #[must_use]
    pub fn element_at(world: &World, cell: GridCoord) -> Option<ElementSnapshot> {
        world
            .grid
            .element_at(cell)
            .and_then(|id| world.snapshot(id))
    }

    /// Returns the placed element with the given identifier, if any.
    #[must_use]
    pub fn element(world: &World, id: ElementId) -> Option<ElementSnapshot> {
        world.snapshot(id)
    }

    /// Enumerates every free cell in row-major order.
    #[must_use]
    pub fn empty_cells(world: &World) -> Vec<GridCoord> {
        world.grid.empty_cells()
    }

    /// Edge-sharing neighbours of `id` that have the same level.
    ///
    /// Diagnostic only: merges are not restricted to neighbours.
    #[must_use]
    pub fn neighbors_same_level(world: &World, id: ElementId) -> Vec<ElementSnapshot> {
        let Some(origin) = world.snapshot(id) else {
            return Vec::new();
        };
        world
            .grid
            .occupied_neighbors(origin.cell)
            .into_iter()
            .filter_map(|(_, neighbor)| world.snapshot(neighbor))
            .filter(|neighbor| neighbor.level == origin.level)
            .collect()
    }

    /// Captures a read-only view of every placed element.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView {
        let snapshots = world
            .grid
            .occupants()
            .filter_map(|(_, id)| world.snapshot(id))
            .collect();
        BoardView::from_snapshots(world.grid.dimensions(), snapshots)
    }

    /// Captures the element pool counters.
    #[must_use]
    pub fn pool_stats(world: &World) -> PoolStats {
        world.pool.stats()
    }

    /// Number of elements resting in the pool's free set.
    #[must_use]
    pub fn pool_free_count(world: &World) -> usize {
        world.pool.free_count()
    }

    /// Reports whether `id` rests in the pool's free set.
    #[must_use]
    pub fn is_pooled(world: &World, id: ElementId) -> bool {
        world.pool.is_free(id)
    }

    /// Element currently highlighted as selected.
    #[must_use]
    pub fn selection(world: &World) -> Option<ElementId> {
        world.selection
    }

    /// Highest level an element may reach.
    #[must_use]
    pub fn max_level(world: &World) -> Level {
        world.max_level
    }
}
