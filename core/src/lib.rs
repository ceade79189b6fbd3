#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Merge Grid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! in the order the mutations happened. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Points awarded per unit of `2^level` when a merge completes.
pub const POINTS_PER_LEVEL_UNIT: u64 = 10;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the grid with the provided dimensions.
    ///
    /// Every placed element is returned to the pool and the selection is
    /// cleared.
    ConfigureGrid {
        /// Number of columns laid out in the grid.
        width: u32,
        /// Number of rows laid out in the grid.
        height: u32,
    },
    /// Sets the highest level an element may reach through merging.
    ConfigureMaxLevel {
        /// Inclusive upper bound for element levels.
        max_level: Level,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Issues an element from the pool and places it on a known free cell.
    SpawnElement {
        /// Cell that receives the new element.
        cell: GridCoord,
        /// Level assigned to the new element.
        level: Level,
    },
    /// Fuses two placed elements into one element of the next level.
    MergeElements {
        /// Previously selected element whose cell receives the result.
        anchor: ElementId,
        /// Element consumed by the merge.
        consumed: ElementId,
    },
    /// Records which element is currently highlighted as selected.
    SetSelection {
        /// Selected element, or `None` to clear the highlight.
        element: Option<ElementId>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the grid was rebuilt with new dimensions.
    GridConfigured {
        /// Dimensions of the rebuilt grid.
        dimensions: GridDimensions,
    },
    /// Confirms that a cell became occupied.
    CellOccupied {
        /// Cell that now holds an element.
        cell: GridCoord,
    },
    /// Confirms that a cell was cleared.
    CellFreed {
        /// Cell that no longer holds an element.
        cell: GridCoord,
    },
    /// Confirms that an element was issued from the pool and placed.
    ElementSpawned {
        /// State of the element immediately after placement.
        element: ElementSnapshot,
    },
    /// Reports that a spawn request could not be honoured.
    SpawnRejected {
        /// Cell requested for the spawn.
        cell: GridCoord,
        /// Level requested for the spawn.
        level: Level,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that two elements fused into a single higher level element.
    ElementsMerged {
        /// Anchor element as it was before the merge.
        anchor: ElementSnapshot,
        /// Consumed element as it was before the merge.
        consumed: ElementSnapshot,
        /// Result of the merge.
        outcome: MergeOutcome,
    },
    /// Reports that a merge request was rejected without mutating the board.
    MergeRejected {
        /// Anchor requested for the merge.
        anchor: ElementId,
        /// Element requested to be consumed.
        consumed: ElementId,
        /// Specific reason the merge failed.
        reason: MergeError,
    },
    /// Reports points gained by the player.
    ScoreChanged {
        /// Points added to the running score.
        delta: u64,
    },
    /// Announces that the highlighted selection changed.
    SelectionChanged {
        /// Element that was highlighted before the change.
        previous: Option<ElementId>,
        /// Element highlighted after the change.
        current: Option<ElementId>,
    },
    /// Announces that the session's high score was beaten.
    HighScoreRaised {
        /// New high score.
        high_score: u64,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: u32,
    y: u32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether `other` shares an edge with this cell.
    #[must_use]
    pub fn is_adjacent_to(self, other: GridCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Returns the up to four edge-sharing neighbours that do not underflow.
    ///
    /// Order is up, down, left, right, where "up" is increasing `y`. Upper
    /// bounds are not checked here.
    #[must_use]
    pub fn orthogonal_neighbors(self) -> Vec<GridCoord> {
        let mut neighbors = Vec::with_capacity(4);
        if let Some(y) = self.y.checked_add(1) {
            neighbors.push(Self::new(self.x, y));
        }
        if let Some(y) = self.y.checked_sub(1) {
            neighbors.push(Self::new(self.x, y));
        }
        if let Some(x) = self.x.checked_sub(1) {
            neighbors.push(Self::new(x, self.y));
        }
        if let Some(x) = self.x.checked_add(1) {
            neighbors.push(Self::new(x, self.y));
        }
        neighbors
    }
}

/// Width and height of the grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    width: u32,
    height: u32,
}

impl GridDimensions {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: GridCoord) -> bool {
        cell.x() < self.width && cell.y() < self.height
    }
}

/// Tier of an element. Merging two elements of one level yields the next.
///
/// Deserialized values pass through [`Level::new`], so a stored zero is
/// raised to [`Level::MIN`] as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Level(u32);

impl From<u32> for Level {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Level> for u32 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl Level {
    /// Lowest level an element can have.
    pub const MIN: Level = Level(1);

    /// Creates a level, raising zero to [`Level::MIN`].
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self::MIN
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric level.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Level produced by merging two elements of this level.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Points awarded for producing an element of this level: `2^level * 10`.
    ///
    /// Saturates at `u64::MAX` for levels that would overflow.
    #[must_use]
    pub fn merge_points(&self) -> u64 {
        1_u64
            .checked_shl(self.0)
            .and_then(|power| power.checked_mul(POINTS_PER_LEVEL_UNIT))
            .unwrap_or(u64::MAX)
    }
}

/// Stable identity of one pooled element instance.
///
/// Identifiers are reused when the pool reissues an instance, so consumers
/// should pair them with an [`ElementSnapshot`] when they need history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u32);

impl ElementId {
    /// Creates a new element identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable representation of a placed element used for queries and events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementSnapshot {
    /// Identifier of the pooled instance.
    pub id: ElementId,
    /// Level of the element.
    pub level: Level,
    /// Cell occupied by the element.
    pub cell: GridCoord,
}

/// Result of a successful merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeOutcome {
    position: GridCoord,
    new_level: Level,
    points: u64,
}

impl MergeOutcome {
    /// Creates an outcome record.
    #[must_use]
    pub const fn new(position: GridCoord, new_level: Level, points: u64) -> Self {
        Self {
            position,
            new_level,
            points,
        }
    }

    /// Derives the outcome of merging two elements of `level` at `position`.
    #[must_use]
    pub fn from_merge(position: GridCoord, level: Level) -> Self {
        let new_level = level.next();
        Self::new(position, new_level, new_level.merge_points())
    }

    /// Cell that holds the resulting element.
    #[must_use]
    pub const fn position(&self) -> GridCoord {
        self.position
    }

    /// Level of the resulting element.
    #[must_use]
    pub const fn new_level(&self) -> Level {
        self.new_level
    }

    /// Points gained by the merge.
    #[must_use]
    pub const fn points(&self) -> u64 {
        self.points
    }
}

/// Occupancy counters reported by the element pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances currently issued to the board.
    pub active: usize,
    /// Instances owned by the pool, issued or free.
    pub total: usize,
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell already holds an element.
    Occupied,
}

/// Reasons a merge request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MergeError {
    /// One of the elements is unknown or not placed on the board.
    MissingElement,
    /// The anchor and the consumed element are the same instance.
    SameElement,
    /// The elements have different levels.
    LevelMismatch,
    /// The result would exceed the configured maximum level.
    MaxLevelReached,
}

/// Read-only snapshot describing every placed element.
#[derive(Clone, Debug, Default)]
pub struct BoardView {
    dimensions: Option<GridDimensions>,
    snapshots: Vec<ElementSnapshot>,
}

impl BoardView {
    /// Creates a board view, ordering snapshots row-major by cell.
    #[must_use]
    pub fn from_snapshots(dimensions: GridDimensions, mut snapshots: Vec<ElementSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| (snapshot.cell.y(), snapshot.cell.x()));
        Self {
            dimensions: Some(dimensions),
            snapshots,
        }
    }

    /// Dimensions of the grid the snapshot was taken from.
    #[must_use]
    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions.unwrap_or(GridDimensions::new(0, 0))
    }

    /// Iterator over the captured snapshots in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &ElementSnapshot> {
        self.snapshots.iter()
    }

    /// Returns the element placed on `cell`, if any.
    #[must_use]
    pub fn element_at(&self, cell: GridCoord) -> Option<ElementSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.cell == cell)
            .copied()
    }

    /// Returns the placed element with the given identifier, if any.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<ElementSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.id == id)
            .copied()
    }

    /// Number of placed elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no element is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ElementSnapshot> {
        self.snapshots
    }
}
