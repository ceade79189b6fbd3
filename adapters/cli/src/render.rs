//! Plain-text presentation of the board and the event feed.

use std::fmt::Write as _;

use merge_grid_core::{BoardView, ElementId, Event, GridCoord};

/// Draws the board with row 0 at the bottom. The selected element is starred.
pub(crate) fn board(view: &BoardView, selection: Option<ElementId>) -> String {
    let dimensions = view.dimensions();
    let mut text = String::new();
    for y in (0..dimensions.height()).rev() {
        let _ = write!(text, "{y:>2} ");
        for x in 0..dimensions.width() {
            match view.element_at(GridCoord::new(x, y)) {
                Some(element) if Some(element.id) == selection => {
                    let _ = write!(text, "*{:>2}", element.level.get());
                }
                Some(element) => {
                    let _ = write!(text, " {:>2}", element.level.get());
                }
                None => text.push_str("  ."),
            }
        }
        text.push('\n');
    }
    text.push_str("   ");
    for x in 0..dimensions.width() {
        let _ = write!(text, " {x:>2}");
    }
    text
}

/// One-line description of an event, or `None` for bookkeeping noise.
pub(crate) fn event(event: &Event) -> Option<String> {
    let line = match event {
        Event::ElementSpawned { element } => format!(
            "spawned level {} at ({}, {})",
            element.level.get(),
            element.cell.x(),
            element.cell.y()
        ),
        Event::SpawnRejected { cell, reason, .. } => {
            format!("cannot spawn at ({}, {}): {reason:?}", cell.x(), cell.y())
        }
        Event::ElementsMerged { outcome, .. } => format!(
            "merged into level {} at ({}, {}) for {} points",
            outcome.new_level().get(),
            outcome.position().x(),
            outcome.position().y(),
            outcome.points()
        ),
        Event::MergeRejected { reason, .. } => format!("merge rejected: {reason:?}"),
        Event::HighScoreRaised { high_score } => format!("new high score: {high_score}"),
        Event::GridConfigured { dimensions } => format!(
            "board is {}x{}",
            dimensions.width(),
            dimensions.height()
        ),
        Event::TimeAdvanced { .. }
        | Event::CellOccupied { .. }
        | Event::CellFreed { .. }
        | Event::ScoreChanged { .. }
        | Event::SelectionChanged { .. } => return None,
    };
    Some(line)
}
