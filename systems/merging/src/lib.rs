#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Selection and merge state machine.
//!
//! The system tracks at most one selected element. Picking a second element
//! of the same level schedules a merge that is submitted to the world as a
//! single [`Command::MergeElements`] once the merge delay has elapsed. Picks
//! that arrive while a merge is pending are ignored. Merge candidates do not
//! need to be adjacent; only their levels are compared.

use std::time::Duration;

use merge_grid_core::{Command, ElementId, ElementSnapshot, Event, Level};
use tracing::debug;

/// Default duration between deciding a merge and applying it.
pub const DEFAULT_MERGE_DELAY: Duration = Duration::from_millis(300);

/// Configuration parameters required to construct the merging system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    merge_delay: Duration,
    max_level: Level,
}

impl Config {
    /// Creates a configuration with the provided merge delay and level cap.
    #[must_use]
    pub const fn new(merge_delay: Duration, max_level: Level) -> Self {
        Self {
            merge_delay,
            max_level,
        }
    }
}

/// Result of resolving a player's click against the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pick {
    /// The click landed on a placed element.
    Element(ElementSnapshot),
    /// The click did not hit any element.
    Miss,
}

impl From<Option<ElementSnapshot>> for Pick {
    fn from(element: Option<ElementSnapshot>) -> Self {
        element.map_or(Self::Miss, Self::Element)
    }
}

/// State of the selection machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No element is selected.
    Idle,
    /// One element is selected and awaits a partner.
    Selected(ElementSnapshot),
    /// A merge was decided and waits for its delay to elapse.
    Merging {
        /// Element whose cell receives the result.
        anchor: ElementId,
        /// Element consumed by the merge.
        consumed: ElementId,
        /// Delay left before the merge command is emitted.
        remaining: Duration,
    },
}

/// Why two picked elements were not merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ineligible {
    LevelMismatch,
    MaxLevel,
}

/// Merge engine that turns picks into selection and merge commands.
#[derive(Debug)]
pub struct Merging {
    merge_delay: Duration,
    max_level: Level,
    phase: Phase,
}

impl Merging {
    /// Creates an idle merging system.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            merge_delay: config.merge_delay,
            max_level: config.max_level,
            phase: Phase::Idle,
        }
    }

    /// Current state of the machine.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Element currently selected, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<ElementSnapshot> {
        match self.phase {
            Phase::Selected(element) => Some(element),
            _ => None,
        }
    }

    /// Reports whether a merge is waiting for its delay.
    #[must_use]
    pub const fn is_merging(&self) -> bool {
        matches!(self.phase, Phase::Merging { .. })
    }

    /// Consumes world events and resolved picks to emit selection and merge commands.
    ///
    /// Events are processed before picks so that a pick never refers to a
    /// selection the world has already invalidated.
    pub fn handle(&mut self, events: &[Event], picks: &[Pick], out: &mut Vec<Command>) {
        for event in events {
            self.observe(event, out);
        }

        for pick in picks {
            self.pick(*pick, out);
        }
    }

    fn observe(&mut self, event: &Event, out: &mut Vec<Command>) {
        match (event, self.phase) {
            (Event::GridConfigured { .. }, _) => {
                self.phase = Phase::Idle;
            }
            (Event::CellFreed { cell }, Phase::Selected(selected)) if selected.cell == *cell => {
                self.phase = Phase::Idle;
            }
            (
                Event::TimeAdvanced { dt },
                Phase::Merging {
                    anchor,
                    consumed,
                    remaining,
                },
            ) => {
                let remaining = remaining.saturating_sub(*dt);
                if remaining.is_zero() {
                    self.commit(anchor, consumed, out);
                } else {
                    self.phase = Phase::Merging {
                        anchor,
                        consumed,
                        remaining,
                    };
                }
            }
            _ => {}
        }
    }

    fn pick(&mut self, pick: Pick, out: &mut Vec<Command>) {
        match (self.phase, pick) {
            (Phase::Merging { .. }, _) => {
                debug!(?pick, "ignored pick while a merge is pending");
            }
            (Phase::Idle, Pick::Miss) => {}
            (Phase::Idle, Pick::Element(candidate)) => self.select(candidate, out),
            (Phase::Selected(_), Pick::Miss) => self.deselect(out),
            (Phase::Selected(selected), Pick::Element(candidate)) => {
                if selected.id == candidate.id {
                    self.deselect(out);
                    return;
                }
                match self.eligibility(selected, candidate) {
                    Ok(()) => self.begin_merge(selected.id, candidate.id, out),
                    Err(reason) => {
                        debug!(
                            ?reason,
                            selected = selected.level.get(),
                            candidate = candidate.level.get(),
                            "cannot merge, switching selection"
                        );
                        self.select(candidate, out);
                    }
                }
            }
        }
    }

    fn eligibility(
        &self,
        selected: ElementSnapshot,
        candidate: ElementSnapshot,
    ) -> Result<(), Ineligible> {
        if selected.level != candidate.level {
            return Err(Ineligible::LevelMismatch);
        }
        if selected.level >= self.max_level {
            return Err(Ineligible::MaxLevel);
        }
        Ok(())
    }

    fn select(&mut self, element: ElementSnapshot, out: &mut Vec<Command>) {
        self.phase = Phase::Selected(element);
        out.push(Command::SetSelection {
            element: Some(element.id),
        });
    }

    fn deselect(&mut self, out: &mut Vec<Command>) {
        self.phase = Phase::Idle;
        out.push(Command::SetSelection { element: None });
    }

    fn begin_merge(&mut self, anchor: ElementId, consumed: ElementId, out: &mut Vec<Command>) {
        if self.merge_delay.is_zero() {
            self.commit(anchor, consumed, out);
            return;
        }
        self.phase = Phase::Merging {
            anchor,
            consumed,
            remaining: self.merge_delay,
        };
    }

    fn commit(&mut self, anchor: ElementId, consumed: ElementId, out: &mut Vec<Command>) {
        self.phase = Phase::Idle;
        out.push(Command::MergeElements { anchor, consumed });
    }
}
