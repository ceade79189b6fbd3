//! Dense occupancy table mapping grid cells to the elements placed on them.

use merge_grid_core::{ElementId, Event, GridCoord, GridDimensions};

use crate::element::Element;

/// Fixed-size occupancy grid.
///
/// Each slot stores the identifier of the element placed on the cell, so the
/// occupancy flag and the cell-to-element association are the same datum and
/// cannot disagree. Slots are laid out row-major.
#[derive(Clone, Debug)]
pub struct Grid {
    dimensions: GridDimensions,
    cells: Vec<Option<ElementId>>,
}

impl Grid {
    /// Creates an empty grid with the provided dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let dimensions = GridDimensions::new(width, height);
        let capacity = usize::try_from(dimensions.cell_count()).unwrap_or(0);
        Self {
            dimensions,
            cells: vec![None; capacity],
        }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub fn is_valid(&self, cell: GridCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Reports whether an element occupies the cell. Invalid cells are never occupied.
    #[must_use]
    pub fn is_occupied(&self, cell: GridCoord) -> bool {
        self.element_at(cell).is_some()
    }

    /// Returns the element occupying the cell, if any.
    #[must_use]
    pub fn element_at(&self, cell: GridCoord) -> Option<ElementId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Places `element` on `cell`.
    ///
    /// Returns `false` without touching the grid or the element when the cell
    /// is invalid or already occupied. On success the element's position is
    /// updated and [`Event::CellOccupied`] is pushed.
    pub fn place(
        &mut self,
        cell: GridCoord,
        id: ElementId,
        element: &mut Element,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        let Some(slot) = self.cells.get_mut(index) else {
            return false;
        };
        if slot.is_some() {
            return false;
        }

        *slot = Some(id);
        element.set_position(cell);
        out_events.push(Event::CellOccupied { cell });
        true
    }

    /// Clears `cell`, returning the element that occupied it.
    ///
    /// Invalid cells are ignored. Valid cells always push
    /// [`Event::CellFreed`], even when they were already empty.
    pub fn remove(&mut self, cell: GridCoord, out_events: &mut Vec<Event>) -> Option<ElementId> {
        let index = self.index(cell)?;
        let previous = self.cells.get_mut(index).and_then(Option::take);
        out_events.push(Event::CellFreed { cell });
        previous
    }

    /// Enumerates every free cell in row-major order.
    #[must_use]
    pub fn empty_cells(&self) -> Vec<GridCoord> {
        self.cells_with_slots()
            .filter(|(_, slot)| slot.is_none())
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Enumerates every occupied cell with its occupant in row-major order.
    pub fn occupants(&self) -> impl Iterator<Item = (GridCoord, ElementId)> + '_ {
        self.cells_with_slots()
            .filter_map(|(cell, slot)| slot.map(|id| (cell, id)))
    }

    /// Occupied edge-sharing neighbours of `cell`, ordered up, down, left, right.
    #[must_use]
    pub fn occupied_neighbors(&self, cell: GridCoord) -> Vec<(GridCoord, ElementId)> {
        cell.orthogonal_neighbors()
            .into_iter()
            .filter_map(|neighbor| self.element_at(neighbor).map(|id| (neighbor, id)))
            .collect()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }

    fn cells_with_slots(&self) -> impl Iterator<Item = (GridCoord, Option<ElementId>)> + '_ {
        let width = self.dimensions.width();
        (0..self.dimensions.height())
            .flat_map(move |y| (0..width).map(move |x| GridCoord::new(x, y)))
            .zip(self.cells.iter().copied())
    }

    fn index(&self, cell: GridCoord) -> Option<usize> {
        if self.dimensions.contains(cell) {
            let row = usize::try_from(cell.y()).ok()?;
            let column = usize::try_from(cell.x()).ok()?;
            let width = usize::try_from(self.dimensions.width()).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
