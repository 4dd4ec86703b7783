//! Dense occupancy snapshots of the playing field.

use snake_pilot_core::{Cell, GridSize};

use crate::snake::Snake;

/// Row-major occupancy bitmap captured from a snake at one instant.
///
/// Searches and target placement work on these snapshots instead of
/// scanning the segment list per cell; out-of-bounds cells always
/// report as occupied.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    size: GridSize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Captures the cells currently covered by the snake.
    #[must_use]
    pub fn from_snake(snake: &Snake) -> Self {
        let size = snake.size();
        let capacity = usize::try_from(size.cell_count()).unwrap_or(0);
        let mut cells = vec![false; capacity];
        for segment in snake.segments() {
            if let Some(index) = segment.cell.index(size) {
                cells[index] = true;
            }
        }

        Self { size, cells }
    }

    /// Reports whether the cell is on the board and unoccupied.
    #[must_use]
    pub fn is_free(&self, cell: Cell) -> bool {
        match cell.index(self.size) {
            Some(index) => !self.cells[index],
            None => false,
        }
    }

    /// Marks the cell as unoccupied. Out-of-bounds cells are ignored.
    pub fn vacate(&mut self, cell: Cell) {
        if let Some(index) = cell.index(self.size) {
            self.cells[index] = false;
        }
    }

    /// Enumerates the free cells in row-major order.
    #[must_use]
    pub fn free_cells(&self) -> Vec<Cell> {
        let side = self.size.get() as i32;
        let mut free = Vec::new();
        for y in 0..side {
            for x in 0..side {
                let cell = Cell::new(x, y);
                if self.is_free(cell) {
                    free.push(cell);
                }
            }
        }

        free
    }
}
