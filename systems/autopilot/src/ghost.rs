//! Virtual snakes for look-ahead simulation.

use snake_pilot_core::Cell;
use snake_pilot_system_pathfinding::shortest_path;
use snake_pilot_world::{OccupancyGrid, Snake};

/// Disposable copy of the live snake used to preview a move sequence.
///
/// All mutation happens on the clone; the live body is never touched.
pub(crate) struct Ghost {
    snake: Snake,
}

impl Ghost {
    pub(crate) fn of(snake: &Snake) -> Self {
        Self {
            snake: snake.clone(),
        }
    }

    /// Points the head toward an adjacent cell. Non-adjacent cells are
    /// ignored, as is a 180° reversal.
    pub(crate) fn steer_towards(&mut self, cell: Cell) {
        if let Some(heading) = self.snake.head().cell.direction_to(cell) {
            self.snake.set_heading(heading);
        }
    }

    pub(crate) fn advance(&mut self) {
        self.snake.advance();
    }

    pub(crate) fn grow(&mut self) {
        self.snake.grow();
    }

    #[cfg(test)]
    pub(crate) fn snake(&self) -> &Snake {
        &self.snake
    }

    /// The safety oracle: whether the head can still reach the tail.
    pub(crate) fn can_reach_tail(&self) -> bool {
        !tail_escape_path(&self.snake).is_empty()
    }
}

/// Shortest path from the head to the tail cell, with the tail treated
/// as vacated since it moves out of the way on the step that would
/// reach it.
///
/// The tail cell stays blocked when another segment also covers it,
/// which can happen right after growth folds the new tail onto the
/// body. An empty path means the head is sealed off from its tail.
pub(crate) fn tail_escape_path(snake: &Snake) -> Vec<Cell> {
    let mut occupancy = OccupancyGrid::from_snake(snake);
    let tail = snake.tail().cell;
    let shared = snake
        .segments()
        .take(snake.len() - 1)
        .any(|segment| segment.cell == tail);
    if !shared {
        occupancy.vacate(tail);
    }

    shortest_path(snake.size(), snake.head().cell, tail, |cell| {
        occupancy.is_free(cell)
    })
}
