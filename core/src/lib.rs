#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the snake-pilot engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative round state, and pure systems. Adapters and systems
//! submit [`Command`] values describing desired mutations, the round
//! executes them via its `apply` entry point and broadcasts [`Event`]
//! values for systems to react to deterministically. Everything here is
//! a passive value type: coordinates, headings, and the round's
//! terminal verdicts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Side length of the square playing field measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridSize(u32);

impl GridSize {
    /// Creates a new grid size wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying side length.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Total number of cells on the board.
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        self.0 * self.0
    }
}

/// Location of a single grid cell.
///
/// Coordinates are signed so that a head that has stepped past the
/// boundary (a wall death) and a freshly grown tail segment remain
/// representable; only cells with `0 <= x, y < N` are part of the
/// playing field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    x: i32,
    y: i32,
}

impl Cell {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate, growing rightward.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate, growing downward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub const fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The cell one step away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        Cell::new(self.x + dx, self.y + dy)
    }

    /// Heading that moves from this cell onto an adjacent one.
    ///
    /// Returns `None` when the cells are not four-neighbors.
    #[must_use]
    pub fn direction_to(self, other: Cell) -> Option<Direction> {
        if self.manhattan_distance(other) != 1 {
            return None;
        }

        if other.x > self.x {
            Some(Direction::Right)
        } else if other.x < self.x {
            Some(Direction::Left)
        } else if other.y > self.y {
            Some(Direction::Down)
        } else {
            Some(Direction::Up)
        }
    }

    /// Reports whether the cell lies on the playing field.
    #[must_use]
    pub fn in_bounds(self, size: GridSize) -> bool {
        let side = size.get() as i32;
        self.x >= 0 && self.x < side && self.y >= 0 && self.y < side
    }

    /// Row-major index of the cell (`y·N + x`), if it is on the field.
    #[must_use]
    pub fn index(self, size: GridSize) -> Option<usize> {
        if !self.in_bounds(size) {
            return None;
        }

        let side = usize::try_from(size.get()).ok()?;
        let x = usize::try_from(self.x).ok()?;
        let y = usize::try_from(self.y).ok()?;
        y.checked_mul(side)?.checked_add(x)
    }

    /// In-bounds four-neighbors of the cell.
    ///
    /// The iteration order is fixed to +x, −x, +y, −y; every consumer
    /// that breaks ties by neighbor order relies on it, so search
    /// results stay reproducible across the engine.
    #[must_use]
    pub fn neighbors(self, size: GridSize) -> NeighborIter {
        let mut neighbors = NeighborIter::default();

        for direction in [
            Direction::Right,
            Direction::Left,
            Direction::Down,
            Direction::Up,
        ] {
            let candidate = self.step(direction);
            if candidate.in_bounds(size) {
                neighbors.push(candidate);
            }
        }

        neighbors
    }
}

/// Fixed-order iterator over the in-bounds neighbors of a cell.
#[derive(Clone, Debug, Default)]
pub struct NeighborIter {
    buffer: [Option<Cell>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, cell: Cell) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Cell;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

/// Cardinal headings available to the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing y.
    Up,
    /// Movement toward increasing y.
    Down,
    /// Movement toward decreasing x.
    Left,
    /// Movement toward increasing x.
    Right,
}

impl Direction {
    /// Unit delta of the heading as `(dx, dy)`.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// The direct 180° reverse of the heading.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Describes who is steering the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Headings arrive from an external input device.
    Manual,
    /// Headings are chosen by the autopilot system.
    Autonomous,
}

/// Terminal verdict evaluated once per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The round continues.
    Playing,
    /// The board was filled to the win threshold.
    Win,
    /// The head ran into the snake's own body or past the boundary.
    Dead,
    /// The starvation ceiling was exceeded without eating.
    Timeout,
}

/// Commands that express all permissible round mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the round clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the last tick.
        dt: Duration,
    },
    /// Requests one gated movement step.
    Step {
        /// Heading to adopt before moving, if any. `None` keeps the
        /// current heading; a 180° reversal is silently ignored.
        heading: Option<Direction>,
    },
}

/// Events broadcast by the round after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the round clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the snake completed a movement step.
    SnakeAdvanced {
        /// Cell occupied by the head after the step.
        head: Cell,
    },
    /// Confirms that the head landed on the target.
    TargetEaten {
        /// Cell the target occupied when it was eaten.
        cell: Cell,
        /// Steps taken since the previous target was eaten.
        moves_taken: u32,
    },
    /// Announces a freshly placed target.
    TargetSpawned {
        /// Cell the new target occupies.
        cell: Cell,
    },
    /// Reports that the round reached a terminal outcome.
    RoundEnded {
        /// Verdict that ended the round.
        outcome: Outcome,
    },
}
