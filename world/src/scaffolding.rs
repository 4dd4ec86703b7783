//! Test scaffolding for crafting mid-round states.
//!
//! Gated behind the `round_scaffolding` feature so downstream test
//! suites can assemble a [`Round`] at an arbitrary point of play
//! without replaying the moves that would lead there. Builders here
//! panic on malformed input; they are not part of the engine surface.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use snake_pilot_core::{Cell, Direction, GridSize, Mode, Outcome};

use crate::snake::{Segment, Snake};
use crate::{
    default_starvation_limit, default_step_delay, spawn_target, Round, INITIAL_SNAKE_LENGTH,
};

/// Assembles a [`Round`] directly in a chosen mid-game state.
///
/// Segment cells are given head first; per-segment headings and the
/// pending turn entries that keep followers on the head's path are
/// derived from the chain shape. The reported score is the body length
/// minus the starting length.
#[derive(Clone, Debug)]
pub struct RoundBuilder {
    size: GridSize,
    mode: Mode,
    seed: u64,
    segments: Option<Vec<Cell>>,
    target: Option<Cell>,
    step_delay: Option<Duration>,
    starvation_limit: Option<u32>,
    moves_without_eating: u32,
}

impl RoundBuilder {
    /// Starts a builder for a board of the given side length.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            mode: Mode::Autonomous,
            seed: 0,
            segments: None,
            target: None,
            step_delay: None,
            starvation_limit: None,
            moves_without_eating: 0,
        }
    }

    /// Selects the steering mode. Defaults to autonomous.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Seeds the round's random number generator. Defaults to zero.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Places the body on the given cells, head first. The cells must
    /// form a connected chain of distinct in-bounds four-neighbors.
    #[must_use]
    pub fn with_segments(mut self, cells: Vec<Cell>) -> Self {
        self.segments = Some(cells);
        self
    }

    /// Pins the target to a specific cell instead of a random one.
    #[must_use]
    pub fn with_target(mut self, cell: Cell) -> Self {
        self.target = Some(cell);
        self
    }

    /// Overrides the step quantum implied by the steering mode.
    #[must_use]
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = Some(delay);
        self
    }

    /// Overrides the default starvation ceiling.
    #[must_use]
    pub fn with_starvation_limit(mut self, limit: u32) -> Self {
        self.starvation_limit = Some(limit);
        self
    }

    /// Pretends the snake has already gone this many steps without
    /// eating.
    #[must_use]
    pub fn with_moves_without_eating(mut self, moves: u32) -> Self {
        self.moves_without_eating = moves;
        self
    }

    /// Builds the round.
    ///
    /// # Panics
    ///
    /// Panics when the segment chain is malformed or the target cell
    /// is covered by the body.
    #[must_use]
    pub fn build(self) -> Round {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let snake = match self.segments {
            Some(cells) => assemble_snake(self.size, &cells),
            None => Snake::spawn(self.size),
        };

        let target = match self.target {
            Some(cell) => {
                assert!(snake.is_free(cell), "target cell {cell:?} is not free");
                Some(cell)
            }
            None => spawn_target(&snake, &mut rng),
        };

        let score = u32::try_from(snake.len()).expect("body length fits u32") - INITIAL_SNAKE_LENGTH;

        Round {
            size: self.size,
            mode: self.mode,
            snake,
            target,
            outcome: Outcome::Playing,
            rng,
            step_delay: self.step_delay.unwrap_or_else(|| default_step_delay(self.mode)),
            accumulator: Duration::ZERO,
            elapsed: Duration::ZERO,
            score,
            total_moves: 0,
            moves_without_eating: self.moves_without_eating,
            moves_for_current_target: 0,
            moves_per_target: Vec::new(),
            starvation_limit: self
                .starvation_limit
                .unwrap_or_else(|| default_starvation_limit(self.size)),
        }
    }
}

/// Derives per-segment headings and pending turn entries from the
/// chain shape, then assembles the snake.
///
/// A segment's heading is the direction it last moved in, which for a
/// consistent chain is the direction from its successor's cell onto
/// its own. Wherever that heading differs from the direction a segment
/// must exit toward its predecessor, a turn entry is synthesized so
/// followers keep tracing the head's path.
fn assemble_snake(size: GridSize, cells: &[Cell]) -> Snake {
    assert!(
        cells.len() >= INITIAL_SNAKE_LENGTH as usize,
        "body needs at least {INITIAL_SNAKE_LENGTH} segments"
    );

    for (index, cell) in cells.iter().enumerate() {
        assert!(cell.in_bounds(size), "segment {index} at {cell:?} is out of bounds");
        assert!(
            !cells[..index].contains(cell),
            "segment {index} repeats cell {cell:?}"
        );
    }

    let last = cells.len() - 1;
    let heading_of = |index: usize| -> Direction {
        let derived = if index == last {
            cells[last].direction_to(cells[last - 1])
        } else {
            cells[index + 1].direction_to(cells[index])
        };
        derived.unwrap_or_else(|| panic!("segments around index {index} are not four-neighbors"))
    };

    let mut segments = VecDeque::with_capacity(cells.len());
    for (index, &cell) in cells.iter().enumerate() {
        segments.push_back(Segment {
            cell,
            heading: heading_of(index),
        });
    }

    let mut turns = HashMap::new();
    for index in 1..cells.len() {
        let exit = cells[index]
            .direction_to(cells[index - 1])
            .unwrap_or_else(|| panic!("segments around index {index} are not four-neighbors"));
        if exit != heading_of(index) {
            let _ = turns.insert(cells[index], exit);
        }
    }

    Snake::from_parts(size, segments, heading_of(0), turns)
}

#[cfg(test)]
mod tests {
    use super::RoundBuilder;
    use crate::query;
    use snake_pilot_core::{Cell, Direction, GridSize};

    #[test]
    fn derives_headings_and_turns_from_the_chain_shape() {
        let round = RoundBuilder::new(GridSize::new(8))
            .with_segments(vec![
                Cell::new(2, 3),
                Cell::new(2, 2),
                Cell::new(3, 2),
                Cell::new(4, 2),
            ])
            .with_target(Cell::new(0, 0))
            .build();

        let snake = query::snake(&round);
        assert_eq!(snake.heading(), Direction::Down);
        assert_eq!(snake.head().heading, Direction::Down);
        assert_eq!(snake.tail().heading, Direction::Left);
        assert_eq!(query::stats(&round).score, 1);
    }

    #[test]
    #[should_panic(expected = "not four-neighbors")]
    fn rejects_disconnected_chains() {
        let _ = RoundBuilder::new(GridSize::new(8))
            .with_segments(vec![Cell::new(0, 0), Cell::new(2, 0), Cell::new(3, 0)])
            .build();
    }

    #[test]
    #[should_panic(expected = "is not free")]
    fn rejects_targets_on_the_body() {
        let _ = RoundBuilder::new(GridSize::new(8))
            .with_segments(vec![Cell::new(2, 2), Cell::new(3, 2), Cell::new(4, 2)])
            .with_target(Cell::new(3, 2))
            .build();
    }
}
