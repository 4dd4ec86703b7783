#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous steering for the snake.
//!
//! A pure system in the engine's sense: it consumes the round's event
//! stream plus a read-only [`PilotView`] and emits [`Command::Step`]
//! values. The heading for each step comes from a strict five-strategy
//! cascade, each strategy validated against the tail-reachability
//! oracle on a simulated copy of the body:
//!
//! 1. direct finishing move when one target from a full board,
//! 2. shortest path to the target, validated by walking a ghost down
//!    the whole path and growing it,
//! 3. the open neighbor farthest from the tail, used only while the
//!    score is even and starvation is far off,
//! 4. a random validated open neighbor,
//! 5. the path to the snake's own tail.
//!
//! When every strategy fails the step carries no heading and the snake
//! keeps going straight.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use snake_pilot_core::{Cell, Command, Direction, Event, Outcome};
use snake_pilot_system_pathfinding::shortest_path;
use snake_pilot_world::query::PilotView;
use snake_pilot_world::Snake;

mod ghost;

use ghost::{tail_escape_path, Ghost};

/// Configuration for the autopilot.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Seeds the random-safe-move strategy.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Event-driven steering system emitting one step per ready tick.
#[derive(Debug)]
pub struct Autopilot {
    rng: ChaCha8Rng,
}

impl Autopilot {
    /// Creates an autopilot from its configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Reacts to one batch of round events.
    ///
    /// A step command is emitted only when the batch reports advanced
    /// time, the round is still being played, and the round's clock
    /// has accumulated a full step quantum.
    pub fn handle(
        &mut self,
        events: &[Event],
        view: &PilotView<'_>,
        out_commands: &mut Vec<Command>,
    ) {
        let time_advanced = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !time_advanced || view.outcome != Outcome::Playing || !view.ready_for_step {
            return;
        }

        out_commands.push(Command::Step {
            heading: self.next_heading(view),
        });
    }

    fn next_heading(&mut self, view: &PilotView<'_>) -> Option<Direction> {
        let step = self.choose_step(view)?;
        view.snake.head().cell.direction_to(step)
    }

    /// Runs the decision cascade and yields the cell to step onto.
    fn choose_step(&mut self, view: &PilotView<'_>) -> Option<Cell> {
        let snake = view.snake;
        let head = snake.head().cell;
        let target = view.target?;

        if view.score + 1 == view.max_score && head.manhattan_distance(target) == 1 {
            return Some(target);
        }

        if let Some(step) = validated_target_step(snake, target) {
            return Some(step);
        }

        if view.score % 2 == 0 && view.moves_without_eating < view.starvation_limit / 2 {
            if let Some(step) = longest_step_to_tail(snake, target) {
                return Some(step);
            }
        }

        if let Some(step) = self.random_safe_step(snake, target) {
            return Some(step);
        }

        tail_escape_path(snake).first().copied()
    }

    /// Picks a random open neighbor and keeps it if the move leaves
    /// the tail reachable; otherwise falls back to chasing the tail.
    fn random_safe_step(&mut self, snake: &Snake, target: Cell) -> Option<Cell> {
        let neighbors = open_neighbors(snake, target);
        if neighbors.is_empty() {
            return None;
        }

        let pick = neighbors[self.rng.gen_range(0..neighbors.len())];
        let mut ghost = Ghost::of(snake);
        ghost.steer_towards(pick);
        ghost.advance();
        if ghost.can_reach_tail() {
            return Some(pick);
        }

        tail_escape_path(snake).first().copied()
    }
}

/// Shortest path to the target, accepted only when a ghost that walks
/// the whole path and grows can still reach its own tail afterwards.
fn validated_target_step(snake: &Snake, target: Cell) -> Option<Cell> {
    let path = shortest_path(snake.size(), snake.head().cell, target, |cell| {
        snake.is_free(cell)
    });
    let first = path.first().copied()?;

    let mut ghost = Ghost::of(snake);
    for &cell in &path {
        ghost.steer_towards(cell);
        ghost.advance();
    }
    ghost.grow();

    if ghost.can_reach_tail() {
        Some(first)
    } else {
        None
    }
}

/// The open neighbor farthest (Manhattan) from the tail whose move
/// keeps the tail reachable.
///
/// Candidates are scanned in neighbor order and simulated only when
/// they strictly beat the best validated distance so far, so ties go
/// to the earliest candidate.
fn longest_step_to_tail(snake: &Snake, target: Cell) -> Option<Cell> {
    let tail = snake.tail().cell;
    let mut best = None;
    let mut best_distance: Option<u32> = None;

    for neighbor in open_neighbors(snake, target) {
        let distance = neighbor.manhattan_distance(tail);
        if best_distance.map_or(true, |record| distance > record) {
            let mut ghost = Ghost::of(snake);
            ghost.steer_towards(neighbor);
            ghost.advance();
            if ghost.can_reach_tail() {
                best = Some(neighbor);
                best_distance = Some(distance);
            }
        }
    }

    best
}

/// Free neighbors of the head, excluding the target cell.
///
/// The target is excluded because these strategies deliberately stall;
/// eating is left to the validated path strategy.
fn open_neighbors(snake: &Snake, target: Cell) -> Vec<Cell> {
    snake
        .head()
        .cell
        .neighbors(snake.size())
        .filter(|&cell| cell != target && snake.is_free(cell))
        .collect()
}
