#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state for the snake-pilot engine.
//!
//! The [`Round`] owns every mutable fact about a running game: the snake
//! body, the target, the clock, and the score ledger. All mutation flows
//! through [`apply`], which executes [`Command`] values and broadcasts
//! [`Event`] values describing what actually happened. Systems never
//! touch the round directly; they read it through the [`query`] module.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use snake_pilot_core::{Cell, Command, Direction, Event, Mode, Outcome};
pub use snake_pilot_core::GridSize;

mod occupancy;
mod snake;

#[cfg(any(test, feature = "round_scaffolding"))]
pub mod scaffolding;

pub use occupancy::OccupancyGrid;
pub use snake::{Segment, Snake};

/// Number of segments a snake starts with.
pub const INITIAL_SNAKE_LENGTH: u32 = 3;

/// Smallest playable board side length.
pub const MIN_GRID_SIDE: u32 = 5;

/// Step quantum when the autopilot steers.
pub const AUTONOMOUS_STEP_DELAY: Duration = Duration::from_millis(100);

/// Step quantum when an external input device steers.
pub const MANUAL_STEP_DELAY: Duration = Duration::from_millis(150);

/// Errors reported while validating a round configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested board side length is below [`MIN_GRID_SIDE`].
    #[error("grid side {0} is below the minimum of {MIN_GRID_SIDE}")]
    GridTooSmall(u32),
}

/// Validated parameters for starting a round.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    size: GridSize,
    mode: Mode,
    rng_seed: u64,
    step_delay: Option<Duration>,
    starvation_limit: Option<u32>,
}

impl Config {
    /// Creates a configuration with the default timing and starvation
    /// ceiling for the given board size and steering mode.
    #[must_use]
    pub fn new(size: GridSize, mode: Mode, rng_seed: u64) -> Self {
        Self {
            size,
            mode,
            rng_seed,
            step_delay: None,
            starvation_limit: None,
        }
    }

    /// Overrides the step quantum implied by the steering mode.
    #[must_use]
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = Some(delay);
        self
    }

    /// Overrides the default starvation ceiling of `2·N³` moves.
    #[must_use]
    pub fn with_starvation_limit(mut self, limit: u32) -> Self {
        self.starvation_limit = Some(limit);
        self
    }
}

fn default_starvation_limit(size: GridSize) -> u32 {
    2 * size.get().pow(3)
}

fn default_step_delay(mode: Mode) -> Duration {
    match mode {
        Mode::Manual => MANUAL_STEP_DELAY,
        Mode::Autonomous => AUTONOMOUS_STEP_DELAY,
    }
}

/// Places a target on a uniformly chosen free cell.
///
/// Returns `None` when the snake covers the whole board.
fn spawn_target(snake: &Snake, rng: &mut ChaCha8Rng) -> Option<Cell> {
    let free = OccupancyGrid::from_snake(snake).free_cells();
    if free.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..free.len());
    Some(free[index])
}

/// Authoritative state of one game round.
///
/// The round is a state machine over [`Outcome`]: it starts in
/// `Playing` and, once any terminal verdict is reached, ignores every
/// further command.
#[derive(Debug)]
pub struct Round {
    size: GridSize,
    mode: Mode,
    snake: Snake,
    target: Option<Cell>,
    outcome: Outcome,
    rng: ChaCha8Rng,
    step_delay: Duration,
    accumulator: Duration,
    elapsed: Duration,
    score: u32,
    total_moves: u32,
    moves_without_eating: u32,
    moves_for_current_target: u32,
    moves_per_target: Vec<u32>,
    starvation_limit: u32,
}

impl Round {
    /// Starts a fresh round from a validated configuration.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        if config.size.get() < MIN_GRID_SIDE {
            return Err(ConfigError::GridTooSmall(config.size.get()));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let snake = Snake::spawn(config.size);
        let target = spawn_target(&snake, &mut rng);

        Ok(Self {
            size: config.size,
            mode: config.mode,
            snake,
            target,
            outcome: Outcome::Playing,
            rng,
            step_delay: config.step_delay.unwrap_or_else(|| default_step_delay(config.mode)),
            accumulator: Duration::ZERO,
            elapsed: Duration::ZERO,
            score: 0,
            total_moves: 0,
            moves_without_eating: 0,
            moves_for_current_target: 0,
            moves_per_target: Vec::new(),
            starvation_limit: config
                .starvation_limit
                .unwrap_or_else(|| default_starvation_limit(config.size)),
        })
    }

    /// Score at which the round is declared won.
    fn max_score(&self) -> u32 {
        self.size.cell_count() - INITIAL_SNAKE_LENGTH
    }
}

/// Executes a command against the round and records resulting events.
///
/// Commands addressed to a finished round are ignored, so late ticks or
/// steps queued by systems cannot disturb the terminal verdict.
pub fn apply(round: &mut Round, command: Command, out_events: &mut Vec<Event>) {
    if round.outcome != Outcome::Playing {
        return;
    }

    match command {
        Command::Tick { dt } => {
            round.accumulator += dt;
            round.elapsed += dt;
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::Step { heading } => step(round, heading, out_events),
    }
}

/// Performs one gated movement step: adopt the heading, advance the
/// body, then evaluate the verdict cascade in fixed order (win, death,
/// starvation, eat).
fn step(round: &mut Round, heading: Option<Direction>, out_events: &mut Vec<Event>) {
    if round.accumulator < round.step_delay {
        return;
    }
    round.accumulator -= round.step_delay;

    if let Some(heading) = heading {
        round.snake.set_heading(heading);
    }

    round.snake.advance();
    round.total_moves += 1;
    round.moves_without_eating += 1;
    round.moves_for_current_target += 1;
    out_events.push(Event::SnakeAdvanced {
        head: round.snake.head().cell,
    });

    if round.score == round.max_score() {
        round.outcome = Outcome::Win;
    } else if round.snake.hits_wall() || round.snake.collides_with_self() {
        round.outcome = Outcome::Dead;
    } else if round.moves_without_eating > round.starvation_limit {
        round.outcome = Outcome::Timeout;
    } else if round.target == Some(round.snake.head().cell) {
        eat(round, out_events);
    }

    if round.outcome != Outcome::Playing {
        out_events.push(Event::RoundEnded {
            outcome: round.outcome,
        });
    }
}

/// Consumes the target under the head: the score advances, the body
/// grows behind the tail, and a fresh target is placed on a free cell.
fn eat(round: &mut Round, out_events: &mut Vec<Event>) {
    let cell = round.snake.head().cell;
    out_events.push(Event::TargetEaten {
        cell,
        moves_taken: round.moves_for_current_target,
    });

    round.moves_per_target.push(round.moves_for_current_target);
    round.moves_without_eating = 0;
    round.moves_for_current_target = 0;
    round.score += 1;
    round.snake.grow();

    round.target = spawn_target(&round.snake, &mut round.rng);
    if let Some(cell) = round.target {
        out_events.push(Event::TargetSpawned { cell });
    }
}

/// Read-only views of the round for systems and adapters.
pub mod query {
    use std::time::Duration;

    use snake_pilot_core::{Cell, GridSize, Mode, Outcome};

    use crate::{OccupancyGrid, Round, Snake};

    /// Current verdict of the round.
    #[must_use]
    pub fn outcome(round: &Round) -> Outcome {
        round.outcome
    }

    /// Steering mode the round was started with.
    #[must_use]
    pub fn mode(round: &Round) -> Mode {
        round.mode
    }

    /// Side length of the playing field.
    #[must_use]
    pub fn grid_size(round: &Round) -> GridSize {
        round.size
    }

    /// Cell occupied by the current target, if one is placed.
    #[must_use]
    pub fn target(round: &Round) -> Option<Cell> {
        round.target
    }

    /// Whether enough time has accumulated for the next step.
    #[must_use]
    pub fn ready_for_step(round: &Round) -> bool {
        round.accumulator >= round.step_delay
    }

    /// Borrow of the live snake body.
    #[must_use]
    pub fn snake(round: &Round) -> &Snake {
        &round.snake
    }

    /// Cells covered by the snake, head first.
    #[must_use]
    pub fn occupied_cells(round: &Round) -> Vec<Cell> {
        round.snake.segments().map(|segment| segment.cell).collect()
    }

    /// Dense occupancy snapshot of the board.
    #[must_use]
    pub fn occupancy(round: &Round) -> OccupancyGrid {
        OccupancyGrid::from_snake(&round.snake)
    }

    /// Aggregated per-round statistics.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct RoundStats {
        /// Targets eaten so far.
        pub score: u32,
        /// Movement steps executed so far.
        pub total_moves: u32,
        /// Steps spent reaching each eaten target, in order.
        pub moves_per_target: Vec<u32>,
        /// Simulated time the round has been running.
        pub elapsed: Duration,
    }

    /// Snapshot of the round's score ledger and clock.
    #[must_use]
    pub fn stats(round: &Round) -> RoundStats {
        RoundStats {
            score: round.score,
            total_moves: round.total_moves,
            moves_per_target: round.moves_per_target.clone(),
            elapsed: round.elapsed,
        }
    }

    /// Everything the autopilot needs to choose the next heading.
    #[derive(Clone, Copy, Debug)]
    pub struct PilotView<'a> {
        /// Live snake body.
        pub snake: &'a Snake,
        /// Current target, absent only when the board is full.
        pub target: Option<Cell>,
        /// Side length of the playing field.
        pub size: GridSize,
        /// Targets eaten so far.
        pub score: u32,
        /// Score at which the round is won.
        pub max_score: u32,
        /// Steps taken since the last target was eaten.
        pub moves_without_eating: u32,
        /// Starvation ceiling for the round.
        pub starvation_limit: u32,
        /// Whether enough time has accumulated for the next step.
        pub ready_for_step: bool,
        /// Current verdict of the round.
        pub outcome: Outcome,
    }

    /// Assembles the autopilot's view of the round.
    #[must_use]
    pub fn pilot_view(round: &Round) -> PilotView<'_> {
        PilotView {
            snake: &round.snake,
            target: round.target,
            size: round.size,
            score: round.score,
            max_score: round.max_score(),
            moves_without_eating: round.moves_without_eating,
            starvation_limit: round.starvation_limit,
            ready_for_step: ready_for_step(round),
            outcome: round.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use snake_pilot_core::{Cell, Command, Direction, Event, GridSize, Mode, Outcome};

    use crate::scaffolding::RoundBuilder;
    use crate::{apply, query, Config, ConfigError, Round};

    fn autonomous_config(side: u32, seed: u64) -> Config {
        Config::new(GridSize::new(side), Mode::Autonomous, seed)
    }

    fn step(round: &mut Round, heading: Option<Direction>) -> Vec<Event> {
        let mut events = Vec::new();
        apply(round, Command::Tick { dt: crate::AUTONOMOUS_STEP_DELAY }, &mut events);
        apply(round, Command::Step { heading }, &mut events);
        events
    }

    #[test]
    fn rejects_boards_below_the_minimum_side() {
        let error = Round::new(autonomous_config(4, 7)).unwrap_err();
        assert_eq!(error, ConfigError::GridTooSmall(4));
    }

    #[test]
    fn fresh_round_spawns_snake_at_center_heading_left() {
        let round = Round::new(autonomous_config(17, 7)).expect("valid config");
        let snake = query::snake(&round);

        assert_eq!(snake.len(), 3);
        assert_eq!(snake.heading(), Direction::Left);
        assert_eq!(
            query::occupied_cells(&round),
            vec![Cell::new(8, 8), Cell::new(9, 8), Cell::new(10, 8)]
        );

        let target = query::target(&round).expect("fresh board has free cells");
        assert!(snake.is_free(target));
    }

    #[test]
    fn step_is_ignored_until_enough_time_accumulates() {
        let mut round = Round::new(autonomous_config(17, 7)).expect("valid config");
        let mut events = Vec::new();

        apply(&mut round, Command::Step { heading: None }, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::stats(&round).total_moves, 0);

        apply(
            &mut round,
            Command::Tick { dt: crate::AUTONOMOUS_STEP_DELAY },
            &mut events,
        );
        apply(&mut round, Command::Step { heading: None }, &mut events);
        assert_eq!(query::stats(&round).total_moves, 1);
        assert!(events.contains(&Event::SnakeAdvanced { head: Cell::new(7, 8) }));
    }

    #[test]
    fn manual_mode_uses_the_slower_step_quantum() {
        let config = Config::new(GridSize::new(17), Mode::Manual, 7);
        let mut round = Round::new(config).expect("valid config");
        let mut events = Vec::new();

        apply(
            &mut round,
            Command::Tick { dt: crate::AUTONOMOUS_STEP_DELAY },
            &mut events,
        );
        apply(&mut round, Command::Step { heading: None }, &mut events);
        assert_eq!(query::stats(&round).total_moves, 0);

        apply(
            &mut round,
            Command::Tick { dt: crate::MANUAL_STEP_DELAY },
            &mut events,
        );
        apply(&mut round, Command::Step { heading: None }, &mut events);
        assert_eq!(query::stats(&round).total_moves, 1);
    }

    #[test]
    fn reversal_request_keeps_the_previous_heading() {
        let mut round = Round::new(autonomous_config(17, 7)).expect("valid config");
        let _ = step(&mut round, Some(Direction::Right));

        assert_eq!(query::snake(&round).heading(), Direction::Left);
        assert_eq!(query::snake(&round).head().cell, Cell::new(7, 8));
    }

    #[test]
    fn eating_grows_scores_and_respawns_the_target() {
        let mut round = RoundBuilder::new(GridSize::new(8))
            .with_segments(vec![Cell::new(4, 4), Cell::new(5, 4), Cell::new(6, 4)])
            .with_target(Cell::new(2, 4))
            .build();

        let _ = step(&mut round, None);
        let events = step(&mut round, None);

        let stats = query::stats(&round);
        assert_eq!(stats.score, 1);
        assert_eq!(stats.moves_per_target, vec![2]);
        assert_eq!(query::snake(&round).len(), 4);
        assert_eq!(query::snake(&round).tail().cell, Cell::new(5, 4));
        assert_eq!(query::outcome(&round), Outcome::Playing);

        assert!(events.contains(&Event::TargetEaten {
            cell: Cell::new(2, 4),
            moves_taken: 2,
        }));
        let respawned = query::target(&round).expect("board has free cells");
        assert!(query::snake(&round).is_free(respawned));
    }

    #[test]
    fn running_past_the_boundary_ends_the_round_dead() {
        let mut round = RoundBuilder::new(GridSize::new(5))
            .with_segments(vec![Cell::new(0, 4), Cell::new(1, 4), Cell::new(2, 4)])
            .with_target(Cell::new(4, 0))
            .build();

        let events = step(&mut round, None);
        assert_eq!(query::outcome(&round), Outcome::Dead);
        assert!(events.contains(&Event::RoundEnded {
            outcome: Outcome::Dead
        }));

        // Terminal rounds ignore every further command.
        let events = step(&mut round, Some(Direction::Up));
        assert!(events.is_empty());
        assert_eq!(query::stats(&round).total_moves, 1);
    }

    #[test]
    fn biting_own_body_ends_the_round_dead() {
        // A 6-long body folded so that turning up runs into itself.
        let mut round = RoundBuilder::new(GridSize::new(8))
            .with_segments(vec![
                Cell::new(2, 3),
                Cell::new(2, 2),
                Cell::new(3, 2),
                Cell::new(4, 2),
                Cell::new(4, 3),
                Cell::new(4, 4),
            ])
            .with_target(Cell::new(0, 0))
            .build();

        let _ = step(&mut round, Some(Direction::Right));
        assert_eq!(query::snake(&round).head().cell, Cell::new(3, 3));
        let _ = step(&mut round, Some(Direction::Up));
        assert_eq!(query::outcome(&round), Outcome::Dead);
    }

    #[test]
    fn starvation_ceiling_ends_the_round_in_timeout() {
        let mut round = RoundBuilder::new(GridSize::new(17))
            .with_segments(vec![Cell::new(8, 8), Cell::new(9, 8), Cell::new(10, 8)])
            .with_target(Cell::new(0, 0))
            .with_starvation_limit(3)
            .build();

        for _ in 0..3 {
            let _ = step(&mut round, None);
            assert_eq!(query::outcome(&round), Outcome::Playing);
        }

        let events = step(&mut round, None);
        assert_eq!(query::outcome(&round), Outcome::Timeout);
        assert!(events.contains(&Event::RoundEnded {
            outcome: Outcome::Timeout
        }));
    }

    #[test]
    fn final_eat_wins_on_the_following_step() {
        // Hamiltonian 24-segment body on a 5x5 board with one free cell
        // left at the origin, directly above the head.
        let mut round = RoundBuilder::new(GridSize::new(5))
            .with_segments(vec![
                Cell::new(0, 1),
                Cell::new(0, 2),
                Cell::new(0, 3),
                Cell::new(0, 4),
                Cell::new(1, 4),
                Cell::new(1, 3),
                Cell::new(1, 2),
                Cell::new(1, 1),
                Cell::new(1, 0),
                Cell::new(2, 0),
                Cell::new(2, 1),
                Cell::new(2, 2),
                Cell::new(2, 3),
                Cell::new(2, 4),
                Cell::new(3, 4),
                Cell::new(3, 3),
                Cell::new(3, 2),
                Cell::new(3, 1),
                Cell::new(3, 0),
                Cell::new(4, 0),
                Cell::new(4, 1),
                Cell::new(4, 2),
                Cell::new(4, 3),
                Cell::new(4, 4),
            ])
            .with_target(Cell::new(0, 0))
            .build();

        let events = step(&mut round, Some(Direction::Up));
        assert_eq!(query::stats(&round).score, 22);
        assert_eq!(query::outcome(&round), Outcome::Playing);
        assert!(events.contains(&Event::TargetEaten {
            cell: Cell::new(0, 0),
            moves_taken: 1,
        }));
        assert_eq!(query::target(&round), None);

        let events = step(&mut round, None);
        assert_eq!(query::outcome(&round), Outcome::Win);
        assert!(events.contains(&Event::RoundEnded {
            outcome: Outcome::Win
        }));
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let mut first = Round::new(autonomous_config(9, 42)).expect("valid config");
        let mut second = Round::new(autonomous_config(9, 42)).expect("valid config");

        let headings = [
            Some(Direction::Up),
            None,
            Some(Direction::Left),
            Some(Direction::Down),
            None,
        ];

        for heading in headings {
            let first_events = step(&mut first, heading);
            let second_events = step(&mut second, heading);
            assert_eq!(first_events, second_events);
        }

        assert_eq!(query::stats(&first), query::stats(&second));
        assert_eq!(query::occupied_cells(&first), query::occupied_cells(&second));
        assert_eq!(query::target(&first), query::target(&second));
    }
}
