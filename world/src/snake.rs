//! Snake body state: segments, the delayed-turn queue, and growth.

use std::collections::{HashMap, VecDeque};

use snake_pilot_core::{Cell, Direction, GridSize};

use crate::INITIAL_SNAKE_LENGTH;

/// Single body segment together with the direction it last moved in.
///
/// The per-segment heading is what makes delayed turns work: a segment
/// keeps moving along its own heading until it reaches a cell where a
/// turn was recorded, and it is also what determines where a freshly
/// grown tail segment appears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Cell currently occupied by the segment.
    pub cell: Cell,
    /// Direction the segment last moved in.
    pub heading: Direction,
}

/// Ordered snake body, head first.
///
/// Invariants: at least [`INITIAL_SNAKE_LENGTH`] segments, all cells
/// distinct while the round is alive. Cloning yields a fully
/// independent copy, which is how the autopilot builds its virtual
/// snakes.
#[derive(Clone, Debug)]
pub struct Snake {
    size: GridSize,
    segments: VecDeque<Segment>,
    heading: Direction,
    turns: HashMap<Cell, Direction>,
}

impl Snake {
    /// Spawns the starting body: head at the board center, the rest of
    /// the body extending toward +x, everything heading left.
    pub(crate) fn spawn(size: GridSize) -> Self {
        let center = (size.get() / 2) as i32;
        let mut segments = VecDeque::with_capacity(INITIAL_SNAKE_LENGTH as usize);
        for offset in 0..INITIAL_SNAKE_LENGTH as i32 {
            segments.push_back(Segment {
                cell: Cell::new(center + offset, center),
                heading: Direction::Left,
            });
        }

        Self {
            size,
            segments,
            heading: Direction::Left,
            turns: HashMap::new(),
        }
    }

    /// Assembles a snake from explicit parts. Used by the scaffolding
    /// builder to craft mid-round states.
    #[cfg(any(test, feature = "round_scaffolding"))]
    pub(crate) fn from_parts(
        size: GridSize,
        segments: VecDeque<Segment>,
        heading: Direction,
        turns: HashMap<Cell, Direction>,
    ) -> Self {
        Self {
            size,
            segments,
            heading,
            turns,
        }
    }

    /// Side length of the board the snake lives on.
    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// The head segment.
    #[must_use]
    pub fn head(&self) -> Segment {
        self.segments[0]
    }

    /// The tail segment.
    #[must_use]
    pub fn tail(&self) -> Segment {
        self.segments[self.segments.len() - 1]
    }

    /// Number of segments in the body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a snake never has fewer than three segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The heading the head will move in on the next advance.
    #[must_use]
    pub fn heading(&self) -> Direction {
        self.heading
    }

    /// Iterator over the segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Adopts a new heading for the head and records it in the turn
    /// queue at the head's current cell so trailing segments turn in
    /// the same place later.
    ///
    /// A direct 180° reversal is silently ignored, preserving the
    /// previous heading.
    pub fn set_heading(&mut self, heading: Direction) {
        if heading == self.heading.opposite() {
            return;
        }

        self.heading = heading;
        let _ = self.turns.insert(self.head().cell, heading);
    }

    /// Moves every segment one cell along its own heading, applying
    /// pending turn-queue entries.
    ///
    /// A segment whose cell carries a queued direction adopts it for
    /// this step; when the tail consumes an entry it is removed, which
    /// is what makes turns propagate down the body one segment-cell at
    /// a time instead of instantly.
    pub fn advance(&mut self) {
        let last = self.segments.len() - 1;
        for index in 0..=last {
            let cell = self.segments[index].cell;
            if let Some(turn) = self.turns.get(&cell).copied() {
                self.segments[index].heading = turn;
                if index == last {
                    let _ = self.turns.remove(&cell);
                }
            }

            let heading = self.segments[index].heading;
            self.segments[index].cell = cell.step(heading);
        }
    }

    /// Appends a new tail segment one cell behind the old tail,
    /// computed by reflecting the old tail's heading.
    pub fn grow(&mut self) {
        if let Some(tail) = self.segments.back().copied() {
            self.segments.push_back(Segment {
                cell: tail.cell.step(tail.heading.opposite()),
                heading: tail.heading,
            });
        }
    }

    /// True when the head occupies the same cell as another segment.
    #[must_use]
    pub fn collides_with_self(&self) -> bool {
        let head = self.head().cell;
        self.segments.iter().skip(1).any(|segment| segment.cell == head)
    }

    /// True when the head has left the playing field.
    #[must_use]
    pub fn hits_wall(&self) -> bool {
        !self.head().cell.in_bounds(self.size)
    }

    /// True when the cell is on the board and not occupied by any
    /// segment.
    #[must_use]
    pub fn is_free(&self, cell: Cell) -> bool {
        cell.in_bounds(self.size) && !self.segments.iter().any(|segment| segment.cell == cell)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};

    use snake_pilot_core::{Cell, Direction, GridSize};

    use super::{Segment, Snake};

    fn straight_snake(cells: &[Cell]) -> Snake {
        let segments = cells
            .iter()
            .map(|&cell| Segment {
                cell,
                heading: Direction::Left,
            })
            .collect::<VecDeque<_>>();
        Snake::from_parts(GridSize::new(9), segments, Direction::Left, HashMap::new())
    }

    #[test]
    fn followers_turn_only_at_the_recorded_cell() {
        let mut snake = straight_snake(&[
            Cell::new(4, 4),
            Cell::new(5, 4),
            Cell::new(6, 4),
            Cell::new(7, 4),
        ]);

        snake.set_heading(Direction::Up);
        let positions = |snake: &Snake| -> Vec<Cell> {
            snake.segments().map(|segment| segment.cell).collect()
        };

        snake.advance();
        assert_eq!(
            positions(&snake),
            vec![
                Cell::new(4, 3),
                Cell::new(4, 4),
                Cell::new(5, 4),
                Cell::new(6, 4),
            ]
        );

        snake.advance();
        assert_eq!(
            positions(&snake),
            vec![
                Cell::new(4, 2),
                Cell::new(4, 3),
                Cell::new(4, 4),
                Cell::new(5, 4),
            ]
        );

        snake.advance();
        snake.advance();
        // The tail has now consumed the turn entry.
        assert_eq!(
            positions(&snake),
            vec![
                Cell::new(4, 0),
                Cell::new(4, 1),
                Cell::new(4, 2),
                Cell::new(4, 3),
            ]
        );
        assert!(snake.turns.is_empty());
    }

    #[test]
    fn reversal_is_rejected_without_recording_a_turn() {
        let mut snake = straight_snake(&[Cell::new(4, 4), Cell::new(5, 4), Cell::new(6, 4)]);

        snake.set_heading(Direction::Right);
        assert_eq!(snake.heading(), Direction::Left);
        assert!(snake.turns.is_empty());
    }

    #[test]
    fn grow_places_the_new_tail_behind_the_old_one() {
        let mut snake = straight_snake(&[Cell::new(4, 4), Cell::new(5, 4), Cell::new(6, 4)]);

        snake.grow();
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.tail().cell, Cell::new(7, 4));
        assert_eq!(snake.tail().heading, Direction::Left);
    }

    #[test]
    fn clones_are_fully_independent() {
        let original = straight_snake(&[Cell::new(4, 4), Cell::new(5, 4), Cell::new(6, 4)]);
        let mut clone = original.clone();

        clone.set_heading(Direction::Up);
        clone.advance();
        clone.grow();

        assert_eq!(original.head().cell, Cell::new(4, 4));
        assert_eq!(original.len(), 3);
        assert_eq!(original.heading(), Direction::Left);
    }
}
