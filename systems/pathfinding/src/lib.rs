#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first pathfinding over the playing field.
//!
//! The search is a pure function of the board geometry and a caller
//! supplied passability predicate, so it serves both the live round
//! and the autopilot's virtual snakes without knowing about either.

use std::collections::VecDeque;

use snake_pilot_core::{Cell, GridSize};

/// Finds a shortest path from `start` to `goal` over free cells.
///
/// The returned path excludes `start` and ends with `goal`; an empty
/// vector means `goal` is unreachable (which includes `goal == start`
/// and a `goal` that the predicate rejects). `start` itself is never
/// tested against the predicate, so a search may begin on an occupied
/// cell such as the snake's head.
///
/// Neighbors are expanded in the canonical `+x, -x, +y, -y` order, so
/// among equally short paths the result is deterministic.
pub fn shortest_path<F>(size: GridSize, start: Cell, goal: Cell, is_free: F) -> Vec<Cell>
where
    F: Fn(Cell) -> bool,
{
    let cell_count = match usize::try_from(size.cell_count()) {
        Ok(count) => count,
        Err(_) => return Vec::new(),
    };
    let start_index = match start.index(size) {
        Some(index) => index,
        None => return Vec::new(),
    };
    if goal.index(size).is_none() {
        return Vec::new();
    }

    let mut visited = vec![false; cell_count];
    let mut prev: Vec<Option<Cell>> = vec![None; cell_count];
    visited[start_index] = true;

    let mut queue = VecDeque::new();
    queue.push_back(start);

    'search: while let Some(node) = queue.pop_front() {
        for neighbor in node.neighbors(size) {
            let index = match neighbor.index(size) {
                Some(index) => index,
                None => continue,
            };
            if visited[index] || !is_free(neighbor) {
                continue;
            }

            visited[index] = true;
            prev[index] = Some(node);
            if neighbor == goal {
                break 'search;
            }
            queue.push_back(neighbor);
        }
    }

    reconstruct(size, start, goal, &prev)
}

/// Walks the predecessor chain back from the goal, yielding the path
/// in forward order.
fn reconstruct(size: GridSize, start: Cell, goal: Cell, prev: &[Option<Cell>]) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut node = goal;

    loop {
        let index = match node.index(size) {
            Some(index) => index,
            None => return Vec::new(),
        };
        node = match prev[index] {
            Some(parent) => parent,
            None => return Vec::new(),
        };
        if node == start {
            path.reverse();
            return path;
        }
        path.push(node);
    }
}
