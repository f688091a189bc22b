// src/protocol/search.rs

use crate::model::{Grid, Move, Position};
use crate::protocol::{Path, SearchOutcome};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use tracing::trace;

/// Frontier entry. Ordered so the max-heap yields the lowest `f`, then the
/// earliest `seq`.
struct Frontier {
    f: u32,
    seq: u64,
    pos: Position,
    moves: Vec<Move>,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A* over the 4-connected grid with unit move cost and Manhattan heuristic.
///
/// The start cell is always passable so the agent can leave it. Neighbours
/// are explored in [`Move::ALL`] order and equal-priority entries pop in
/// insertion order, so identical inputs give identical paths.
pub fn find_path(grid: &Grid, start: Position, goal: Position) -> SearchOutcome {
    if start == goal {
        return SearchOutcome::AtGoal;
    }
    let walkable = |pos: Position| pos == start || grid.is_walkable(pos, true);
    if !grid.in_bounds(start) || !walkable(goal) {
        return SearchOutcome::Unreachable;
    }

    let mut seq = 0u64;
    let mut open = BinaryHeap::new();
    let mut seen = HashSet::from([start]);
    open.push(Frontier {
        f: start.manhattan(goal),
        seq,
        pos: start,
        moves: Vec::new(),
    });

    while let Some(Frontier { pos, moves, .. }) = open.pop() {
        if pos == goal {
            trace!(%start, %goal, moves = moves.len(), expanded = seen.len(), "path found");
            return SearchOutcome::Found(Path::from(moves));
        }
        for mv in Move::ALL {
            let next = pos.step(mv);
            if seen.contains(&next) || !walkable(next) {
                continue;
            }
            seen.insert(next);
            let mut next_moves = moves.clone();
            next_moves.push(mv);
            seq += 1;
            open.push(Frontier {
                f: next_moves.len() as u32 + next.manhattan(goal),
                seq,
                pos: next,
                moves: next_moves,
            });
        }
    }

    trace!(%start, %goal, expanded = seen.len(), "frontier exhausted");
    SearchOutcome::Unreachable
}
