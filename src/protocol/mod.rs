// src/protocol/mod.rs

use crate::model::{Move, Position};
use serde::Serialize;
use std::collections::VecDeque;

pub mod replanner;
pub mod search;
pub mod sequencer;

/// Ordered moves still to be applied by the agent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Path {
    moves: VecDeque<Move>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn pop_front(&mut self) -> Option<Move> {
        self.moves.pop_front()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.moves.iter().copied()
    }

    /// `start` followed by every position reached along the path.
    pub fn cells(&self, start: Position) -> Vec<Position> {
        let mut cells = Vec::with_capacity(self.moves.len() + 1);
        let mut at = start;
        cells.push(at);
        for mv in &self.moves {
            at = at.step(*mv);
            cells.push(at);
        }
        cells
    }

    /// Final position after applying every move from `start`.
    pub fn destination(&self, start: Position) -> Position {
        self.moves.iter().fold(start, |at, mv| at.step(*mv))
    }
}

impl From<Vec<Move>> for Path {
    fn from(moves: Vec<Move>) -> Self {
        Self {
            moves: moves.into(),
        }
    }
}

impl FromIterator<Move> for Path {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Self {
            moves: iter.into_iter().collect(),
        }
    }
}

/// Result of a grid search. "Already there" and "no route" are distinct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    AtGoal,
    Found(Path),
    Unreachable,
}

impl SearchOutcome {
    /// Collapses to a plain move list; both `AtGoal` and `Unreachable` are empty.
    pub fn into_path(self) -> Path {
        match self {
            SearchOutcome::Found(path) => path,
            SearchOutcome::AtGoal | SearchOutcome::Unreachable => Path::new(),
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, SearchOutcome::Unreachable)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NavState {
    /// No target has been planned yet.
    Idle,
    Navigating,
    /// The outstanding path crossed an obstacle and was recomputed this step.
    Replanning,
    /// A task was found unreachable this step and skipped.
    Blocked,
    Complete,
}

/// What a single controller step did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub moved: Option<Move>,
    pub collected: Option<Position>,
    pub replanned: bool,
    pub skipped: Vec<Position>,
    pub state: NavState,
}
