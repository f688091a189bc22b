// src/model/mod.rs

use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod scenario;

/// A cell address, `(row, col)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Sum of absolute row and column differences.
    pub fn manhattan(self, other: Position) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn step(self, mv: Move) -> Position {
        let (dr, dc) = mv.delta();
        Position::new(self.row + dr, self.col + dc)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Position::new(row, col)
    }
}

/// One unit step on the 4-connected grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Neighbour exploration order used by the search.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// `(d_row, d_col)` for this move.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Move::Up => (-1, 0),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
            Move::Right => (0, 1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Move::Up => "UP",
            Move::Down => "DOWN",
            Move::Left => "LEFT",
            Move::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase();
        Move::ALL
            .into_iter()
            .find(|mv| mv.name() == name)
            .ok_or_else(|| format!("unknown move: {s}"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellKind {
    #[default]
    Empty,
    Obstacle,
    Agent,
    Task,
}

impl CellKind {
    fn symbol(self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::Obstacle => '#',
            CellKind::Agent => 'A',
            CellKind::Task => 'T',
        }
    }

    fn from_symbol(c: char) -> Option<Self> {
        match c {
            '.' => Some(CellKind::Empty),
            '#' => Some(CellKind::Obstacle),
            'A' => Some(CellKind::Agent),
            'T' => Some(CellKind::Task),
            _ => None,
        }
    }
}

/// Fixed-size occupancy grid. Holds at most one `Agent` cell.
///
/// Agent and Task cells are only written through [`Grid::place_agent`],
/// [`Grid::place_task`] and [`Grid::move_agent`]; the obstacle editing
/// methods refuse to touch them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
    agent: Option<Position>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![CellKind::Empty; rows * cols],
            agent: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.rows
            && (pos.col as usize) < self.cols
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.row as usize * self.cols + pos.col as usize)
    }

    /// Cell kind at `pos`, `None` when out of bounds.
    pub fn kind(&self, pos: Position) -> Option<CellKind> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Whether an agent may occupy `pos`. The agent's own cell counts only
    /// when `agent_passable` is set.
    pub fn is_walkable(&self, pos: Position, agent_passable: bool) -> bool {
        match self.kind(pos) {
            None | Some(CellKind::Obstacle) => false,
            Some(CellKind::Agent) => agent_passable,
            Some(CellKind::Empty) | Some(CellKind::Task) => true,
        }
    }

    pub fn agent_position(&self) -> Option<Position> {
        self.agent
    }

    /// All Task cells in row-major order.
    pub fn tasks(&self) -> Vec<Position> {
        self.positions()
            .filter(|&pos| self.kind(pos) == Some(CellKind::Task))
            .collect()
    }

    /// Every in-bounds position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| Position::new(r as i32, c as i32)))
    }

    fn expect_kind(&self, pos: Position, expected: CellKind, label: &'static str) -> Result<usize, GridError> {
        let idx = self.index(pos).ok_or(GridError::OutOfBounds(pos))?;
        let kind = self.cells[idx];
        if kind != expected {
            return Err(GridError::Occupied {
                pos,
                kind,
                expected: label,
            });
        }
        Ok(idx)
    }

    pub fn place_agent(&mut self, pos: Position) -> Result<(), GridError> {
        if let Some(existing) = self.agent {
            return Err(GridError::AgentAlreadyPlaced(existing));
        }
        let idx = self.expect_kind(pos, CellKind::Empty, "empty cell")?;
        self.cells[idx] = CellKind::Agent;
        self.agent = Some(pos);
        Ok(())
    }

    pub fn place_task(&mut self, pos: Position) -> Result<(), GridError> {
        let idx = self.expect_kind(pos, CellKind::Empty, "empty cell")?;
        self.cells[idx] = CellKind::Task;
        Ok(())
    }

    /// Moves the agent onto `to`. A Task at the destination is consumed and
    /// its position returned.
    pub fn move_agent(&mut self, to: Position) -> Result<Option<Position>, GridError> {
        let from = self.agent.ok_or(GridError::NoAgent)?;
        let to_idx = self.index(to).ok_or(GridError::OutOfBounds(to))?;
        let collected = match self.cells[to_idx] {
            CellKind::Task => Some(to),
            CellKind::Empty | CellKind::Agent => None,
            kind @ CellKind::Obstacle => {
                return Err(GridError::Occupied {
                    pos: to,
                    kind,
                    expected: "walkable cell",
                });
            }
        };
        if let Some(from_idx) = self.index(from) {
            self.cells[from_idx] = CellKind::Empty;
        }
        self.cells[to_idx] = CellKind::Agent;
        self.agent = Some(to);
        Ok(collected)
    }

    pub fn place_obstacle(&mut self, pos: Position) -> Result<(), GridError> {
        let idx = self.expect_kind(pos, CellKind::Empty, "empty cell")?;
        self.cells[idx] = CellKind::Obstacle;
        Ok(())
    }

    pub fn clear_obstacle(&mut self, pos: Position) -> Result<(), GridError> {
        let idx = self.expect_kind(pos, CellKind::Obstacle, "obstacle")?;
        self.cells[idx] = CellKind::Empty;
        Ok(())
    }

    /// Flips Empty <-> Obstacle and returns the new kind.
    pub fn toggle_obstacle(&mut self, pos: Position) -> Result<CellKind, GridError> {
        match self.kind(pos) {
            None => Err(GridError::OutOfBounds(pos)),
            Some(CellKind::Obstacle) => self.clear_obstacle(pos).map(|_| CellKind::Empty),
            Some(_) => self.place_obstacle(pos).map(|_| CellKind::Obstacle),
        }
    }

    /// Moves an obstacle from `from` onto the Empty cell `to`.
    pub fn drag_obstacle(&mut self, from: Position, to: Position) -> Result<(), GridError> {
        self.expect_kind(from, CellKind::Obstacle, "obstacle")?;
        self.place_obstacle(to)?;
        self.clear_obstacle(from)
    }
}

impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let cols = lines.first().map(|l| l.chars().count()).unwrap_or(0);
        let mut grid = Grid::new(lines.len(), cols);

        for (r, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(GridError::Parse {
                    line: r + 1,
                    reason: format!("expected {cols} cells"),
                });
            }
            for (c, ch) in line.chars().enumerate() {
                let pos = Position::new(r as i32, c as i32);
                let kind = CellKind::from_symbol(ch).ok_or_else(|| GridError::Parse {
                    line: r + 1,
                    reason: format!("unknown cell symbol {ch:?}"),
                })?;
                match kind {
                    CellKind::Empty => {}
                    CellKind::Obstacle => grid.place_obstacle(pos)?,
                    CellKind::Agent => grid.place_agent(pos)?,
                    CellKind::Task => grid.place_task(pos)?,
                }
            }
        }
        Ok(grid)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            let line: String = self.cells[r * self.cols..(r + 1) * self.cols]
                .iter()
                .map(|kind| kind.symbol())
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
