// src/protocol/replanner.rs

use crate::model::{CellKind, Grid, Position};
use crate::protocol::search::find_path;
use crate::protocol::{Path, SearchOutcome};

/// True when any cell the path visits now holds an obstacle.
pub fn is_path_blocked(cells: &[Position], grid: &Grid) -> bool {
    cells
        .iter()
        .any(|&pos| grid.kind(pos) == Some(CellKind::Obstacle))
}

/// Validates `path` from `agent` against the live grid. Returns `None` while
/// it is still clear, otherwise a fresh search toward `goal`.
pub fn revalidate(grid: &Grid, agent: Position, path: &Path, goal: Position) -> Option<SearchOutcome> {
    if path.is_empty() || !is_path_blocked(&path.cells(agent), grid) {
        return None;
    }
    Some(find_path(grid, agent, goal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Move;

    fn grid(layout: &str) -> Grid {
        layout.parse().expect("grid layout")
    }

    #[test]
    fn clear_path_needs_no_replan() {
        let g = grid("A..T");
        let path = Path::from(vec![Move::Right, Move::Right, Move::Right]);
        assert!(revalidate(&g, Position::new(0, 0), &path, Position::new(0, 3)).is_none());
    }

    #[test]
    fn blocked_path_is_replanned() {
        let g = grid(
            "A#.T\n\
             ....",
        );
        let path = Path::from(vec![Move::Right, Move::Right, Move::Right]);
        let outcome = revalidate(&g, Position::new(0, 0), &path, Position::new(0, 3))
            .expect("path should be invalid");
        let fresh = outcome.into_path();
        assert_eq!(fresh.len(), 5);
        assert!(!is_path_blocked(&fresh.cells(Position::new(0, 0)), &g));
    }

    #[test]
    fn sealed_goal_reports_unreachable() {
        let g = grid("A#T");
        let path = Path::from(vec![Move::Right, Move::Right]);
        let outcome = revalidate(&g, Position::new(0, 0), &path, Position::new(0, 2));
        assert_eq!(outcome, Some(SearchOutcome::Unreachable));
    }

    #[test]
    fn out_of_bounds_cells_do_not_count_as_blocked() {
        let g = grid("A.");
        assert!(!is_path_blocked(&[Position::new(0, 0), Position::new(0, 5)], &g));
    }
}
