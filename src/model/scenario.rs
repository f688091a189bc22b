// src/model/scenario.rs

use crate::config::SimConfig;
use crate::error::GridError;
use crate::model::{CellKind, Grid, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

/// A freshly generated world: grid, agent start and task cells.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub grid: Grid,
    pub agent: Position,
    pub tasks: Vec<Position>,
}

pub const AGENT_START: Position = Position::new(0, 0);

/// Builds a random scenario. The same seed always yields the same world.
pub fn generate(config: &SimConfig) -> Result<Scenario, GridError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut grid = Grid::new(config.rows, config.cols);
    grid.place_agent(AGENT_START)?;

    let mut tasks = Vec::with_capacity(config.num_tasks);
    for _ in 0..config.num_tasks {
        let free = free_cells(&grid);
        let Some(&pos) = free.choose(&mut rng) else {
            break;
        };
        grid.place_task(pos)?;
        tasks.push(pos);
    }

    let free = free_cells(&grid);
    let count = config.num_obstacles.min(free.len().saturating_sub(1));
    for &pos in free.choose_multiple(&mut rng, count) {
        grid.place_obstacle(pos)?;
    }

    debug!(
        rows = config.rows,
        cols = config.cols,
        tasks = tasks.len(),
        obstacles = count,
        "generated scenario"
    );

    Ok(Scenario {
        grid,
        agent: AGENT_START,
        tasks,
    })
}

fn free_cells(grid: &Grid) -> Vec<Position> {
    grid.positions()
        .filter(|&pos| grid.kind(pos) == Some(CellKind::Empty))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> SimConfig {
        SimConfig {
            rows: 6,
            cols: 8,
            num_tasks: 4,
            num_obstacles: 10,
            seed: Some(seed),
            ..SimConfig::default()
        }
    }

    #[test]
    fn same_seed_same_world() {
        let a = generate(&config(42)).expect("scenario");
        let b = generate(&config(42)).expect("scenario");
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.tasks, b.tasks);
    }

    #[test]
    fn counts_and_exclusions_hold() {
        let s = generate(&config(7)).expect("scenario");
        assert_eq!(s.grid.agent_position(), Some(s.agent));
        assert_eq!(s.agent, AGENT_START);
        assert_eq!(s.tasks.len(), 4);
        for task in &s.tasks {
            assert_eq!(s.grid.kind(*task), Some(CellKind::Task));
        }
        let obstacles = s
            .grid
            .positions()
            .filter(|&p| s.grid.kind(p) == Some(CellKind::Obstacle))
            .count();
        assert_eq!(obstacles, 10);
    }

    #[test]
    fn obstacle_count_is_clamped() {
        let cfg = SimConfig {
            rows: 2,
            cols: 2,
            num_tasks: 1,
            num_obstacles: 50,
            seed: Some(1),
            ..SimConfig::default()
        };
        let s = generate(&cfg).expect("scenario");
        let free = free_cells(&s.grid);
        assert_eq!(free.len(), 1);
    }
}
