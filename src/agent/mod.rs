// src/agent/mod.rs

use crate::error::GridError;
use crate::memory::{InMemoryLog, Memory, MissionEvent};
use crate::model::{Grid, Move, Position};
use crate::protocol::replanner::revalidate;
use crate::protocol::search::find_path;
use crate::protocol::sequencer::TaskSequencer;
use crate::protocol::{NavState, Path, SearchOutcome, StepOutcome};
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

/// A step-driven mission runner.
pub trait Agent {
    /// Advances the mission by at most one move.
    fn step(&mut self, grid: &mut Grid) -> StepOutcome;
    fn is_complete(&self) -> bool;
    fn summary(&self) -> String;
}

/// Owns the pending move queue for one mission and keeps it valid against
/// the live grid.
///
/// Each [`Agent::step`] first makes sure the outstanding path is still clear
/// (replanning or skipping the current task if not), then applies one move.
/// Tasks are visited in the fixed `order`; a task with no path is skipped
/// and never retried.
#[derive(Debug, Clone)]
pub struct Navigator {
    order: Vec<Position>,
    index: usize,
    path: Path,
    completed: BTreeSet<Position>,
    skipped: Vec<Position>,
    state: NavState,
    steps: usize,
    log: InMemoryLog,
}

impl Navigator {
    pub fn new(order: Vec<Position>) -> Self {
        Self {
            order,
            index: 0,
            path: Path::new(),
            completed: BTreeSet::new(),
            skipped: Vec::new(),
            state: NavState::Idle,
            steps: 0,
            log: InMemoryLog::new(),
        }
    }

    /// Orders the grid's current tasks with `sequencer` and builds a navigator
    /// for them.
    pub fn for_grid(grid: &Grid, sequencer: &TaskSequencer) -> Result<Self, GridError> {
        let agent = grid.agent_position().ok_or(GridError::NoAgent)?;
        let order = sequencer.sequence(agent, &grid.tasks());
        Ok(Self::new(order))
    }

    pub fn order(&self) -> &[Position] {
        &self.order
    }

    pub fn target(&self) -> Option<Position> {
        self.order.get(self.index).copied()
    }

    pub fn target_index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The agent's cell followed by every cell of the outstanding path.
    pub fn path_cells(&self, grid: &Grid) -> Vec<Position> {
        match grid.agent_position() {
            Some(agent) if !self.path.is_empty() => self.path.cells(agent),
            _ => Vec::new(),
        }
    }

    pub fn completed(&self) -> &BTreeSet<Position> {
        &self.completed
    }

    /// Tasks given up as unreachable and not collected since.
    pub fn skipped(&self) -> &[Position] {
        &self.skipped
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Moves actually applied so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn log(&self) -> &InMemoryLog {
        &self.log
    }

    /// Plans toward the next task that is neither completed nor skipped,
    /// skipping unreachable ones. Finishes the mission when the order runs out.
    fn refill(&mut self, grid: &Grid, agent: Position, outcome: &mut StepOutcome) {
        self.path.clear();
        while let Some(target) = self.target() {
            if self.completed.contains(&target) {
                self.index += 1;
                continue;
            }
            match find_path(grid, agent, target) {
                SearchOutcome::Found(path) => {
                    debug!(%target, moves = path.len(), "planned path");
                    self.log.record(MissionEvent::Planned {
                        target,
                        moves: path.len(),
                    });
                    self.path = path;
                    return;
                }
                SearchOutcome::AtGoal => {
                    self.completed.insert(target);
                    self.index += 1;
                }
                SearchOutcome::Unreachable => self.skip(target, outcome),
            }
        }
        self.finish();
    }

    fn skip(&mut self, target: Position, outcome: &mut StepOutcome) {
        warn!(%target, "no path to task, skipping");
        self.log.record(MissionEvent::Skipped { target });
        self.skipped.push(target);
        outcome.skipped.push(target);
        self.index += 1;
    }

    fn finish(&mut self) {
        if self.state == NavState::Complete {
            return;
        }
        self.state = NavState::Complete;
        self.path.clear();
        info!(
            collected = self.completed.len(),
            skipped = self.skipped.len(),
            steps = self.steps,
            "mission complete"
        );
        self.log.record(MissionEvent::Completed {
            collected: self.completed.len(),
            skipped: self.skipped.len(),
        });
    }

    /// Replaces a path that now crosses an obstacle.
    fn ensure_valid(&mut self, grid: &Grid, agent: Position, outcome: &mut StepOutcome) {
        let Some(target) = self.target() else {
            return;
        };
        match revalidate(grid, agent, &self.path, target) {
            None => {}
            Some(SearchOutcome::Found(path)) => {
                info!(%target, moves = path.len(), "path blocked, replanned");
                self.log.record(MissionEvent::Replanned {
                    target,
                    moves: path.len(),
                });
                outcome.replanned = true;
                self.path = path;
            }
            Some(SearchOutcome::AtGoal) => {
                self.completed.insert(target);
                self.index += 1;
                self.refill(grid, agent, outcome);
            }
            Some(SearchOutcome::Unreachable) => {
                self.skip(target, outcome);
                self.refill(grid, agent, outcome);
            }
        }
    }

    /// Applies `mv` if its destination is walkable at this moment.
    fn apply(&mut self, grid: &mut Grid, agent: Position, mv: Move, outcome: &mut StepOutcome) {
        let dest = agent.step(mv);
        if !grid.is_walkable(dest, true) {
            warn!(at = %agent, %mv, "move refused, destination not walkable");
            self.log.record(MissionEvent::Refused { at: agent, mv });
            self.path.clear();
            return;
        }

        match grid.move_agent(dest) {
            Ok(collected) => {
                self.steps += 1;
                outcome.moved = Some(mv);
                self.log.record(MissionEvent::Moved {
                    from: agent,
                    to: dest,
                    mv,
                });
                if let Some(task) = collected {
                    info!(%task, "task collected");
                    self.completed.insert(task);
                    self.skipped.retain(|&t| t != task);
                    self.log.record(MissionEvent::Collected { task });
                    outcome.collected = Some(task);
                }
            }
            Err(err) => {
                error!(%err, "grid rejected agent move");
                self.log.record(MissionEvent::Refused { at: agent, mv });
                self.path.clear();
            }
        }
    }
}

impl Agent for Navigator {
    fn step(&mut self, grid: &mut Grid) -> StepOutcome {
        let mut outcome = StepOutcome {
            moved: None,
            collected: None,
            replanned: false,
            skipped: Vec::new(),
            state: self.state,
        };
        if self.state == NavState::Complete {
            return outcome;
        }
        let Some(agent) = grid.agent_position() else {
            debug_assert!(false, "step called on a grid without an agent");
            error!("grid has no agent, step ignored");
            return outcome;
        };

        if self.path.is_empty() {
            self.refill(grid, agent, &mut outcome);
        } else {
            self.ensure_valid(grid, agent, &mut outcome);
        }

        if let Some(mv) = self.path.pop_front() {
            self.apply(grid, agent, mv, &mut outcome);
            if self.path.is_empty() {
                let here = grid.agent_position().unwrap_or(agent);
                self.refill(grid, here, &mut outcome);
            }
        }

        if self.state != NavState::Complete {
            self.state = if !outcome.skipped.is_empty() {
                NavState::Blocked
            } else if outcome.replanned {
                NavState::Replanning
            } else {
                NavState::Navigating
            };
        }
        outcome.state = self.state;
        outcome
    }

    fn is_complete(&self) -> bool {
        self.state == NavState::Complete
    }

    fn summary(&self) -> String {
        format!(
            "Waypoints: {}/{} | Skipped: {} | Steps: {} | State: {:?}",
            self.completed.len(),
            self.order.len(),
            self.skipped.len(),
            self.steps,
            self.state
        )
    }
}
