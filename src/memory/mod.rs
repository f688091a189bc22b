// src/memory/mod.rs

use crate::model::{Move, Position};
use serde::Serialize;
use std::fmt;

/// Something that happened during a mission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MissionEvent {
    Planned { target: Position, moves: usize },
    Replanned { target: Position, moves: usize },
    Skipped { target: Position },
    Moved { from: Position, to: Position, mv: Move },
    Refused { at: Position, mv: Move },
    Collected { task: Position },
    Completed { collected: usize, skipped: usize },
}

impl MissionEvent {
    pub fn label(&self) -> &'static str {
        match self {
            MissionEvent::Planned { .. } => "plan",
            MissionEvent::Replanned { .. } => "replan",
            MissionEvent::Skipped { .. } => "skip",
            MissionEvent::Moved { .. } => "move",
            MissionEvent::Refused { .. } => "refuse",
            MissionEvent::Collected { .. } => "collect",
            MissionEvent::Completed { .. } => "complete",
        }
    }
}

impl fmt::Display for MissionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionEvent::Planned { target, moves } => {
                write!(f, "planned {moves} moves to {target}")
            }
            MissionEvent::Replanned { target, moves } => {
                write!(f, "path blocked, replanned {moves} moves to {target}")
            }
            MissionEvent::Skipped { target } => write!(f, "no path to {target}, skipped"),
            MissionEvent::Moved { from, to, mv } => write!(f, "{mv} {from} -> {to}"),
            MissionEvent::Refused { at, mv } => write!(f, "{mv} from {at} refused"),
            MissionEvent::Collected { task } => write!(f, "collected task {task}"),
            MissionEvent::Completed { collected, skipped } => {
                write!(f, "mission complete: {collected} collected, {skipped} skipped")
            }
        }
    }
}

/// A sink for mission events.
pub trait Memory {
    fn record(&mut self, event: MissionEvent);
    fn events(&self) -> &[MissionEvent];
}

/// In-memory implementation of the Memory trait.
#[derive(Default, Debug, Clone)]
pub struct InMemoryLog {
    pub entries: Vec<MissionEvent>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Events that are not plain moves.
    pub fn milestones(&self) -> impl Iterator<Item = &MissionEvent> {
        self.entries
            .iter()
            .filter(|e| !matches!(e, MissionEvent::Moved { .. }))
    }
}

impl Memory for InMemoryLog {
    fn record(&mut self, event: MissionEvent) {
        self.entries.push(event);
    }

    fn events(&self) -> &[MissionEvent] {
        &self.entries
    }
}
