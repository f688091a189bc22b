// src/error.rs

use crate::model::{CellKind, Position};
use thiserror::Error;

/// Errors raised by grid mutation and parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    #[error("cell {pos} holds {kind:?}, expected {expected}")]
    Occupied {
        pos: Position,
        kind: CellKind,
        expected: &'static str,
    },

    #[error("grid already has an agent at {0}")]
    AgentAlreadyPlaced(Position),

    #[error("grid has no agent")]
    NoAgent,

    #[error("malformed grid text at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Errors raised while assembling a [`crate::config::SimConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
}
