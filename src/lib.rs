//! Grid agent simulation core: A* search, task sequencing, and a
//! step-driven replanning controller.

pub mod agent;
pub mod config;
pub mod error;
pub mod logging;
pub mod memory;
pub mod model;
pub mod protocol;
pub mod tools;
pub mod validation;
