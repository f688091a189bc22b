// src/config/mod.rs

use crate::error::ConfigError;
use crate::protocol::sequencer::OrderMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Simulation settings. Layered as defaults, optional JSON file, then
/// `GRIDBOT_*` environment overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub rows: usize,
    pub cols: usize,
    pub num_tasks: usize,
    pub num_obstacles: usize,
    pub seed: Option<u64>,
    pub order_mode: OrderMode,
    pub providers: ProviderConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rows: 12,
            cols: 16,
            num_tasks: 3,
            num_obstacles: 15,
            seed: None,
            order_mode: OrderMode::Heuristic,
            providers: ProviderConfig::default(),
        }
    }
}

/// Endpoints and models for the external ordering services. API keys are
/// read from the environment at call time and never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub ollama_url: String,
    pub ollama_model: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".into(),
            ollama_model: "llama3".into(),
            openai_base_url: "https://api.openai.com/v1".into(),
            openai_model: "gpt-4o-mini".into(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            gemini_model: "gemini-1.5-flash".into(),
            timeout_secs: 20,
            max_tokens: 200,
        }
    }
}

impl SimConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Applies `GRIDBOT_*` variables from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("GRIDBOT_ROWS") {
            self.rows = parse_var("GRIDBOT_ROWS", &v)?;
        }
        if let Some(v) = lookup("GRIDBOT_COLS") {
            self.cols = parse_var("GRIDBOT_COLS", &v)?;
        }
        if let Some(v) = lookup("GRIDBOT_TASKS") {
            self.num_tasks = parse_var("GRIDBOT_TASKS", &v)?;
        }
        if let Some(v) = lookup("GRIDBOT_OBSTACLES") {
            self.num_obstacles = parse_var("GRIDBOT_OBSTACLES", &v)?;
        }
        if let Some(v) = lookup("GRIDBOT_SEED") {
            self.seed = Some(parse_var("GRIDBOT_SEED", &v)?);
        }
        if let Some(v) = lookup("GRIDBOT_ORDER") {
            self.order_mode = parse_var("GRIDBOT_ORDER", &v)?;
        }
        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
