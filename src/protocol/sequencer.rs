// src/protocol/sequencer.rs

use crate::config::ProviderConfig;
use crate::model::Position;
use crate::tools::{GeminiTool, OllamaTool, OpenAITool, Tool};
use crate::validation::order::{OrderValidationError, validate_order};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static COORDINATE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\s*(\d+)\s*,\s*(\d+)\s*\)?").expect("coordinate pattern compiles")
});

/// Which ordering sources to consult.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    #[default]
    Heuristic,
    Gemini,
    OpenAI,
    Ollama,
    /// Gemini, then OpenAI, then the heuristic.
    Auto,
}

impl FromStr for OrderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(OrderMode::Heuristic),
            "gemini" => Ok(OrderMode::Gemini),
            "openai" => Ok(OrderMode::OpenAI),
            "ollama" => Ok(OrderMode::Ollama),
            "auto" => Ok(OrderMode::Auto),
            other => Err(format!(
                "unknown order mode {other:?} (expected heuristic, gemini, openai, ollama or auto)"
            )),
        }
    }
}

impl fmt::Display for OrderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderMode::Heuristic => "heuristic",
            OrderMode::Gemini => "gemini",
            OrderMode::OpenAI => "openai",
            OrderMode::Ollama => "ollama",
            OrderMode::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// A source of task visiting orders. `None` means "no ordering available".
pub trait TaskOrderer: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn order(&self, agent: Position, tasks: &[Position]) -> Option<Vec<Position>>;
}

/// Greedy nearest-task-first by Manhattan distance.
pub struct NearestFirst;

impl TaskOrderer for NearestFirst {
    fn name(&self) -> &str {
        "nearest-first"
    }

    fn description(&self) -> &str {
        "Greedy nearest task first by Manhattan distance"
    }

    fn order(&self, agent: Position, tasks: &[Position]) -> Option<Vec<Position>> {
        Some(nearest_first(agent, tasks))
    }
}

pub fn nearest_first(agent: Position, tasks: &[Position]) -> Vec<Position> {
    let mut remaining = tasks.to_vec();
    let mut order = Vec::with_capacity(remaining.len());
    let mut current = agent;

    loop {
        let Some(idx) = remaining
            .iter()
            .enumerate()
            .min_by_key(|(_, task)| current.manhattan(**task))
            .map(|(idx, _)| idx)
        else {
            break;
        };
        let next = remaining.remove(idx);
        order.push(next);
        current = next;
    }
    order
}

/// Asks a text-generation [`Tool`] for an order and parses its reply.
pub struct ToolOrderer {
    tool: Box<dyn Tool + Send + Sync>,
}

impl ToolOrderer {
    pub fn new<T: Tool + Send + Sync + 'static>(tool: T) -> Self {
        Self {
            tool: Box::new(tool),
        }
    }
}

impl TaskOrderer for ToolOrderer {
    fn name(&self) -> &str {
        self.tool.name()
    }

    fn description(&self) -> &str {
        self.tool.description()
    }

    fn order(&self, agent: Position, tasks: &[Position]) -> Option<Vec<Position>> {
        let result = self.tool.execute(&ordering_prompt(agent, tasks));
        if !result.success {
            warn!(
                provider = self.tool.name(),
                error = result.error.as_deref().unwrap_or("unknown"),
                "ordering provider unavailable"
            );
            return None;
        }

        let text = result.output.unwrap_or_default();
        match parse_ordered_positions(&text, tasks) {
            Ok(order) => Some(order),
            Err(errors) => {
                for error in &errors {
                    debug!(provider = self.tool.name(), hint = %error.hint(), "rejected ordering");
                }
                warn!(provider = self.tool.name(), "ordering response rejected");
                None
            }
        }
    }
}

pub fn ordering_prompt(agent: Position, tasks: &[Position]) -> String {
    let task_list = tasks
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Robot at {agent}. Tasks at [{task_list}]. \
         Output optimal order to complete all tasks minimizing total steps. \
         Reply with only the list of coordinates in order, e.g. (1,2), (0,3), (2,1)."
    )
}

/// Extracts `(row,col)` pairs from free text in order of appearance.
///
/// Pairs that are not task cells are ignored and tasks the text never
/// mentions are appended in their given order. The result must then be a
/// permutation of `tasks`.
pub fn parse_ordered_positions(
    text: &str,
    tasks: &[Position],
) -> Result<Vec<Position>, Vec<OrderValidationError>> {
    let answer = text.rsplit("</think>").next().unwrap_or(text);

    let mentioned: Vec<Position> = COORDINATE_PAIR
        .captures_iter(answer)
        .filter_map(|caps| {
            let row = caps[1].parse().ok()?;
            let col = caps[2].parse().ok()?;
            Some(Position::new(row, col))
        })
        .collect();
    if mentioned.is_empty() {
        return Err(vec![OrderValidationError::NoCoordinates]);
    }

    let mut order: Vec<Position> = mentioned
        .into_iter()
        .filter(|pos| tasks.contains(pos))
        .collect();
    for task in tasks {
        if !order.contains(task) {
            order.push(*task);
        }
    }

    let errors = validate_order(&order, tasks);
    if errors.is_empty() {
        Ok(order)
    } else {
        Err(errors)
    }
}

/// Fixed trial list of orderers that always ends with [`NearestFirst`].
pub struct TaskSequencer {
    providers: Vec<Box<dyn TaskOrderer>>,
    fallback: NearestFirst,
}

impl TaskSequencer {
    pub fn new(providers: Vec<Box<dyn TaskOrderer>>) -> Self {
        Self {
            providers,
            fallback: NearestFirst,
        }
    }

    pub fn heuristic() -> Self {
        Self::new(Vec::new())
    }

    pub fn for_mode(mode: OrderMode, config: &ProviderConfig) -> Self {
        let gemini = || -> Box<dyn TaskOrderer> {
            Box::new(ToolOrderer::new(GeminiTool::from_config(config)))
        };
        let openai = || -> Box<dyn TaskOrderer> {
            Box::new(ToolOrderer::new(OpenAITool::from_config(config)))
        };
        let ollama = || -> Box<dyn TaskOrderer> {
            Box::new(ToolOrderer::new(OllamaTool::from_config(config)))
        };
        let providers = match mode {
            OrderMode::Heuristic => Vec::new(),
            OrderMode::Gemini => vec![gemini()],
            OrderMode::OpenAI => vec![openai()],
            OrderMode::Ollama => vec![ollama()],
            OrderMode::Auto => vec![gemini(), openai()],
        };
        Self::new(providers)
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers
            .iter()
            .map(|p| p.name())
            .chain(std::iter::once(self.fallback.name()))
            .collect()
    }

    /// `(name, description)` for each orderer in trial order.
    pub fn describe(&self) -> Vec<(&str, &str)> {
        self.providers
            .iter()
            .map(|p| (p.name(), p.description()))
            .chain(std::iter::once((
                self.fallback.name(),
                self.fallback.description(),
            )))
            .collect()
    }

    /// Produces the visiting order. Never fails: unavailable providers fall
    /// through to the next one and finally to the heuristic.
    pub fn sequence(&self, agent: Position, tasks: &[Position]) -> Vec<Position> {
        if tasks.len() <= 1 {
            return tasks.to_vec();
        }

        for provider in &self.providers {
            if let Some(order) = provider.order(agent, tasks) {
                info!(provider = provider.name(), tasks = order.len(), "task order chosen");
                return order;
            }
        }

        let order = nearest_first(agent, tasks);
        info!(provider = self.fallback.name(), tasks = order.len(), "task order chosen");
        order
    }
}

/// One-shot convenience over [`TaskSequencer::for_mode`].
pub fn sequence(
    agent: Position,
    tasks: &[Position],
    mode: OrderMode,
    config: &ProviderConfig,
) -> Vec<Position> {
    TaskSequencer::for_mode(mode, config).sequence(agent, tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolResult;
    use pretty_assertions::assert_eq;

    fn p(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    struct Canned(&'static str);

    impl Tool for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn description(&self) -> &str {
            "Returns a fixed reply"
        }

        fn execute(&self, _input: &str) -> ToolResult {
            ToolResult::success(self.0)
        }
    }

    #[test]
    fn nearest_first_is_greedy_from_current_position() {
        let tasks = [p(0, 9), p(0, 2), p(0, 5)];
        assert_eq!(nearest_first(p(0, 0), &tasks), vec![p(0, 2), p(0, 5), p(0, 9)]);
    }

    #[test]
    fn nearest_first_updates_reference_point() {
        // From (0,0): (2,0) is closest. From (2,0): (2,3) beats (0,4).
        let tasks = [p(0, 4), p(2, 3), p(2, 0)];
        assert_eq!(nearest_first(p(0, 0), &tasks), vec![p(2, 0), p(2, 3), p(0, 4)]);
    }

    #[test]
    fn nearest_first_ties_pick_first_listed() {
        let tasks = [p(0, 1), p(1, 0)];
        assert_eq!(nearest_first(p(0, 0), &tasks), vec![p(0, 1), p(1, 0)]);
    }

    #[test]
    fn empty_and_single_task_lists_pass_through() {
        let seq = TaskSequencer::heuristic();
        assert!(seq.sequence(p(0, 0), &[]).is_empty());
        assert_eq!(seq.sequence(p(0, 0), &[p(3, 3)]), vec![p(3, 3)]);
    }

    #[test]
    fn parser_reads_pairs_in_order() {
        let tasks = [p(3, 4), p(1, 2)];
        assert_eq!(
            parse_ordered_positions("(1,2), (3,4)", &tasks),
            Ok(vec![p(1, 2), p(3, 4)])
        );
    }

    #[test]
    fn parser_ignores_pairs_outside_task_set() {
        let tasks = [p(1, 2), p(3, 4)];
        assert_eq!(
            parse_ordered_positions("Start (0,0) then (3, 4) and finally ( 1 , 2 )", &tasks),
            Ok(vec![p(3, 4), p(1, 2)])
        );
    }

    #[test]
    fn parser_appends_unmentioned_tasks() {
        let tasks = [p(1, 2), p(3, 4), p(5, 6)];
        assert_eq!(
            parse_ordered_positions("(5,6)", &tasks),
            Ok(vec![p(5, 6), p(1, 2), p(3, 4)])
        );
    }

    #[test]
    fn parser_rejects_duplicates_and_empty_text() {
        let tasks = [p(1, 2), p(3, 4)];
        assert!(parse_ordered_positions("(1,2), (1,2), (3,4)", &tasks).is_err());
        assert_eq!(
            parse_ordered_positions("no idea", &tasks),
            Err(vec![OrderValidationError::NoCoordinates])
        );
    }

    #[test]
    fn parser_skips_reasoning_block() {
        let tasks = [p(1, 2), p(3, 4)];
        let text = "<think>maybe (1,2) first?</think>\n(3,4), (1,2)";
        assert_eq!(parse_ordered_positions(text, &tasks), Ok(vec![p(3, 4), p(1, 2)]));
    }

    #[test]
    fn rejected_provider_falls_through_to_next() {
        let seq = TaskSequencer::new(vec![
            Box::new(ToolOrderer::new(Canned("I cannot help with that."))),
            Box::new(ToolOrderer::new(Canned("(0,9), (0,1)"))),
        ]);
        let tasks = [p(0, 1), p(0, 9)];
        assert_eq!(seq.sequence(p(0, 0), &tasks), vec![p(0, 9), p(0, 1)]);
    }

    #[test]
    fn all_providers_unavailable_uses_heuristic() {
        let seq = TaskSequencer::new(vec![Box::new(ToolOrderer::new(Canned("")))]);
        let tasks = [p(0, 9), p(0, 1)];
        assert_eq!(seq.sequence(p(0, 0), &tasks), vec![p(0, 1), p(0, 9)]);
        assert_eq!(seq.provider_names(), vec!["canned", "nearest-first"]);
    }

    #[test]
    fn auto_mode_trial_list() {
        let seq = TaskSequencer::for_mode(OrderMode::Auto, &ProviderConfig::default());
        assert_eq!(seq.provider_names(), vec!["gemini", "openai", "nearest-first"]);
    }

    #[test]
    fn describe_lists_tool_descriptions_in_trial_order() {
        let seq = TaskSequencer::new(vec![Box::new(ToolOrderer::new(Canned("")))]);
        assert_eq!(
            seq.describe(),
            vec![
                ("canned", "Returns a fixed reply"),
                ("nearest-first", "Greedy nearest task first by Manhattan distance"),
            ]
        );
    }

    #[test]
    fn order_mode_parses_names() {
        assert_eq!("AUTO".parse::<OrderMode>(), Ok(OrderMode::Auto));
        assert_eq!("openai".parse::<OrderMode>(), Ok(OrderMode::OpenAI));
        assert!("fastest".parse::<OrderMode>().is_err());
    }
}
