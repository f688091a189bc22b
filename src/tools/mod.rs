// src/tools/mod.rs

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

pub mod gemini;
pub mod llm;
pub mod openai;

pub use gemini::GeminiTool;
pub use llm::OllamaTool;
pub use openai::OpenAITool;

/// The result of executing a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: &str) -> Self {
        Self {
            success: true,
            output: Some(output.to_string()),
            error: None,
        }
    }

    pub fn failure(error: &str) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.to_string()),
        }
    }
}

/// A text-generation service that turns a prompt into free text.
pub trait Tool {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn execute(&self, input: &str) -> ToolResult;
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Sends `request` and pulls the string at JSON `pointer` out of the reply.
pub(crate) fn send_for_text(request: RequestBuilder, pointer: &str) -> ToolResult {
    let response = match request.send() {
        Ok(resp) => resp,
        Err(err) => return ToolResult::failure(&format!("Request failed: {err}")),
    };

    let status = response.status();
    if !status.is_success() {
        return ToolResult::failure(&format!("Provider returned HTTP {status}"));
    }

    match response.json::<Value>() {
        Ok(json) => match json.pointer(pointer).and_then(|v| v.as_str()) {
            Some(text) => ToolResult::success(text.trim()),
            None => ToolResult::failure(&format!("Response missing '{pointer}'")),
        },
        Err(err) => ToolResult::failure(&format!("Failed to parse JSON: {err}")),
    }
}

/// Reads an API key, treating blank values as absent.
pub(crate) fn api_key(explicit: &Option<String>, env_var: &str) -> Option<String> {
    explicit
        .clone()
        .or_else(|| std::env::var(env_var).ok())
        .filter(|key| !key.trim().is_empty())
}
