// src/tools/openai.rs

use crate::config::ProviderConfig;
use crate::tools::{Tool, ToolResult, api_key, http_client, send_for_text};
use serde_json::json;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// OpenAI chat completions. Unavailable without `OPENAI_API_KEY`.
pub struct OpenAITool {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    api_key: Option<String>,
}

impl OpenAITool {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
            api_key: None,
        }
    }

    /// Uses `key` instead of reading the environment.
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }
}

impl Tool for OpenAITool {
    fn name(&self) -> &str {
        "openai"
    }

    fn description(&self) -> &str {
        "Sends a prompt to the OpenAI chat completions API."
    }

    fn execute(&self, input: &str) -> ToolResult {
        let Some(key) = api_key(&self.api_key, API_KEY_VAR) else {
            return ToolResult::failure(&format!("{API_KEY_VAR} is not set"));
        };
        let client = match http_client(self.timeout_secs) {
            Ok(client) => client,
            Err(err) => return ToolResult::failure(&format!("HTTP client error: {err}")),
        };

        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": input }],
            "max_tokens": self.max_tokens
        });

        let request = client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&payload);
        send_for_text(request, "/choices/0/message/content")
    }
}
