// src/tools/gemini.rs

use crate::config::ProviderConfig;
use crate::tools::{Tool, ToolResult, api_key, http_client, send_for_text};
use serde_json::json;

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Google Gemini `generateContent`. Unavailable without `GOOGLE_API_KEY`.
pub struct GeminiTool {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    api_key: Option<String>,
}

impl GeminiTool {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }
}

impl Tool for GeminiTool {
    fn name(&self) -> &str {
        "gemini"
    }

    fn description(&self) -> &str {
        "Sends a prompt to the Gemini generateContent API."
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
            "contents": [{ "parts": [{ "text": input }] }],
            "generationConfig": { "maxOutputTokens": self.max_tokens }
        });

        let request = client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", key)
            .json(&payload);
        send_for_text(request, "/candidates/0/content/parts/0/text")
    }
}
