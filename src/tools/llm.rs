// src/tools/llm.rs

use crate::config::ProviderConfig;
use crate::tools::{Tool, ToolResult, http_client, send_for_text};
use serde_json::json;

/// Local model served by Ollama. Needs no credentials.
pub struct OllamaTool {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl OllamaTool {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout_secs: ProviderConfig::default().timeout_secs,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            timeout_secs: config.timeout_secs,
            ..Self::new(&config.ollama_url, &config.ollama_model)
        }
    }
}

impl Default for OllamaTool {
    fn default() -> Self {
        Self::from_config(&ProviderConfig::default())
    }
}

impl Tool for OllamaTool {
    fn name(&self) -> &str {
        "ollama"
    }

    fn description(&self) -> &str {
        "Sends a prompt to a local Ollama model and returns the response."
    }

    fn execute(&self, input: &str) -> ToolResult {
        let client = match http_client(self.timeout_secs) {
            Ok(client) => client,
            Err(err) => return ToolResult::failure(&format!("HTTP client error: {err}")),
        };

        let payload = json!({
            "model": self.model,
            "prompt": input,
            "stream": false
        });

        let request = client
            .post(format!("{}/api/generate", self.base_url))
            .json(&payload);
        send_for_text(request, "/response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_trimmed_response_text() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "response": "  (1,2), (3,4)\n" }"#)
            .create();

        let tool = OllamaTool::new(&server.url(), "llama3");
        let result = tool.execute("order these");

        mock.assert();
        assert_eq!(result, ToolResult::success("(1,2), (3,4)"));
    }

    #[test]
    fn missing_field_is_failure() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "done": true }"#)
            .create();

        let result = OllamaTool::new(&server.url(), "llama3").execute("hi");
        assert!(!result.success);
    }

    #[test]
    fn unreachable_server_is_failure() {
        let tool = OllamaTool::new("http://127.0.0.1:1", "llama3");
        assert!(!tool.execute("hi").success);
    }
}
