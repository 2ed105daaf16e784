//! Anthropic messages API.

use super::{ChatApi, MAX_OUTPUT_TOKENS, TEMPERATURE};
use crate::prompt::Prompt;
use crate::transport::HttpRequest;
use deckgen_core::{Error, Result};
use serde_json::{json, Value};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnthropicApi {
    endpoint: String,
}

impl AnthropicApi {
    pub fn new(base: &str) -> Self {
        Self {
            endpoint: format!("{}/messages", base.trim_end_matches('/')),
        }
    }
}

impl ChatApi for AnthropicApi {
    fn label(&self) -> &'static str {
        "Anthropic"
    }

    fn default_model(&self) -> &'static str {
        "claude-3-5-sonnet-latest"
    }

    fn build_request(&self, model: &str, credential: &str, prompt: &Prompt) -> HttpRequest {
        let body = json!({
            "model": model,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "temperature": TEMPERATURE,
            "system": prompt.system,
            "messages": [{"role": "user", "content": prompt.user}],
        });

        HttpRequest::post(self.label(), self.endpoint.clone(), body)
            .header("x-api-key", credential)
            .header("anthropic-version", API_VERSION)
    }

    /// Concatenates the text of every content block.
    fn extract_text(&self, envelope: &Value) -> Result<String> {
        let text: String = envelope
            .get("content")
            .and_then(Value::as_array)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|block| block.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::MalformedOutput(format!(
                "{} returned empty content",
                self.label()
            )));
        }
        Ok(text)
    }
}
