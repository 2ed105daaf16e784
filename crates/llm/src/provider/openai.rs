//! OpenAI chat completions, and gateways speaking the same dialect.

use super::{ChatApi, TEMPERATURE};
use crate::prompt::Prompt;
use crate::transport::HttpRequest;
use deckgen_core::{Error, Result};
use serde_json::{json, Value};

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiApi {
    endpoint: String,
}

impl OpenAiApi {
    /// `base` may be a `/v1`-style base or the full chat completions URL.
    pub fn new(base: &str) -> Self {
        let endpoint = if base.ends_with(CHAT_COMPLETIONS_PATH) {
            base.to_string()
        } else {
            format!("{}{}", base.trim_end_matches('/'), CHAT_COMPLETIONS_PATH)
        };
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ChatApi for OpenAiApi {
    fn label(&self) -> &'static str {
        "OpenAI-compatible"
    }

    fn default_model(&self) -> &'static str {
        "gpt-4o-mini"
    }

    fn build_request(&self, model: &str, credential: &str, prompt: &Prompt) -> HttpRequest {
        let body = json!({
            "model": model,
            "temperature": TEMPERATURE,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user},
            ],
        });

        HttpRequest::post(self.label(), self.endpoint.clone(), body)
            .header("Authorization", format!("Bearer {}", credential))
    }

    fn extract_text(&self, envelope: &Value) -> Result<String> {
        let choice = envelope
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .ok_or_else(|| {
                Error::MalformedOutput(format!("{} returned no choices", self.label()))
            })?;

        choice
            .pointer("/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::MalformedOutput(format!("{} returned a choice without content", self.label()))
            })
    }
}
