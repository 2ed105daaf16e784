//! Google Gemini `generateContent`.

use super::{ChatApi, MAX_OUTPUT_TOKENS, TEMPERATURE};
use crate::prompt::Prompt;
use crate::transport::HttpRequest;
use deckgen_core::{Error, Result};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiApi {
    base: String,
}

impl GeminiApi {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base, model)
    }
}

impl ChatApi for GeminiApi {
    fn label(&self) -> &'static str {
        "Gemini"
    }

    fn default_model(&self) -> &'static str {
        "gemini-1.5-pro"
    }

    /// The credential travels as the `key` query parameter.
    fn build_request(&self, model: &str, credential: &str, prompt: &Prompt) -> HttpRequest {
        let body = json!({
            "systemInstruction": {"parts": [{"text": prompt.system}]},
            "contents": [{"role": "user", "parts": [{"text": prompt.user}]}],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "response_mime_type": "application/json",
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            },
        });

        HttpRequest::post(self.label(), self.endpoint(model), body).query_param("key", credential)
    }

    /// Text of the first part of the first candidate.
    fn extract_text(&self, envelope: &Value) -> Result<String> {
        let candidate = envelope
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .ok_or_else(|| {
                Error::MalformedOutput(format!("Gemini returned no candidates: {}", envelope))
            })?;

        let first_part = candidate
            .pointer("/content/parts")
            .and_then(Value::as_array)
            .and_then(|parts| parts.first())
            .ok_or_else(|| {
                Error::MalformedOutput(format!("Gemini returned empty parts: {}", envelope))
            })?;

        Ok(first_part
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let api = GeminiApi::new("https://generativelanguage.googleapis.com/v1beta");
        let prompt = Prompt::new("Some text", "");
        let req = api.build_request("gemini-1.5-pro", "AIza-key", &prompt);

        assert_eq!(
            req.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert!(!req.url.contains("AIza-key"));
        assert_eq!(req.query, vec![("key".to_string(), "AIza-key".to_string())]);
        assert!(req.headers.is_empty());
        assert_eq!(req.body["generationConfig"]["response_mime_type"], "application/json");
        assert_eq!(req.body["systemInstruction"]["parts"][0]["text"], prompt.system.as_str());
        assert_eq!(req.body["contents"][0]["parts"][0]["text"], prompt.user.as_str());
    }

    #[test]
    fn test_extract_text() {
        let api = GeminiApi::new("https://example.test");
        let envelope = json!({
            "candidates": [{"content": {"parts": [{"text": "{\"slides\": []}"}, {"text": "ignored"}]}}]
        });
        assert_eq!(api.extract_text(&envelope).unwrap(), "{\"slides\": []}");
    }

    #[test]
    fn test_no_candidates() {
        let api = GeminiApi::new("https://example.test");
        let err = api
            .extract_text(&json!({"promptFeedback": {"blockReason": "SAFETY"}}))
            .unwrap_err();
        assert!(err.to_string().contains("no candidates"));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_empty_parts() {
        let api = GeminiApi::new("https://example.test");
        let err = api
            .extract_text(&json!({"candidates": [{"content": {"parts": []}}]}))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedOutput(ref m) if m.contains("empty parts")));
    }
}
