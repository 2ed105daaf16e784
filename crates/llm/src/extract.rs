//! Pull a JSON object out of free-form model output.
//!
//! Models wrap JSON in prose or Markdown fences even when told not to.
//! Strategies are tried in order and the first one that parses wins:
//! a ```` ```json ```` fenced object, the greedy span from the first `{` to
//! the last `}`, and finally the whole text.

use deckgen_core::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// A fenced code block labelled `json` that contains an object.
static FENCED_JSON_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```json\s*(\{.*?\})\s*```").unwrap());

/// Everything from the first `{` to the last `}`.
static BRACE_SPAN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)(\{.*\})").unwrap());

/// Extract and parse a JSON value from model output.
pub fn extract_json(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Err(Error::MalformedOutput("Empty response from model".to_string()));
    }

    let candidates = [&*FENCED_JSON_REGEX, &*BRACE_SPAN_REGEX]
        .into_iter()
        .filter_map(|re| re.captures(text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()));

    for candidate in candidates {
        match serde_json::from_str(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => log::debug!("JSON candidate rejected: {}", e),
        }
    }

    serde_json::from_str(text.trim()).map_err(|e| {
        Error::MalformedOutput(format!("Model output is not valid JSON: {}", e))
    })
}
