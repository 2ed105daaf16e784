//! Provider variants behind one "system + user text in, text out" capability.
//!
//! Each variant owns its endpoint, authentication, request body and
//! response envelope. Dispatch goes through [`ChatApi`], so a new provider
//! is a new variant plus its `ChatApi` impl.

mod anthropic;
mod gemini;
mod openai;

pub use anthropic::AnthropicApi;
pub use gemini::GeminiApi;
pub use openai::OpenAiApi;

use crate::extract::extract_json;
use crate::prompt::Prompt;
use crate::transport::{HttpRequest, HttpResponse, DEFAULT_REQUEST_TIMEOUT};
use deckgen_core::normalize::normalize_tag;
use deckgen_core::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Sampling temperature used for every provider.
pub const TEMPERATURE: f64 = 0.3;

/// Output token budget for providers that require one.
pub const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Endpoint configuration for all providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// OpenAI-compatible base URL. Either a `/v1`-style base or a full
    /// `.../chat/completions` URL (gateways).
    pub openai_base: String,
    pub anthropic_base: String,
    pub gemini_base: String,
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            openai_base: "https://api.openai.com/v1".to_string(),
            anthropic_base: "https://api.anthropic.com/v1".to_string(),
            gemini_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    /// Override the OpenAI-compatible base URL.
    pub fn with_openai_base(mut self, base: impl Into<String>) -> Self {
        self.openai_base = base.into();
        self
    }
}

/// Supported provider tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [Self::OpenAi, Self::Anthropic, Self::Gemini];

    /// The lowercase tag accepted by [`FromStr`].
    pub fn tag(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    /// Parse a provider tag, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self> {
        let tag = normalize_tag(s);
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| Error::UnsupportedProvider(s.trim().to_string()))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One provider's HTTP dialect.
pub trait ChatApi: Send + Sync {
    /// Label used in error messages.
    fn label(&self) -> &'static str;

    /// Model used when the caller passes an empty model id.
    fn default_model(&self) -> &'static str;

    /// Build the POST request for this provider.
    fn build_request(&self, model: &str, credential: &str, prompt: &Prompt) -> HttpRequest;

    /// Pull the model's text out of the provider's response envelope.
    fn extract_text(&self, envelope: &Value) -> Result<String>;
}

/// A configured provider, selected by [`ProviderKind`].
#[derive(Debug, Clone)]
pub enum Provider {
    OpenAi(OpenAiApi),
    Anthropic(AnthropicApi),
    Gemini(GeminiApi),
}

impl Provider {
    pub fn new(kind: ProviderKind, config: &ProviderConfig) -> Self {
        match kind {
            ProviderKind::OpenAi => Self::OpenAi(OpenAiApi::new(&config.openai_base)),
            ProviderKind::Anthropic => Self::Anthropic(AnthropicApi::new(&config.anthropic_base)),
            ProviderKind::Gemini => Self::Gemini(GeminiApi::new(&config.gemini_base)),
        }
    }

    fn api(&self) -> &dyn ChatApi {
        match self {
            Self::OpenAi(api) => api,
            Self::Anthropic(api) => api,
            Self::Gemini(api) => api,
        }
    }

    pub fn label(&self) -> &'static str {
        self.api().label()
    }

    /// Resolve the model id, falling back to the provider default when blank.
    pub fn resolve_model<'a>(&self, model: &'a str) -> &'a str {
        let model = model.trim();
        if model.is_empty() {
            self.api().default_model()
        } else {
            model
        }
    }

    pub fn build_request(&self, model: &str, credential: &str, prompt: &Prompt) -> HttpRequest {
        self.api().build_request(model, credential, prompt)
    }

    /// Turn an HTTP response into the outline JSON.
    ///
    /// Non-2xx statuses, envelopes without content and unparseable content
    /// are all errors, never an empty outline.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value> {
        let api = self.api();
        if !response.is_success() {
            return Err(Error::provider_status(api.label(), response.status, &response.body));
        }

        let envelope: Value = serde_json::from_str(&response.body).map_err(|e| {
            Error::MalformedOutput(format!("{} response is not JSON: {}", api.label(), e))
        })?;

        let text = api.extract_text(&envelope)?;
        extract_json(&text)
    }
}
