//! Error types shared by outline generation and deck building.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum number of response-body characters kept in a provider status error.
pub const PROVIDER_BODY_SNIPPET_CHARS: usize = 500;

/// Errors that can occur while generating an outline or building a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// The provider tag is not one of the supported providers.
    #[error("Unsupported provider '{0}'. Use openai|anthropic|gemini.")]
    UnsupportedProvider(String),

    /// An invalid configuration value was supplied.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response (connect, timeout, body read).
    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    /// The provider answered with a non-2xx status.
    #[error("{provider} HTTP {status}: {body}")]
    ProviderStatus {
        provider: String,
        status: u16,
        body: String,
    },

    /// The provider answered, but the content was empty or not parseable as JSON.
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    /// The parsed outline does not match the deck schema.
    #[error("Deck schema validation failed: {0}")]
    Schema(String),

    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// A fatal document-build failure.
    #[error("Presentation build error: {0}")]
    Build(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing error (for PPTX).
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// Image bytes could not be recognised or placed.
    #[error("Image error: {0}")]
    Image(String),
}

impl Error {
    /// Build a provider status error, keeping only the head of the response body.
    pub fn provider_status(provider: impl Into<String>, status: u16, body: &str) -> Self {
        let body = if body.is_empty() {
            "<no body>".to_string()
        } else {
            crate::normalize::truncate_chars(body, PROVIDER_BODY_SNIPPET_CHARS).to_string()
        };
        Self::ProviderStatus {
            provider: provider.into(),
            status,
            body,
        }
    }

    /// Whether the outline retry loop should try again after this error.
    ///
    /// Configuration and schema errors are deterministic, so repeating the
    /// request cannot fix them.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::ProviderStatus { .. } | Self::MalformedOutput(_)
        )
    }
}
