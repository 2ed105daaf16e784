//! `generate_slide_outline`: the provider call wrapped in the retry policy.

use crate::prompt::Prompt;
use crate::provider::{Provider, ProviderConfig, ProviderKind};
use crate::retry::{retry, RetryPolicy};
use crate::transport::{HttpTransport, ReqwestTransport};
use deckgen_core::{Deck, Result};
use serde_json::Value;

/// Turns raw text into a structured outline through one of the providers.
///
/// Holds no per-call state; one generator can serve concurrent calls.
pub struct OutlineGenerator<T = ReqwestTransport> {
    transport: T,
    config: ProviderConfig,
    retry: RetryPolicy,
}

impl OutlineGenerator<ReqwestTransport> {
    /// Create a generator that talks to providers over `reqwest`.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: HttpTransport> OutlineGenerator<T> {
    /// Create a generator over a custom transport.
    pub fn with_transport(transport: T, config: ProviderConfig) -> Self {
        Self {
            transport,
            config,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Ask `provider` for a deck outline of `raw_text`.
    ///
    /// An unknown provider fails before any request is made. Network errors,
    /// non-2xx responses and unparseable output are retried per the policy;
    /// the error of the final attempt is returned.
    pub async fn generate_slide_outline(
        &self,
        provider: &str,
        model: &str,
        credential: &str,
        raw_text: &str,
        guidance: &str,
    ) -> Result<Value> {
        let kind: ProviderKind = provider.parse()?;
        let provider = Provider::new(kind, &self.config);
        let model = provider.resolve_model(model);
        let prompt = Prompt::new(raw_text, guidance);

        log::debug!(
            "Requesting outline from {} (model {}, {} chars of text)",
            provider.label(),
            model,
            raw_text.chars().count()
        );

        let provider = &provider;
        let prompt = &prompt;
        let transport = &self.transport;
        retry(&self.retry, move |attempt| async move {
            log::debug!("{} outline attempt {}", provider.label(), attempt);
            let request = provider.build_request(model, credential, prompt);
            let response = transport.post_json(request).await?;
            provider.parse_response(response)
        })
        .await
    }

    /// Generate an outline and validate it into a [`Deck`].
    ///
    /// Schema failures are reported as-is and are not retried.
    pub async fn generate_deck(
        &self,
        provider: &str,
        model: &str,
        credential: &str,
        raw_text: &str,
        guidance: &str,
    ) -> Result<Deck> {
        let outline = self
            .generate_slide_outline(provider, model, credential, raw_text, guidance)
            .await?;
        Deck::from_outline(outline)
    }
}

/// Generate an outline with the default endpoints and retry policy.
pub async fn generate_slide_outline(
    provider: &str,
    model: &str,
    credential: &str,
    raw_text: &str,
    guidance: &str,
) -> Result<Value> {
    OutlineGenerator::new(ProviderConfig::default())?
        .generate_slide_outline(provider, model, credential, raw_text, guidance)
        .await
}
