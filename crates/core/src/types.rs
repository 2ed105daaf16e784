//! Domain types for the validated slide deck.

use serde::{Deserialize, Serialize};

use crate::credential::mask_credential;

/// Maximum number of bullets kept per slide.
pub const MAX_BULLETS: usize = 8;

/// Maximum title length, in characters.
pub const MAX_TITLE_CHARS: usize = 120;

/// Layout hint used when the model omits one.
pub const DEFAULT_LAYOUT_HINT: &str = "Title and Content";

/// A single slide of the deck, in presentation order.
///
/// Built from model output through [`crate::schema`], which applies the
/// defaults and bounds below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slide {
    /// Slide title (at most [`MAX_TITLE_CHARS`] characters).
    pub title: String,

    /// Bullet lines (at most [`MAX_BULLETS`]).
    pub bullets: Vec<String>,

    /// Free-text label matched against the template's layout names.
    pub layout_hint: Option<String>,

    /// Plain-text speaker notes.
    pub notes: Option<String>,
}

impl Slide {
    /// Create a slide with the given title, no bullets and the default layout hint.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bullets: Vec::new(),
            layout_hint: Some(DEFAULT_LAYOUT_HINT.to_string()),
            notes: None,
        }
    }

    /// Set the bullets, clamped to [`MAX_BULLETS`].
    pub fn with_bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bullets = bullets.into_iter().take(MAX_BULLETS).map(Into::into).collect();
        self
    }

    /// Set the layout hint.
    pub fn with_layout_hint(mut self, hint: impl Into<String>) -> Self {
        self.layout_hint = Some(hint.into());
        self
    }

    /// Set the speaker notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Whether the slide lacks usable speaker notes.
    pub fn is_missing_notes(&self) -> bool {
        self.notes.as_deref().map_or(true, |n| n.trim().is_empty())
    }
}

/// LLM parameters kept with a deck so missing notes can be backfilled later.
///
/// Only the masked form of the credential is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmReuse {
    pub provider: String,

    #[serde(default)]
    pub model: String,

    /// Masked credential handle, never the cleartext key.
    #[serde(default, rename = "api_key")]
    pub masked_api_key: String,
}

impl LlmReuse {
    /// Record provider parameters, masking the credential.
    pub fn new(provider: impl Into<String>, model: impl Into<String>, api_key: &str) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            masked_api_key: mask_credential(api_key),
        }
    }
}

/// The validated slide collection handed to the template builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deck {
    /// Slides in presentation order.
    pub slides: Vec<Slide>,

    /// Tone reported by the model (informational only).
    pub tone: Option<String>,

    /// Use case reported by the model (informational only).
    pub use_case: Option<String>,

    /// Whether slides without notes should have them generated.
    pub fill_missing_notes: bool,

    /// Provider parameters for the notes backfill.
    pub llm: Option<LlmReuse>,
}

impl Deck {
    /// Create a deck from slides, with no metadata.
    pub fn new(slides: Vec<Slide>) -> Self {
        Self {
            slides,
            tone: None,
            use_case: None,
            fill_missing_notes: false,
            llm: None,
        }
    }

    /// Mark the deck for notes backfill with the given provider parameters.
    pub fn request_notes_backfill(&mut self, provider: &str, model: &str, api_key: &str) {
        self.fill_missing_notes = true;
        self.llm = Some(LlmReuse::new(provider, model, api_key));
    }

    /// Indices of slides that have no speaker notes.
    pub fn slides_missing_notes(&self) -> Vec<usize> {
        self.slides
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_missing_notes())
            .map(|(i, _)| i)
            .collect()
    }
}
