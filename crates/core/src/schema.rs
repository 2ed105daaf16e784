//! Validation of model output (or edited deck JSON) into a [`Deck`].
//!
//! The raw outline is untyped JSON. Deserialization enforces the shape;
//! afterwards titles are bounded and bullets are clamped. Fields the model
//! left out take the documented defaults, nothing else is coerced.

use serde::Deserialize;
use serde_json::Value;

use crate::credential::mask_credential;
use crate::types::{Deck, LlmReuse, Slide, DEFAULT_LAYOUT_HINT, MAX_BULLETS, MAX_TITLE_CHARS};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct RawSlide {
    title: String,
    #[serde(default)]
    bullets: Vec<String>,
    #[serde(default = "default_layout_hint")]
    layout_hint: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDeck {
    slides: Vec<RawSlide>,
    #[serde(default)]
    tone: Option<String>,
    #[serde(default)]
    use_case: Option<String>,
    #[serde(default)]
    fill_missing_notes: bool,
    #[serde(default)]
    llm: Option<LlmReuse>,
}

fn default_layout_hint() -> Option<String> {
    Some(DEFAULT_LAYOUT_HINT.to_string())
}

impl Deck {
    /// Validate a parsed outline into a deck.
    pub fn from_outline(outline: Value) -> Result<Self> {
        let raw: RawDeck =
            serde_json::from_value(outline).map_err(|e| Error::Schema(e.to_string()))?;
        raw.validate()
    }

    /// Validate deck JSON text (for example, a deck edited by the user).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawDeck = serde_json::from_str(json).map_err(|e| Error::Schema(e.to_string()))?;
        raw.validate()
    }
}

impl RawDeck {
    fn validate(self) -> Result<Deck> {
        let slides = self
            .slides
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| raw.validate(idx))
            .collect::<Result<Vec<_>>>()?;

        // Edited deck JSON may carry a cleartext key; keep only its masked form.
        let llm = self.llm.map(|mut llm| {
            llm.masked_api_key = mask_credential(&llm.masked_api_key);
            llm
        });

        Ok(Deck {
            slides,
            tone: self.tone,
            use_case: self.use_case,
            fill_missing_notes: self.fill_missing_notes,
            llm,
        })
    }
}

impl RawSlide {
    fn validate(mut self, idx: usize) -> Result<Slide> {
        let title_chars = self.title.chars().count();
        if title_chars > MAX_TITLE_CHARS {
            return Err(Error::Schema(format!(
                "slides[{idx}].title has {title_chars} characters (max {MAX_TITLE_CHARS})"
            )));
        }

        if self.bullets.len() > MAX_BULLETS {
            log::debug!(
                "slides[{}] has {} bullets, keeping the first {}",
                idx,
                self.bullets.len(),
                MAX_BULLETS
            );
            self.bullets.truncate(MAX_BULLETS);
        }

        Ok(Slide {
            title: self.title,
            bullets: self.bullets,
            layout_hint: self.layout_hint,
            notes: self.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bullets_clamped_in_order() {
        let bullets: Vec<String> = (1..=12).map(|i| format!("b{i}")).collect();
        let deck = Deck::from_outline(json!({
            "slides": [{"title": "Many points", "bullets": bullets}]
        }))
        .unwrap();

        let slide = &deck.slides[0];
        assert_eq!(slide.bullets.len(), 8);
        assert_eq!(
            slide.bullets,
            vec!["b1", "b2", "b3", "b4", "b5", "b6", "b7", "b8"]
        );
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let deck = Deck::from_outline(json!({
            "slides": [{"title": "Only a title"}]
        }))
        .unwrap();

        let slide = &deck.slides[0];
        assert!(slide.bullets.is_empty());
        assert_eq!(slide.layout_hint.as_deref(), Some("Title and Content"));
        assert_eq!(slide.notes, None);
        assert_eq!(deck.tone, None);
        assert_eq!(deck.use_case, None);
        assert!(!deck.fill_missing_notes);
        assert!(deck.llm.is_none());
    }

    #[test]
    fn test_explicit_null_layout_hint_stays_absent() {
        let deck = Deck::from_outline(json!({
            "slides": [{"title": "T", "layout_hint": null}]
        }))
        .unwrap();
        assert_eq!(deck.slides[0].layout_hint, None);
    }

    #[test]
    fn test_metadata_is_kept() {
        let deck = Deck::from_outline(json!({
            "slides": [{"title": "Intro", "bullets": ["a"], "layout_hint": "Title Only", "notes": "Say hi"}],
            "tone": "friendly",
            "use_case": "onboarding"
        }))
        .unwrap();

        assert_eq!(deck.tone.as_deref(), Some("friendly"));
        assert_eq!(deck.use_case.as_deref(), Some("onboarding"));
        assert_eq!(deck.slides[0].layout_hint.as_deref(), Some("Title Only"));
        assert_eq!(deck.slides[0].notes.as_deref(), Some("Say hi"));
    }

    #[test]
    fn test_missing_slides_is_schema_error() {
        let err = Deck::from_outline(json!({"tone": "formal"})).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert!(err.to_string().contains("slides"));
    }

    #[test]
    fn test_missing_title_is_schema_error() {
        let err = Deck::from_outline(json!({"slides": [{"bullets": ["x"]}]})).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_wrong_bullet_type_is_schema_error() {
        let err = Deck::from_outline(json!({
            "slides": [{"title": "T", "bullets": "not a list"}]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_overlong_title_is_schema_error() {
        let err = Deck::from_outline(json!({
            "slides": [{"title": "x".repeat(121)}]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Schema(ref m) if m.contains("slides[0].title")));

        assert!(Deck::from_outline(json!({"slides": [{"title": "x".repeat(120)}]})).is_ok());
    }

    #[test]
    fn test_empty_title_is_accepted() {
        let deck = Deck::from_outline(json!({"slides": [{"title": ""}]})).unwrap();
        assert_eq!(deck.slides[0].title, "");
    }

    #[test]
    fn test_edited_deck_round_trip() {
        let mut deck = Deck::from_outline(json!({
            "slides": [{"title": "A", "bullets": ["one", "two"]}],
            "tone": "calm"
        }))
        .unwrap();
        deck.request_notes_backfill("gemini", "", "AIzaSyExampleKey");

        let text = serde_json::to_string(&deck).unwrap();
        let reparsed = Deck::from_json_str(&text).unwrap();
        assert_eq!(reparsed, deck);
    }

    #[test]
    fn test_cleartext_key_in_deck_json_is_masked() {
        let deck = Deck::from_json_str(
            r#"{"slides":[{"title":"A"}],"llm":{"provider":"openai","api_key":"sk-live-supersecret-123"}}"#,
        )
        .unwrap();

        let llm = deck.llm.unwrap();
        assert_eq!(llm.provider, "openai");
        assert_eq!(llm.masked_api_key, mask_credential("sk-live-supersecret-123"));
        assert!(!llm.masked_api_key.contains("supersecret"));
    }
}
