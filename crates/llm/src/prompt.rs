//! Fixed instructions sent to every provider.

use deckgen_core::normalize::truncate_chars;

/// Maximum number of characters of source text sent to the model.
pub const MAX_RAW_TEXT_CHARS: usize = 60_000;

/// Maximum number of characters of guidance sent to the model.
pub const MAX_GUIDANCE_CHARS: usize = 200;

/// System instruction describing the expected deck JSON.
pub const SYSTEM_PROMPT: &str = "You convert long text or Markdown into a concise, well-structured slide deck. \
You MUST answer as strict JSON with keys: slides:[{title, bullets[], layout_hint, notes}], tone, use_case. \
Pick a reasonable number of slides (5–20) depending on length and guidance. \
Each slide: short title, 3–6 bullets max. Always include speaker notes (1–3 short paragraphs).";

/// The (system, user) message pair for one outline request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Build the prompt, truncating the text and guidance to their limits.
    pub fn new(raw_text: &str, guidance: &str) -> Self {
        let raw_text = truncate_chars(raw_text, MAX_RAW_TEXT_CHARS);
        let guidance = truncate_chars(guidance, MAX_GUIDANCE_CHARS);

        let user = format!(
            "Input text (can be Markdown):\n\n{raw_text}\n\n\
             Guidance/tone/use-case (optional): {guidance}\n\n\
             Return STRICT JSON only, no prose."
        );

        Self {
            system: SYSTEM_PROMPT.to_string(),
            user,
        }
    }
}
