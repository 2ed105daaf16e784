//! Core domain types, outline validation and shared errors for turning
//! bulk text into a template-based slide deck.

pub mod credential;
pub mod error;
pub mod normalize;
pub mod schema;
pub mod types;

pub use credential::mask_credential;
pub use error::{Error, Result};
pub use types::{Deck, LlmReuse, Slide, DEFAULT_LAYOUT_HINT, MAX_BULLETS, MAX_TITLE_CHARS};
