//! PPTX template backend: opens an existing presentation or template,
//! appends slides built from a deck and writes the result back out.
//!
//! Presentations are ZIP archives of XML parts; parts are read with
//! quick-xml and new slides are written as XML text.

pub mod builder;
pub mod document;
pub mod images;
pub mod layout;
pub mod notes;
pub mod package;
pub mod reader;
pub mod rels;
pub mod slide;
mod xml;

pub use builder::{build_presentation, summarize_template, BuildOptions, PresentationBuilder, TemplateSummary};
pub use document::{SlideView, TemplateDocument};
pub use images::{harvest_images, ImageFormat};
pub use layout::{choose_layout, Layout, PlaceholderKind, LAYOUT_PRIORITY};
pub use reader::Bounds;
