//! `build_presentation`: fill a template with the slides of a deck.

use crate::document::TemplateDocument;
use crate::images::{harvest_images, DEFAULT_IMAGE_LIMIT};
use crate::layout::choose_layout;
use crate::slide::NewSlide;
use deckgen_core::{Deck, Result, Slide};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;

/// Seed of the picture choice; fixed so rebuilding a deck gives the same output.
pub const DEFAULT_IMAGE_SEED: u64 = 42;

/// Knobs of the slide builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Cap on the reusable image set.
    pub image_limit: usize,
    pub image_seed: u64,
    /// Title sizes above this (in points) are clamped.
    pub title_size_threshold_pt: u32,
    pub title_clamped_size_pt: u32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            image_limit: DEFAULT_IMAGE_LIMIT,
            image_seed: DEFAULT_IMAGE_SEED,
            title_size_threshold_pt: 48,
            title_clamped_size_pt: 40,
        }
    }
}

/// Sub-operations whose failure is logged and skipped instead of failing the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BestEffort {
    FontClamp,
    PictureInsert,
    ImageHarvest,
}

impl fmt::Display for BestEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FontClamp => "title font clamp",
            Self::PictureInsert => "picture insertion",
            Self::ImageHarvest => "image harvest",
        })
    }
}

/// Run a best-effort step, logging its failure.
pub(crate) fn best_effort<T>(step: BestEffort, slide: Option<usize>, f: impl FnOnce() -> Result<T>) -> Option<T> {
    match f() {
        Ok(value) => Some(value),
        Err(e) => {
            match slide {
                Some(n) => log::warn!("Skipping {} on slide {}: {}", step, n + 1, e),
                None => log::warn!("Skipping {}: {}", step, e),
            }
            None
        }
    }
}

/// Builds presentations from decks.
#[derive(Debug, Clone, Default)]
pub struct PresentationBuilder {
    options: BuildOptions,
}

impl PresentationBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Append one slide per deck slide to a copy of the template and return
    /// the resulting document bytes.
    ///
    /// Only opening the template (which reads its layouts) and the final
    /// serialization can fail the build. Font clamping, picture insertion and
    /// image harvesting failures are logged and skipped.
    pub fn build(&self, template_bytes: &[u8], deck: &Deck) -> Result<Vec<u8>> {
        let mut doc = TemplateDocument::open(template_bytes)?;
        let images = harvest_images(&doc, self.options.image_limit);

        let names: Vec<String> = doc.layout_names().into_iter().map(str::to_string).collect();
        let mut rng = StdRng::seed_from_u64(self.options.image_seed);

        for (index, slide) in deck.slides.iter().enumerate() {
            let hint = slide.layout_hint.as_deref().unwrap_or("");
            let layout_index = choose_layout(&names, hint)?;
            log::debug!(
                "Slide {}: layout '{}' for hint '{}'",
                index + 1,
                names[layout_index],
                hint
            );

            let mut new_slide = doc.new_slide(layout_index)?;
            self.fill_text(&doc, &mut new_slide, slide, index);

            if new_slide.has_picture_slot() {
                if let Some(chosen) = images.choose(&mut rng) {
                    best_effort(BestEffort::PictureInsert, Some(index), || {
                        let bounds = doc.picture_bounds(layout_index)?;
                        new_slide.insert_picture(chosen.clone(), bounds)
                    });
                }
            }

            new_slide.set_notes(slide.notes.as_deref().unwrap_or(""));
            doc.push_slide(new_slide);
        }

        doc.into_bytes()
    }

    fn fill_text(&self, doc: &TemplateDocument, new_slide: &mut NewSlide, slide: &Slide, index: usize) {
        if new_slide.set_title(&slide.title) {
            best_effort(BestEffort::FontClamp, Some(index), || {
                let threshold = self.options.title_size_threshold_pt * 100;
                if let Some(size) = doc.effective_title_size(new_slide.layout_index())? {
                    if size > threshold {
                        log::debug!(
                            "Slide {}: title size {}pt clamped to {}pt",
                            index + 1,
                            size / 100,
                            self.options.title_clamped_size_pt
                        );
                        new_slide.set_title_size(self.options.title_clamped_size_pt * 100)?;
                    }
                }
                Ok(())
            });
        }

        if !new_slide.set_body(&slide.bullets) {
            log::debug!("Slide {}: layout has no body placeholder", index + 1);
        }
    }
}

/// Build with [`BuildOptions::default`].
pub fn build_presentation(template_bytes: &[u8], deck: &Deck) -> Result<Vec<u8>> {
    PresentationBuilder::default().build(template_bytes, deck)
}

/// What a template offers to the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub layout_names: Vec<String>,
    pub reusable_image_count: usize,
    pub existing_slide_count: usize,
}

/// Summarize a template's layouts and reusable images.
pub fn summarize_template(template_bytes: &[u8]) -> Result<TemplateSummary> {
    let doc = TemplateDocument::open(template_bytes)?;
    Ok(TemplateSummary {
        layout_names: doc.layout_names().into_iter().map(str::to_string).collect(),
        reusable_image_count: harvest_images(&doc, DEFAULT_IMAGE_LIMIT).len(),
        existing_slide_count: doc.existing_slide_count(),
    })
}
