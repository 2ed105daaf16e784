//! Image format sniffing and the reusable image set.

use crate::builder::{best_effort, BestEffort};
use crate::document::TemplateDocument;
use deckgen_core::{Error, Result};
use std::collections::HashSet;

/// Default cap on the reusable image set.
pub const DEFAULT_IMAGE_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Detect the format from the leading bytes.
    pub fn detect(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            if bytes.len() >= 16 && &bytes[12..16] == b"IHDR" {
                return Ok(Self::Png);
            }
            return Err(Error::Image("PNG data has no IHDR chunk".to_string()));
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Ok(Self::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Ok(Self::Gif);
        }
        if bytes.starts_with(b"BM") && bytes.len() >= 26 {
            return Ok(Self::Bmp);
        }
        if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            return Ok(Self::Tiff);
        }
        Err(Error::Image(format!(
            "Unrecognised image data ({} bytes)",
            bytes.len()
        )))
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }
}

/// Keep the first blob of each byte length, up to `limit` blobs.
///
/// Length is an approximate identity: two different images of the same size
/// count as one.
pub fn dedupe_by_length<I>(blobs: I, limit: usize) -> Vec<Vec<u8>>
where
    I: IntoIterator<Item = Vec<u8>>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for blob in blobs {
        if unique.len() >= limit {
            break;
        }
        if !blob.is_empty() && seen.insert(blob.len()) {
            unique.push(blob);
        }
    }
    unique
}

/// Collect picture bytes from the template's existing slides.
///
/// Unreadable slides and pictures are skipped.
pub fn harvest_images(doc: &TemplateDocument, limit: usize) -> Vec<Vec<u8>> {
    let mut blobs = Vec::new();
    for index in 0..doc.existing_slide_count() {
        let Some(pictures) = best_effort(BestEffort::ImageHarvest, Some(index), || {
            doc.existing_picture_blobs(index)
        }) else {
            continue;
        };
        for picture in pictures {
            match picture {
                Ok(bytes) => blobs.push(bytes.to_vec()),
                Err(e) => log::debug!("Skipping picture on template slide {}: {}", index + 1, e),
            }
        }
    }

    let images = dedupe_by_length(blobs, limit);
    log::debug!("Harvested {} reusable image(s) from the template", images.len());
    images
}
