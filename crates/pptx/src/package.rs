//! The PPTX ZIP container as an ordered list of named parts.

use deckgen_core::{Error, Result};
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// A single file inside the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Name inside the ZIP, without a leading slash.
    pub name: String,
    pub data: Vec<u8>,
}

/// All parts of a package, in archive order.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<Part>,
}

impl Package {
    /// Read every file of a PPTX archive into memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::Zip(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::Zip(format!("Failed to read entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().trim_start_matches('/').to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::Zip(format!("Failed to read '{}': {}", name, e)))?;
            parts.push(Part { name, data });
        }

        if !parts.iter().any(|p| p.name == CONTENT_TYPES_PART) {
            return Err(Error::Build(format!(
                "Not an OOXML package: missing {}",
                CONTENT_TYPES_PART
            )));
        }

        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Read a part as UTF-8 text.
    pub fn part_str(&self, name: &str) -> Result<String> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::Build(format!("Part not found in package: '{}'", name)))?;
        crate::xml::utf8(data, name)
    }

    /// Insert a part, replacing any existing part of the same name in place.
    pub fn set_part(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.data = data,
            None => self.parts.push(Part { name, data }),
        }
    }

    /// The first unused name of the form `{prefix}{n}{suffix}`, counting from 1.
    pub fn next_part_name(&self, prefix: &str, suffix: &str) -> String {
        let next = self
            .parts
            .iter()
            .filter_map(|p| p.name.strip_prefix(prefix)?.strip_suffix(suffix)?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        format!("{}{}{}", prefix, next, suffix)
    }

    /// Find a part under `dir` whose bytes equal `data`.
    pub fn find_part_with_data(&self, dir: &str, data: &[u8]) -> Option<&str> {
        self.parts
            .iter()
            .find(|p| p.name.starts_with(dir) && p.data == data)
            .map(|p| p.name.as_str())
    }

    /// Serialize to ZIP bytes.
    ///
    /// `[Content_Types].xml` is written first and every entry carries the same
    /// fixed timestamp, so equal packages produce equal bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let ordered = self
            .parts
            .iter()
            .filter(|p| p.name == CONTENT_TYPES_PART)
            .chain(self.parts.iter().filter(|p| p.name != CONTENT_TYPES_PART));

        for part in ordered {
            writer
                .start_file(part.name.as_str(), options)
                .map_err(|e| Error::Zip(format!("Failed to start '{}': {}", part.name, e)))?;
            writer
                .write_all(&part.data)
                .map_err(|e| Error::Zip(format!("Failed to write '{}': {}", part.name, e)))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::Zip(format!("Failed to finish archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}
