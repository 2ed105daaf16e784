//! Package relationships, content types and part-name arithmetic.

use crate::xml::{attr, escape, local_name, xml_error, XML_DECLARATION};
use deckgen_core::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fmt::Write;

const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub const REL_NOTES_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
pub const REL_NOTES_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster";
pub const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const REL_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub const CT_TEMPLATE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub const CT_NOTES_SLIDE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";
pub const CT_NOTES_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.notesMaster+xml";
pub const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// True for `TargetMode="External"` (hyperlinks and linked media).
    pub external: bool,
}

impl Relationship {
    /// Whether this relationship has the given type. Strict and transitional
    /// namespaces are both accepted by comparing the last path segment.
    pub fn is_type(&self, rel_type: &str) -> bool {
        self.rel_type == rel_type || rel_suffix(&self.rel_type) == rel_suffix(rel_type)
    }
}

fn rel_suffix(rel_type: &str) -> &str {
    rel_type.rsplit('/').next().unwrap_or(rel_type)
}

/// The relationships of one source part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut rels = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let id = attr(e, b"Id").unwrap_or_default();
                    let rel_type = attr(e, b"Type").unwrap_or_default();
                    let target = attr(e, b"Target").unwrap_or_default();
                    let external = attr(e, b"TargetMode").is_some_and(|m| m == "External");
                    rels.push(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error("Error parsing relationships", e)),
                _ => {}
            }
        }

        Ok(Self { rels })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.id == id)
    }

    /// First internal relationship of the given type.
    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| !r.external && r.is_type(rel_type))
    }

    /// Add a relationship and return its new `rIdN` id.
    pub fn add(&mut self, rel_type: &str, target: impl Into<String>) -> String {
        let next = self
            .rels
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{}", next);
        self.rels.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.into(),
            external: false,
        });
        id
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);
        xml.push_str(XML_DECLARATION);
        let _ = write!(xml, r#"<Relationships xmlns="{}">"#, NS_RELATIONSHIPS);
        for rel in &self.rels {
            let _ = write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape(&rel.id),
                escape(&rel.rel_type),
                escape(&rel.target)
            );
            if rel.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// `[Content_Types].xml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    /// (extension, content type)
    defaults: Vec<(String, String)>,
    /// (part name with leading slash, content type)
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut types = Self::default();

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    match local_name(e.name().as_ref()) {
                        b"Default" => {
                            if let (Some(ext), Some(ct)) =
                                (attr(e, b"Extension"), attr(e, b"ContentType"))
                            {
                                types.defaults.push((ext, ct));
                            }
                        }
                        b"Override" => {
                            if let (Some(name), Some(ct)) =
                                (attr(e, b"PartName"), attr(e, b"ContentType"))
                            {
                                types.overrides.push((name, ct));
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error("Error parsing content types", e)),
                _ => {}
            }
        }

        Ok(types)
    }

    /// Content type of a part (name without leading slash).
    pub fn content_type(&self, part_name: &str) -> Option<&str> {
        let slashed = format!("/{}", part_name);
        if let Some((_, ct)) = self
            .overrides
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(&slashed))
        {
            return Some(ct);
        }
        let ext = part_name.rsplit_once('.')?.1;
        self.defaults
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, ct)| ct.as_str())
    }

    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if !self
            .defaults
            .iter()
            .any(|(e, _)| e.eq_ignore_ascii_case(extension))
        {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    /// Add or replace the override for a part (name without leading slash).
    pub fn set_override(&mut self, part_name: &str, content_type: &str) {
        let slashed = format!("/{}", part_name);
        match self
            .overrides
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&slashed))
        {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.overrides.push((slashed, content_type.to_string())),
        }
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512 + self.overrides.len() * 160);
        xml.push_str(XML_DECLARATION);
        let _ = write!(xml, r#"<Types xmlns="{}">"#, NS_CONTENT_TYPES);
        for (ext, ct) in &self.defaults {
            let _ = write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape(ext),
                escape(ct)
            );
        }
        for (name, ct) in &self.overrides {
            let _ = write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape(name),
                escape(ct)
            );
        }
        xml.push_str("</Types>");
        xml
    }
}

/// The `_rels` part holding relationships of `part_name`.
pub fn rels_part_for(part_name: &str) -> String {
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_name),
    }
}

/// Resolve a relationship target against the part that owns it.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize_path(absolute);
    }
    let base = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    if base.is_empty() {
        normalize_path(target)
    } else {
        normalize_path(&format!("{}/{}", base, target))
    }
}

/// Relative target from `source_part` to `target_part`, as written in rels.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_dir: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target: Vec<&str> = target_part.split('/').collect();
    let (target_dir, target_file) = target.split_at(target.len() - 1);

    let common = source_dir
        .iter()
        .zip(target_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = vec![".."; source_dir.len() - common];
    segments.extend_from_slice(&target_dir[common..]);
    segments.extend_from_slice(target_file);
    segments.join("/")
}

fn normalize_path(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out.join("/")
}
