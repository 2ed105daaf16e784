//! Placeholder types, template layouts and layout selection.

use crate::reader::{Bounds, ShapeInfo, ShapeTree};
use deckgen_core::normalize::{contains_ignore_case, eq_ignore_case};
use deckgen_core::{Error, Result};

/// Archetype names tried, in order, when the hint matches no layout exactly.
pub const LAYOUT_PRIORITY: [&str; 6] = [
    "Title and Content",
    "Title and Vertical Text",
    "Two Content",
    "Title Only",
    "Section Header",
    "Content with Caption",
];

/// `ST_PlaceholderType`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Title,
    CenteredTitle,
    Subtitle,
    Body,
    /// `obj`, also the type of a `<p:ph>` without a `type` attribute.
    Object,
    Picture,
    Chart,
    Table,
    Diagram,
    Media,
    ClipArt,
    Date,
    Footer,
    SlideNumber,
    Header,
    SlideImage,
    Other(String),
}

impl PlaceholderKind {
    pub fn from_type_attr(value: Option<&str>) -> Self {
        match value {
            None | Some("obj") => Self::Object,
            Some("title") => Self::Title,
            Some("ctrTitle") => Self::CenteredTitle,
            Some("subTitle") => Self::Subtitle,
            Some("body") => Self::Body,
            Some("pic") => Self::Picture,
            Some("chart") => Self::Chart,
            Some("tbl") => Self::Table,
            Some("dgm") => Self::Diagram,
            Some("media") => Self::Media,
            Some("clipArt") => Self::ClipArt,
            Some("dt") => Self::Date,
            Some("ftr") => Self::Footer,
            Some("sldNum") => Self::SlideNumber,
            Some("hdr") => Self::Header,
            Some("sldImg") => Self::SlideImage,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Value for the `type` attribute; `None` for `obj`, which is the default.
    pub fn type_attr(&self) -> Option<&str> {
        Some(match self {
            Self::Object => return None,
            Self::Title => "title",
            Self::CenteredTitle => "ctrTitle",
            Self::Subtitle => "subTitle",
            Self::Body => "body",
            Self::Picture => "pic",
            Self::Chart => "chart",
            Self::Table => "tbl",
            Self::Diagram => "dgm",
            Self::Media => "media",
            Self::ClipArt => "clipArt",
            Self::Date => "dt",
            Self::Footer => "ftr",
            Self::SlideNumber => "sldNum",
            Self::Header => "hdr",
            Self::SlideImage => "sldImg",
            Self::Other(other) => other.as_str(),
        })
    }

    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title | Self::CenteredTitle)
    }

    pub fn is_picture(&self) -> bool {
        matches!(self, Self::Picture)
    }

    /// Whether a new slide gets a text body for this placeholder.
    pub fn accepts_text(&self) -> bool {
        !matches!(
            self,
            Self::Picture
                | Self::Chart
                | Self::Table
                | Self::Diagram
                | Self::Media
                | Self::ClipArt
                | Self::SlideImage
        )
    }

    /// Date, footer and slide-number placeholders stay on the layout.
    pub fn is_cloned_to_slide(&self) -> bool {
        !matches!(self, Self::Date | Self::Footer | Self::SlideNumber)
    }

    /// The master placeholder type a layout placeholder inherits from.
    pub fn master_kind(&self) -> Self {
        match self {
            Self::Title | Self::CenteredTitle => Self::Title,
            Self::Date | Self::Footer | Self::SlideNumber | Self::Header | Self::SlideImage => self.clone(),
            _ => Self::Body,
        }
    }
}

/// A placeholder slot on a layout or master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub shape_id: u32,
    pub name: String,
    pub kind: PlaceholderKind,
    pub idx: u32,
    pub orient: Option<String>,
    pub sz: Option<String>,
    pub bounds: Option<Bounds>,
    /// Explicit font size in the placeholder's text body, hundredths of a point.
    pub explicit_size: Option<u32>,
}

impl Placeholder {
    fn from_shape(shape: &ShapeInfo) -> Option<Self> {
        let ph = shape.placeholder.as_ref()?;
        Some(Self {
            shape_id: shape.id,
            name: shape.name.clone(),
            kind: ph.kind.clone(),
            idx: ph.idx,
            orient: ph.orient.clone(),
            sz: ph.sz.clone(),
            bounds: shape.bounds,
            explicit_size: shape.explicit_size,
        })
    }

    /// Placeholders of a parsed shape tree, in document order.
    pub fn collect(tree: &ShapeTree) -> Vec<Self> {
        tree.placeholders().filter_map(Self::from_shape).collect()
    }
}

/// A slide layout of the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// `cSld` name, or `layout-{index}` when the layout is unnamed.
    pub name: String,
    pub part_name: String,
    pub placeholders: Vec<Placeholder>,
}

impl Layout {
    pub fn from_tree(index: usize, part_name: impl Into<String>, tree: &ShapeTree) -> Self {
        Self {
            name: tree
                .name
                .clone()
                .unwrap_or_else(|| format!("layout-{}", index)),
            part_name: part_name.into(),
            placeholders: Placeholder::collect(tree),
        }
    }

    pub fn title(&self) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.kind.is_title())
    }

    pub fn has_picture_slot(&self) -> bool {
        self.placeholders.iter().any(|p| p.kind.is_picture())
    }
}

/// Pick the layout for a hint.
///
/// Tries a case-insensitive exact name match, then the first archetype of
/// [`LAYOUT_PRIORITY`] contained in any layout name, then the second layout
/// (or the first when there is only one).
pub fn choose_layout<S: AsRef<str>>(names: &[S], hint: &str) -> Result<usize> {
    if names.is_empty() {
        return Err(Error::Build("Template has no slide layouts".to_string()));
    }

    if let Some(i) = names.iter().position(|n| eq_ignore_case(n.as_ref(), hint)) {
        return Ok(i);
    }

    for archetype in LAYOUT_PRIORITY {
        if let Some(i) = names
            .iter()
            .position(|n| contains_ignore_case(n.as_ref(), archetype))
        {
            return Ok(i);
        }
    }

    Ok(if names.len() > 1 { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_ignores_case() {
        let names = ["Title and Content", "Blank"];
        assert_eq!(choose_layout(&names, "title and content").unwrap(), 0);
        assert_eq!(choose_layout(&names, "BLANK").unwrap(), 1);
    }

    #[test]
    fn test_priority_archetype_beats_fallback() {
        let names = ["Cover", "Corporate Title Only", "Acme Two Content"];
        // "Two Content" comes before "Title Only" in the priority list.
        assert_eq!(choose_layout(&names, "Comparison").unwrap(), 2);
    }

    #[test]
    fn test_fallback_to_second_layout() {
        assert_eq!(choose_layout(&["Custom1", "Custom2"], "Nonexistent Layout").unwrap(), 1);
        assert_eq!(choose_layout(&["Custom1"], "Nonexistent Layout").unwrap(), 0);
    }

    #[test]
    fn test_empty_hint_uses_archetypes() {
        let names = vec!["Title Slide".to_string(), "Section Header".to_string()];
        assert_eq!(choose_layout(&names, "").unwrap(), 1);
    }

    #[test]
    fn test_no_layouts_is_an_error() {
        let names: [&str; 0] = [];
        assert!(matches!(choose_layout(&names, "x"), Err(Error::Build(_))));
    }

    #[test]
    fn test_placeholder_kind_attrs() {
        for attr in ["title", "ctrTitle", "subTitle", "body", "pic", "dt", "sldNum", "custom"] {
            assert_eq!(PlaceholderKind::from_type_attr(Some(attr)).type_attr(), Some(attr));
        }
        assert_eq!(PlaceholderKind::from_type_attr(None), PlaceholderKind::Object);
        assert_eq!(PlaceholderKind::Object.type_attr(), None);
    }

    #[test]
    fn test_placeholder_kind_rules() {
        assert!(PlaceholderKind::CenteredTitle.is_title());
        assert!(PlaceholderKind::Subtitle.accepts_text());
        assert!(PlaceholderKind::Object.accepts_text());
        assert!(!PlaceholderKind::Picture.accepts_text());
        assert!(!PlaceholderKind::Table.accepts_text());
        assert!(!PlaceholderKind::Footer.is_cloned_to_slide());
        assert!(PlaceholderKind::Picture.is_cloned_to_slide());
        assert_eq!(PlaceholderKind::CenteredTitle.master_kind(), PlaceholderKind::Title);
        assert_eq!(PlaceholderKind::Picture.master_kind(), PlaceholderKind::Body);
        assert_eq!(PlaceholderKind::Footer.master_kind(), PlaceholderKind::Footer);
    }
}
