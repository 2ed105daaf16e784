//! Shape-tree reader for slide, layout, master and notes parts.

use crate::layout::PlaceholderKind;
use crate::xml::{attr, attr_num, local_name, prefixed_attr, xml_error};
use deckgen_core::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Position and size of a shape in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// The `<p:ph>` reference of a placeholder shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRef {
    pub kind: PlaceholderKind,
    /// `idx` attribute, 0 when absent.
    pub idx: u32,
    pub orient: Option<String>,
    pub sz: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeElement {
    /// `<p:sp>`
    Shape,
    /// `<p:pic>`
    Picture,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphInfo {
    pub text: String,
    pub level: u32,
    /// Explicit `sz` of each run, in hundredths of a point.
    pub run_sizes: Vec<Option<u32>>,
}

/// A top-level shape of a shape tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeInfo {
    pub element: ShapeElement,
    pub id: u32,
    pub name: String,
    pub placeholder: Option<PlaceholderRef>,
    pub bounds: Option<Bounds>,
    pub has_text_body: bool,
    pub paragraphs: Vec<ParagraphInfo>,
    /// First explicit font size inside the text body (list style or run), in
    /// hundredths of a point.
    pub explicit_size: Option<u32>,
    /// Relationship id of the embedded image, for pictures.
    pub embed: Option<String>,
}

impl ShapeInfo {
    fn new(element: ShapeElement) -> Self {
        Self {
            element,
            id: 0,
            name: String::new(),
            placeholder: None,
            bounds: None,
            has_text_body: false,
            paragraphs: Vec::new(),
            explicit_size: None,
            embed: None,
        }
    }

    pub fn placeholder_kind(&self) -> Option<&PlaceholderKind> {
        self.placeholder.as_ref().map(|ph| &ph.kind)
    }

    /// Paragraph texts joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `<p:cSld>` name plus its top-level shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeTree {
    pub name: Option<String>,
    pub shapes: Vec<ShapeInfo>,
}

impl ShapeTree {
    /// Parse the shape tree of a slide-like part.
    ///
    /// Shapes nested inside group shapes are not reported.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut tree = ShapeTree::default();
        let mut current: Option<ShapeInfo> = None;
        let mut group_depth = 0usize;
        let mut in_xfrm = false;
        let mut in_text_body = false;
        let mut in_text = false;
        let mut in_run = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    match local_name(e.name().as_ref()) {
                        b"cSld" => tree.name = attr(e, b"name").filter(|n| !n.is_empty()),
                        b"grpSp" => group_depth += 1,
                        b"sp" if group_depth == 0 => current = Some(ShapeInfo::new(ShapeElement::Shape)),
                        b"pic" if group_depth == 0 => current = Some(ShapeInfo::new(ShapeElement::Picture)),
                        b"xfrm" => in_xfrm = true,
                        b"txBody" => {
                            in_text_body = true;
                            if let Some(ref mut shape) = current {
                                shape.has_text_body = true;
                            }
                        }
                        b"r" if in_text_body => in_run = true,
                        b"t" if in_text_body => in_text = true,
                        _ => {}
                    }
                    if let Some(ref mut shape) = current {
                        read_shape_element(shape, e, in_xfrm, in_text_body, in_run);
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if local_name(e.name().as_ref()) == b"txBody" {
                        if let Some(ref mut shape) = current {
                            shape.has_text_body = true;
                        }
                    }
                    if let Some(ref mut shape) = current {
                        read_shape_element(shape, e, in_xfrm, in_text_body, in_run);
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if in_text {
                        if let Some(paragraph) = current.as_mut().and_then(|s| s.paragraphs.last_mut()) {
                            let text = e
                                .unescape()
                                .map_err(|err| xml_error("Error reading text run", err))?;
                            paragraph.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"grpSp" => group_depth = group_depth.saturating_sub(1),
                    b"sp" | b"pic" if group_depth == 0 => {
                        if let Some(shape) = current.take() {
                            tree.shapes.push(shape);
                        }
                        in_text_body = false;
                        in_text = false;
                        in_run = false;
                        in_xfrm = false;
                    }
                    b"xfrm" => in_xfrm = false,
                    b"txBody" => in_text_body = false,
                    b"r" => in_run = false,
                    b"t" => in_text = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error("Error parsing shape tree", e)),
                _ => {}
            }
        }

        Ok(tree)
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &ShapeInfo> {
        self.shapes.iter().filter(|s| s.placeholder.is_some())
    }

    /// First title or centered-title placeholder.
    pub fn title(&self) -> Option<&ShapeInfo> {
        self.shapes
            .iter()
            .find(|s| s.placeholder_kind().is_some_and(PlaceholderKind::is_title))
    }

    pub fn pictures(&self) -> impl Iterator<Item = &ShapeInfo> {
        self.shapes
            .iter()
            .filter(|s| s.element == ShapeElement::Picture)
    }
}

fn read_shape_element(
    shape: &mut ShapeInfo,
    e: &BytesStart<'_>,
    in_xfrm: bool,
    in_text_body: bool,
    in_run: bool,
) {
    match local_name(e.name().as_ref()) {
        b"cNvPr" => {
            shape.id = attr_num(e, b"id").unwrap_or(0);
            shape.name = attr(e, b"name").unwrap_or_default();
        }
        b"ph" => {
            shape.placeholder = Some(PlaceholderRef {
                kind: PlaceholderKind::from_type_attr(attr(e, b"type").as_deref()),
                idx: attr_num(e, b"idx").unwrap_or(0),
                orient: attr(e, b"orient"),
                sz: attr(e, b"sz"),
            });
        }
        b"off" if in_xfrm => {
            let bounds = shape.bounds.get_or_insert(Bounds { x: 0, y: 0, cx: 0, cy: 0 });
            bounds.x = attr_num(e, b"x").unwrap_or(0);
            bounds.y = attr_num(e, b"y").unwrap_or(0);
        }
        b"ext" if in_xfrm => {
            let bounds = shape.bounds.get_or_insert(Bounds { x: 0, y: 0, cx: 0, cy: 0 });
            bounds.cx = attr_num(e, b"cx").unwrap_or(0);
            bounds.cy = attr_num(e, b"cy").unwrap_or(0);
        }
        b"blip" => {
            if shape.embed.is_none() {
                shape.embed = prefixed_attr(e, b"embed");
            }
        }
        b"p" if in_text_body => shape.paragraphs.push(ParagraphInfo::default()),
        b"br" if in_text_body => {
            if let Some(paragraph) = shape.paragraphs.last_mut() {
                paragraph.text.push('\n');
            }
        }
        b"pPr" if in_text_body => {
            if let Some(paragraph) = shape.paragraphs.last_mut() {
                paragraph.level = attr_num(e, b"lvl").unwrap_or(0);
            }
        }
        b"r" if in_text_body => {
            if let Some(paragraph) = shape.paragraphs.last_mut() {
                paragraph.run_sizes.push(None);
            }
        }
        b"rPr" if in_text_body => {
            let sz = attr_num(e, b"sz");
            if shape.explicit_size.is_none() {
                shape.explicit_size = sz;
            }
            if in_run {
                if let Some(run) = shape.paragraphs.last_mut().and_then(|p| p.run_sizes.last_mut()) {
                    *run = sz;
                }
            }
        }
        b"defRPr" | b"endParaRPr" if in_text_body => {
            if shape.explicit_size.is_none() {
                shape.explicit_size = attr_num(e, b"sz");
            }
        }
        _ => {}
    }
}

/// Level-1 default run size of the master's title style, in hundredths of a
/// point.
pub fn title_style_size(master_xml: &str) -> Result<Option<u32>> {
    let mut reader = Reader::from_str(master_xml);
    reader.trim_text(true);

    let mut in_title_style = false;
    let mut in_level1 = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"titleStyle" => in_title_style = true,
                b"lvl1pPr" if in_title_style => in_level1 = true,
                b"defRPr" if in_level1 => return Ok(attr_num(e, b"sz")),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if in_level1 && local_name(e.name().as_ref()) == b"defRPr" {
                    return Ok(attr_num(e, b"sz"));
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"titleStyle" => return Ok(None),
                b"lvl1pPr" => in_level1 = false,
                _ => {}
            },
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(xml_error("Error parsing title style", e)),
            _ => {}
        }
    }
}
