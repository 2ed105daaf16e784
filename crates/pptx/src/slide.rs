//! A slide being built from a layout, and its XML serialization.

use crate::images::ImageFormat;
use crate::layout::{Layout, PlaceholderKind};
use crate::reader::Bounds;
use crate::xml::{escape, NS_A, NS_P, NS_R, XML_DECLARATION};
use deckgen_core::{Error, Result};
use std::fmt::Write;

/// A placeholder cloned from the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlaceholderShape {
    id: u32,
    name: String,
    kind: PlaceholderKind,
    idx: u32,
    orient: Option<String>,
    sz: Option<String>,
    /// `None` when the placeholder has no text body.
    paragraphs: Option<Vec<String>>,
    /// Explicit run size in hundredths of a point.
    run_size: Option<u32>,
}

/// A picture filling a picture placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PictureShape {
    id: u32,
    name: String,
    idx: u32,
    bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SlideShape {
    Placeholder(PlaceholderShape),
    Picture(PictureShape),
}

/// Image bytes attached to a new slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
}

/// A slide appended to the template, not yet serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlide {
    layout_index: usize,
    shapes: Vec<SlideShape>,
    image: Option<SlideImage>,
    notes: Option<String>,
}

impl NewSlide {
    /// Start a slide from a layout, cloning its placeholders.
    ///
    /// Date, footer and slide-number placeholders are not cloned. Text-capable
    /// placeholders get an empty text body.
    pub fn from_layout(layout_index: usize, layout: &Layout) -> Self {
        let shapes = layout
            .placeholders
            .iter()
            .filter(|p| p.kind.is_cloned_to_slide())
            .zip(2u32..)
            .map(|(p, id)| {
                SlideShape::Placeholder(PlaceholderShape {
                    id,
                    name: if p.name.is_empty() {
                        format!("Placeholder {}", id - 1)
                    } else {
                        p.name.clone()
                    },
                    kind: p.kind.clone(),
                    idx: p.idx,
                    orient: p.orient.clone(),
                    sz: p.sz.clone(),
                    paragraphs: p.kind.accepts_text().then(Vec::new),
                    run_size: None,
                })
            })
            .collect();

        Self {
            layout_index,
            shapes,
            image: None,
            notes: None,
        }
    }

    pub fn layout_index(&self) -> usize {
        self.layout_index
    }

    fn placeholders(&self) -> impl Iterator<Item = &PlaceholderShape> {
        self.shapes.iter().filter_map(|s| match s {
            SlideShape::Placeholder(p) => Some(p),
            SlideShape::Picture(_) => None,
        })
    }

    fn title_mut(&mut self) -> Option<&mut PlaceholderShape> {
        self.shapes.iter_mut().find_map(|s| match s {
            SlideShape::Placeholder(p) if p.kind.is_title() && p.paragraphs.is_some() => Some(p),
            _ => None,
        })
    }

    pub fn has_title(&self) -> bool {
        self.placeholders().any(|p| p.kind.is_title())
    }

    /// Set the title text. Returns false when the layout has no title slot.
    pub fn set_title(&mut self, title: &str) -> bool {
        match self.title_mut() {
            Some(placeholder) => {
                placeholder.paragraphs = Some(split_paragraphs(title));
                true
            }
            None => false,
        }
    }

    /// Give the title runs an explicit size, in hundredths of a point.
    pub fn set_title_size(&mut self, size: u32) -> Result<()> {
        let placeholder = self
            .title_mut()
            .ok_or_else(|| Error::Build("Slide has no title placeholder".to_string()))?;
        placeholder.run_size = Some(size);
        Ok(())
    }

    /// Fill the first non-title text placeholder with bullets.
    ///
    /// The first bullet becomes the slot's text; each further bullet is one
    /// more top-level paragraph. Returns false when there is no such slot.
    pub fn set_body(&mut self, bullets: &[String]) -> bool {
        let body = self.shapes.iter_mut().find_map(|s| match s {
            SlideShape::Placeholder(p) if !p.kind.is_title() && p.paragraphs.is_some() => Some(p),
            _ => None,
        });
        let Some(body) = body else {
            return false;
        };

        let mut paragraphs = Vec::with_capacity(bullets.len());
        if let Some((first, rest)) = bullets.split_first() {
            paragraphs.extend(split_paragraphs(first));
            paragraphs.extend(rest.iter().cloned());
        }
        body.paragraphs = Some(paragraphs);
        true
    }

    pub fn has_picture_slot(&self) -> bool {
        self.placeholders().any(|p| p.kind.is_picture())
    }

    /// Replace the first picture placeholder with a picture of `data`.
    pub fn insert_picture(&mut self, data: Vec<u8>, bounds: Bounds) -> Result<()> {
        let format = ImageFormat::detect(&data)?;
        if bounds.cx <= 0 || bounds.cy <= 0 {
            return Err(Error::Build(format!(
                "Picture placeholder has an empty extent ({}x{})",
                bounds.cx, bounds.cy
            )));
        }

        let index = self
            .shapes
            .iter()
            .position(|s| matches!(s, SlideShape::Placeholder(p) if p.kind.is_picture()))
            .ok_or_else(|| Error::Build("Slide has no picture placeholder".to_string()))?;

        if let SlideShape::Placeholder(p) = &self.shapes[index] {
            let picture = PictureShape {
                id: p.id,
                name: p.name.clone(),
                idx: p.idx,
                bounds,
            };
            self.shapes[index] = SlideShape::Picture(picture);
        }
        self.image = Some(SlideImage { data, format });
        Ok(())
    }

    pub fn image(&self) -> Option<&SlideImage> {
        self.image.as_ref()
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = Some(notes.into());
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Serialize the slide part.
    ///
    /// `image_rel_id` must be set when the slide carries a picture.
    pub fn to_xml(&self, image_rel_id: Option<&str>) -> Result<String> {
        let mut xml = String::with_capacity(2048);
        xml.push_str(XML_DECLARATION);
        let _ = write!(
            xml,
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            NS_A, NS_R, NS_P
        );
        xml.push_str("<p:cSld><p:spTree>");
        write_group_properties(&mut xml);

        for shape in &self.shapes {
            match shape {
                SlideShape::Placeholder(p) => write_placeholder(&mut xml, p),
                SlideShape::Picture(pic) => {
                    let rel_id = image_rel_id.ok_or_else(|| {
                        Error::Build("Picture shape written without an image relationship".to_string())
                    })?;
                    write_picture(&mut xml, pic, rel_id);
                }
            }
        }

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        Ok(xml)
    }
}

/// Text-frame semantics: each line is its own paragraph.
pub(crate) fn split_paragraphs(text: &str) -> Vec<String> {
    text.split('\n').map(|line| line.trim_end_matches('\r').to_string()).collect()
}

pub(crate) fn write_group_properties(xml: &mut String) {
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#);
    xml.push_str(r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);
}

fn write_ph(xml: &mut String, kind: &PlaceholderKind, idx: u32, orient: Option<&str>, sz: Option<&str>) {
    xml.push_str("<p:ph");
    if let Some(type_attr) = kind.type_attr() {
        let _ = write!(xml, r#" type="{}""#, escape(type_attr));
    }
    if let Some(orient) = orient {
        let _ = write!(xml, r#" orient="{}""#, escape(orient));
    }
    if let Some(sz) = sz {
        let _ = write!(xml, r#" sz="{}""#, escape(sz));
    }
    if idx != 0 {
        let _ = write!(xml, r#" idx="{}""#, idx);
    }
    xml.push_str("/>");
}

fn write_placeholder(xml: &mut String, p: &PlaceholderShape) {
    let _ = write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>"#,
        p.id,
        escape(&p.name)
    );
    write_ph(xml, &p.kind, p.idx, p.orient.as_deref(), p.sz.as_deref());
    xml.push_str("</p:nvPr></p:nvSpPr><p:spPr/>");

    if let Some(ref paragraphs) = p.paragraphs {
        xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
        write_paragraphs(xml, paragraphs, p.run_size);
        xml.push_str("</p:txBody>");
    }
    xml.push_str("</p:sp>");
}

/// Write `<a:p>` elements; an empty list still yields one empty paragraph.
pub(crate) fn write_paragraphs(xml: &mut String, paragraphs: &[String], run_size: Option<u32>) {
    if paragraphs.is_empty() {
        xml.push_str("<a:p/>");
        return;
    }

    let size_attr = run_size.map(|sz| format!(r#" sz="{}""#, sz)).unwrap_or_default();
    for paragraph in paragraphs {
        if paragraph.is_empty() {
            let _ = write!(xml, r#"<a:p><a:endParaRPr lang="en-US"{}/></a:p>"#, size_attr);
            continue;
        }

        xml.push_str("<a:p>");
        for (i, line) in paragraph.split('\n').enumerate() {
            if i > 0 {
                let _ = write!(xml, r#"<a:br><a:rPr lang="en-US"{}/></a:br>"#, size_attr);
            }
            if line.is_empty() {
                continue;
            }
            let _ = write!(
                xml,
                r#"<a:r><a:rPr lang="en-US"{} dirty="0"/><a:t>{}</a:t></a:r>"#,
                size_attr,
                escape(line)
            );
        }
        xml.push_str("</a:p>");
    }
}

fn write_picture(xml: &mut String, pic: &PictureShape, rel_id: &str) {
    let _ = write!(
        xml,
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="{}"/><p:cNvPicPr><a:picLocks noGrp="1" noChangeAspect="1"/></p:cNvPicPr><p:nvPr>"#,
        pic.id,
        escape(&pic.name)
    );
    write_ph(xml, &PlaceholderKind::Picture, pic.idx, None, None);
    xml.push_str("</p:nvPr></p:nvPicPr>");
    let _ = write!(
        xml,
        r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
        escape(rel_id)
    );
    let _ = write!(
        xml,
        r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
        pic.bounds.x, pic.bounds.y, pic.bounds.cx, pic.bounds.cy
    );
    xml.push_str("</p:pic>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Placeholder;
    use crate::reader::{ShapeElement, ShapeTree};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x02\0\0\0";

    fn placeholder(kind: PlaceholderKind, idx: u32, name: &str) -> Placeholder {
        Placeholder {
            shape_id: idx + 2,
            name: name.to_string(),
            kind,
            idx,
            orient: None,
            sz: None,
            bounds: None,
            explicit_size: None,
        }
    }

    fn layout() -> Layout {
        Layout {
            name: "Picture with Caption".to_string(),
            part_name: "ppt/slideLayouts/slideLayout9.xml".to_string(),
            placeholders: vec![
                placeholder(PlaceholderKind::Title, 0, "Title 1"),
                placeholder(PlaceholderKind::Picture, 1, "Picture Placeholder 2"),
                placeholder(PlaceholderKind::Body, 2, "Text Placeholder 3"),
                placeholder(PlaceholderKind::Date, 10, "Date Placeholder 4"),
            ],
        }
    }

    fn bullets(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_clones_placeholders_except_date() {
        let slide = NewSlide::from_layout(3, &layout());
        let tree = ShapeTree::parse(&slide.to_xml(None).unwrap()).unwrap();
        let kinds: Vec<_> = tree.shapes.iter().map(|s| s.placeholder_kind().cloned()).collect();
        assert_eq!(
            kinds,
            vec![
                Some(PlaceholderKind::Title),
                Some(PlaceholderKind::Picture),
                Some(PlaceholderKind::Body)
            ]
        );
        assert_eq!(tree.shapes.iter().map(|s| s.id).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert!(!tree.shapes[1].has_text_body);
        assert_eq!(slide.layout_index(), 3);
    }

    #[test]
    fn test_title_and_body_text() {
        let mut slide = NewSlide::from_layout(0, &layout());
        assert!(slide.set_title("Q3 <Roadmap> & goals"));
        assert!(slide.set_body(&bullets(&["First", "Second", "Third"])));

        let tree = ShapeTree::parse(&slide.to_xml(None).unwrap()).unwrap();
        assert_eq!(tree.title().unwrap().text(), "Q3 <Roadmap> & goals");
        let body = &tree.shapes[2];
        let texts: Vec<_> = body.paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["First", "Second", "Third"]);
        assert!(body.paragraphs.iter().all(|p| p.level == 0));
    }

    #[test]
    fn test_empty_bullets_clear_the_body() {
        let mut slide = NewSlide::from_layout(0, &layout());
        assert!(slide.set_body(&[]));
        let tree = ShapeTree::parse(&slide.to_xml(None).unwrap()).unwrap();
        assert_eq!(tree.shapes[2].text(), "");
    }

    #[test]
    fn test_title_size_is_written_on_runs() {
        let mut slide = NewSlide::from_layout(0, &layout());
        slide.set_title("Big");
        slide.set_title_size(4000).unwrap();
        let tree = ShapeTree::parse(&slide.to_xml(None).unwrap()).unwrap();
        assert_eq!(tree.title().unwrap().paragraphs[0].run_sizes, vec![Some(4000)]);
    }

    #[test]
    fn test_layout_without_title_or_body() {
        let blank = Layout {
            name: "Blank".to_string(),
            part_name: "ppt/slideLayouts/slideLayout7.xml".to_string(),
            placeholders: vec![placeholder(PlaceholderKind::SlideNumber, 12, "Slide Number")],
        };
        let mut slide = NewSlide::from_layout(6, &blank);
        assert!(!slide.has_title());
        assert!(!slide.set_title("Ignored"));
        assert!(slide.set_title_size(4000).is_err());
        assert!(!slide.set_body(&bullets(&["a"])));
        assert!(!slide.has_picture_slot());
    }

    #[test]
    fn test_insert_picture_replaces_placeholder() {
        let mut slide = NewSlide::from_layout(0, &layout());
        assert!(slide.has_picture_slot());
        let bounds = Bounds { x: 10, y: 20, cx: 300, cy: 200 };
        slide.insert_picture(PNG.to_vec(), bounds).unwrap();

        assert!(!slide.has_picture_slot());
        assert_eq!(slide.image().unwrap().format, ImageFormat::Png);
        assert!(slide.to_xml(None).is_err());

        let tree = ShapeTree::parse(&slide.to_xml(Some("rId2")).unwrap()).unwrap();
        let pic = &tree.shapes[1];
        assert_eq!(pic.element, ShapeElement::Picture);
        assert_eq!(pic.embed.as_deref(), Some("rId2"));
        assert_eq!(pic.bounds, Some(bounds));
        assert_eq!(pic.placeholder.as_ref().unwrap().idx, 1);
    }

    #[test]
    fn test_insert_corrupt_picture_fails_without_change() {
        let mut slide = NewSlide::from_layout(0, &layout());
        let bounds = Bounds { x: 0, y: 0, cx: 1, cy: 1 };
        assert!(slide.insert_picture(b"garbage".to_vec(), bounds).is_err());
        assert!(slide.has_picture_slot());
        assert!(slide.image().is_none());
    }

    #[test]
    fn test_multiline_bullets() {
        let mut slide = NewSlide::from_layout(0, &layout());
        slide.set_body(&bullets(&["one\ntwo", "three\nfour"]));
        let tree = ShapeTree::parse(&slide.to_xml(None).unwrap()).unwrap();
        let texts: Vec<_> = tree.shapes[2].paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three\nfour"]);
    }
}
