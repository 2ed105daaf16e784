//! The in-memory template document: layouts, existing slides, appended
//! slides and serialization back to a package.

use crate::layout::{Layout, Placeholder, PlaceholderKind};
use crate::notes::{notes_master_xml, notes_slide_xml, read_notes_text};
use crate::package::{Package, CONTENT_TYPES_PART};
use crate::reader::{title_style_size, Bounds, ShapeTree};
use crate::rels::{
    rels_part_for, relative_target, resolve_target, ContentTypes, Relationships, CT_NOTES_MASTER,
    CT_NOTES_SLIDE, CT_PRESENTATION, CT_RELATIONSHIPS, CT_SLIDE, CT_TEMPLATE, CT_THEME, REL_IMAGE,
    REL_NOTES_MASTER, REL_NOTES_SLIDE, REL_OFFICE_DOCUMENT, REL_SLIDE, REL_SLIDE_LAYOUT, REL_THEME,
};
use crate::slide::NewSlide;
use crate::xml::{attr_num, local_name, prefixed_attr, xml_error};
use deckgen_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

const ROOT_RELS_PART: &str = "_rels/.rels";
const FIRST_SLIDE_ID: u32 = 256;

/// Elements of `<p:presentation>` that follow `<p:sldIdLst>`.
const AFTER_SLIDE_LIST: [&[u8]; 11] = [
    b"sldSz",
    b"notesSz",
    b"smartTags",
    b"embeddedFontLst",
    b"custShowLst",
    b"photoAlbum",
    b"custDataLst",
    b"kinsoku",
    b"defaultTextStyle",
    b"modifyVerifier",
    b"extLst",
];

/// A slide read back from a document.
#[derive(Debug, Clone)]
pub struct SlideView {
    pub part_name: String,
    pub layout_name: Option<String>,
    pub tree: ShapeTree,
    pub notes: String,
}

impl SlideView {
    pub fn title(&self) -> Option<String> {
        self.tree.title().map(|s| s.text())
    }

    /// Paragraph texts of the first non-title text placeholder.
    pub fn body_paragraphs(&self) -> Vec<String> {
        self.tree
            .placeholders()
            .find(|s| s.has_text_body && s.placeholder_kind().is_some_and(|k| !k.is_title()))
            .map(|s| s.paragraphs.iter().map(|p| p.text.clone()).collect())
            .unwrap_or_default()
    }
}

/// An opened template, plus any slides appended to it.
///
/// Each build owns its own instance; nothing is shared between documents.
#[derive(Debug, Clone)]
pub struct TemplateDocument {
    package: Package,
    content_types: ContentTypes,
    presentation_part: String,
    presentation_rels: Relationships,
    master_part: String,
    master_placeholders: Vec<Placeholder>,
    master_title_size: Option<u32>,
    layouts: Vec<Layout>,
    existing_slides: Vec<String>,
    max_slide_id: u32,
    notes_master_part: Option<String>,
    new_slides: Vec<NewSlide>,
}

impl TemplateDocument {
    /// Open a `.pptx` or `.potx` from bytes and read its layout list.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let package = Package::from_bytes(bytes)?;
        let content_types = ContentTypes::parse(&package.part_str(CONTENT_TYPES_PART)?)?;

        let root_rels = Relationships::parse(&package.part_str(ROOT_RELS_PART)?)?;
        let presentation_part = root_rels
            .first_of_type(REL_OFFICE_DOCUMENT)
            .map(|r| resolve_target("", &r.target))
            .ok_or_else(|| Error::Build("Package has no main presentation part".to_string()))?;

        let presentation_xml = package.part_str(&presentation_part)?;
        let presentation_rels =
            Relationships::parse(&package.part_str(&rels_part_for(&presentation_part))?)?;
        let target_of = |rel_id: &str| {
            presentation_rels
                .get(rel_id)
                .map(|r| resolve_target(&presentation_part, &r.target))
        };

        let slide_ids = id_list(&presentation_xml, b"sldIdLst", b"sldId")?;
        let max_slide_id = slide_ids.iter().filter_map(|(id, _)| *id).max().unwrap_or(0);
        let existing_slides = slide_ids
            .iter()
            .filter_map(|(_, rel_id)| {
                let target = target_of(rel_id);
                if target.is_none() {
                    log::warn!("Slide relationship '{}' is missing; slide ignored", rel_id);
                }
                target
            })
            .collect();

        let master_part = id_list(&presentation_xml, b"sldMasterIdLst", b"sldMasterId")?
            .first()
            .and_then(|(_, rel_id)| target_of(rel_id))
            .ok_or_else(|| Error::Build("Presentation has no slide master".to_string()))?;

        let notes_master_part = id_list(&presentation_xml, b"notesMasterIdLst", b"notesMasterId")?
            .first()
            .and_then(|(_, rel_id)| target_of(rel_id))
            .filter(|part| package.contains(part));

        let master_xml = package.part_str(&master_part)?;
        let master_tree = ShapeTree::parse(&master_xml)?;
        let master_title_size = title_style_size(&master_xml)?;
        let layouts = read_layouts(&package, &master_part, &master_xml)?;

        log::debug!(
            "Opened template: {} layout(s), {} existing slide(s)",
            layouts.len(),
            slide_ids.len()
        );

        Ok(Self {
            package,
            content_types,
            presentation_part,
            presentation_rels,
            master_part,
            master_placeholders: Placeholder::collect(&master_tree),
            master_title_size,
            layouts,
            existing_slides,
            max_slide_id,
            notes_master_part,
            new_slides: Vec::new(),
        })
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn layout_names(&self) -> Vec<&str> {
        self.layouts.iter().map(|l| l.name.as_str()).collect()
    }

    fn layout(&self, index: usize) -> Result<&Layout> {
        self.layouts
            .get(index)
            .ok_or_else(|| Error::Build(format!("Layout index {} out of range", index)))
    }

    /// Slides present in the template before any were appended.
    pub fn existing_slide_count(&self) -> usize {
        self.existing_slides.len()
    }

    /// Start a slide from the layout at `layout_index`.
    pub fn new_slide(&self, layout_index: usize) -> Result<NewSlide> {
        Ok(NewSlide::from_layout(layout_index, self.layout(layout_index)?))
    }

    /// Append a finished slide.
    pub fn push_slide(&mut self, slide: NewSlide) {
        self.new_slides.push(slide);
    }

    fn master_placeholder(&self, kind: &PlaceholderKind) -> Option<&Placeholder> {
        let wanted = kind.master_kind();
        self.master_placeholders
            .iter()
            .find(|p| p.kind.master_kind() == wanted)
    }

    /// Title font size a new slide on this layout inherits, in hundredths of a
    /// point, or `None` when nothing sets one explicitly.
    pub fn effective_title_size(&self, layout_index: usize) -> Result<Option<u32>> {
        let layout = self.layout(layout_index)?;
        let title = layout
            .title()
            .ok_or_else(|| Error::Build(format!("Layout '{}' has no title placeholder", layout.name)))?;

        Ok(title
            .explicit_size
            .or_else(|| self.master_placeholder(&title.kind).and_then(|p| p.explicit_size))
            .or(self.master_title_size))
    }

    /// Bounds of the first picture placeholder of a layout, inherited from the
    /// master when the layout does not position it.
    pub fn picture_bounds(&self, layout_index: usize) -> Result<Bounds> {
        let layout = self.layout(layout_index)?;
        let slot = layout
            .placeholders
            .iter()
            .find(|p| p.kind.is_picture())
            .ok_or_else(|| Error::Build(format!("Layout '{}' has no picture placeholder", layout.name)))?;

        slot.bounds
            .or_else(|| self.master_placeholder(&slot.kind).and_then(|p| p.bounds))
            .ok_or_else(|| {
                Error::Build(format!(
                    "Picture placeholder '{}' on layout '{}' has no position",
                    slot.name, layout.name
                ))
            })
    }

    fn slide_part(&self, index: usize) -> Result<&str> {
        self.existing_slides
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::Build(format!("Slide index {} out of range", index)))
    }

    fn part_rels(&self, part: &str) -> Result<Relationships> {
        match self.package.part(&rels_part_for(part)) {
            Some(_) => Relationships::parse(&self.package.part_str(&rels_part_for(part))?),
            None => Ok(Relationships::default()),
        }
    }

    /// Bytes of every picture on an existing slide, one result per picture.
    pub fn existing_picture_blobs(&self, index: usize) -> Result<Vec<Result<&[u8]>>> {
        let part = self.slide_part(index)?;
        let tree = ShapeTree::parse(&self.package.part_str(part)?)?;
        let rels = self.part_rels(part)?;

        Ok(tree
            .pictures()
            .map(|picture| {
                let rel_id = picture.embed.as_deref().ok_or_else(|| {
                    Error::Image(format!("Picture '{}' has no embedded image", picture.name))
                })?;
                let rel = rels
                    .get(rel_id)
                    .filter(|r| !r.external)
                    .ok_or_else(|| Error::Image(format!("Image relationship '{}' not found", rel_id)))?;
                let media = resolve_target(part, &rel.target);
                self.package
                    .part(&media)
                    .ok_or_else(|| Error::Image(format!("Image part '{}' not found", media)))
            })
            .collect())
    }

    /// Read an existing slide back: shapes, layout name and notes text.
    pub fn slide(&self, index: usize) -> Result<SlideView> {
        let part = self.slide_part(index)?;
        let tree = ShapeTree::parse(&self.package.part_str(part)?)?;
        let rels = self.part_rels(part)?;

        let layout_name = rels.first_of_type(REL_SLIDE_LAYOUT).and_then(|r| {
            let layout_part = resolve_target(part, &r.target);
            self.layouts
                .iter()
                .find(|l| l.part_name == layout_part)
                .map(|l| l.name.clone())
        });

        let notes = match rels.first_of_type(REL_NOTES_SLIDE) {
            Some(rel) => read_notes_text(&self.package.part_str(&resolve_target(part, &rel.target))?)?,
            None => String::new(),
        };

        Ok(SlideView {
            part_name: part.to_string(),
            layout_name,
            tree,
            notes,
        })
    }

    /// Write the document, with appended slides, as package bytes.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let TemplateDocument {
            mut package,
            mut content_types,
            presentation_part,
            mut presentation_rels,
            master_part,
            layouts,
            max_slide_id,
            notes_master_part,
            new_slides,
            ..
        } = self;

        if content_types.content_type(&presentation_part) == Some(CT_TEMPLATE) {
            content_types.set_override(&presentation_part, CT_PRESENTATION);
        }
        content_types.ensure_default("rels", CT_RELATIONSHIPS);
        content_types.ensure_default("xml", "application/xml");

        let needs_notes = new_slides.iter().any(|s| s.notes().is_some());
        let mut new_notes_master_rel = None;
        let notes_master_part = match notes_master_part {
            Some(part) => Some(part),
            None if needs_notes => {
                let part = add_notes_master(&mut package, &mut content_types, &master_part)?;
                new_notes_master_rel = Some(presentation_rels.add(
                    REL_NOTES_MASTER,
                    relative_target(&presentation_part, &part),
                ));
                Some(part)
            }
            None => None,
        };

        let mut slide_entries = Vec::with_capacity(new_slides.len());
        let mut next_id = max_slide_id.max(FIRST_SLIDE_ID - 1) + 1;

        for slide in &new_slides {
            let layout = layouts.get(slide.layout_index()).ok_or_else(|| {
                Error::Build(format!("Layout index {} out of range", slide.layout_index()))
            })?;
            let part = package.next_part_name("ppt/slides/slide", ".xml");
            let mut rels = Relationships::default();
            rels.add(REL_SLIDE_LAYOUT, relative_target(&part, &layout.part_name));

            let image_rel = match slide.image() {
                Some(image) => {
                    let extension = image.format.extension();
                    let media = match package.find_part_with_data("ppt/media/", &image.data) {
                        Some(existing) => existing.to_string(),
                        None => {
                            let name = package.next_part_name("ppt/media/image", &format!(".{}", extension));
                            package.set_part(name.clone(), image.data.clone());
                            name
                        }
                    };
                    content_types.ensure_default(extension, image.format.content_type());
                    Some(rels.add(REL_IMAGE, relative_target(&part, &media)))
                }
                None => None,
            };
            package.set_part(part.clone(), slide.to_xml(image_rel.as_deref())?.into_bytes());

            if let (Some(notes), Some(notes_master)) = (slide.notes(), notes_master_part.as_deref()) {
                let notes_part = package.next_part_name("ppt/notesSlides/notesSlide", ".xml");
                package.set_part(notes_part.clone(), notes_slide_xml(notes).into_bytes());

                let mut notes_rels = Relationships::default();
                notes_rels.add(REL_NOTES_MASTER, relative_target(&notes_part, notes_master));
                notes_rels.add(REL_SLIDE, relative_target(&notes_part, &part));
                package.set_part(rels_part_for(&notes_part), notes_rels.to_xml().into_bytes());
                content_types.set_override(&notes_part, CT_NOTES_SLIDE);

                rels.add(REL_NOTES_SLIDE, relative_target(&part, &notes_part));
            }

            package.set_part(rels_part_for(&part), rels.to_xml().into_bytes());
            content_types.set_override(&part, CT_SLIDE);

            let rel_id = presentation_rels.add(REL_SLIDE, relative_target(&presentation_part, &part));
            slide_entries.push((next_id, rel_id));
            next_id += 1;
        }

        let presentation_xml = package.part_str(&presentation_part)?;
        let presentation_xml =
            rewrite_presentation(&presentation_xml, &slide_entries, new_notes_master_rel.as_deref())?;
        package.set_part(presentation_part.clone(), presentation_xml.into_bytes());
        package.set_part(
            rels_part_for(&presentation_part),
            presentation_rels.to_xml().into_bytes(),
        );
        package.set_part(CONTENT_TYPES_PART, content_types.to_xml().into_bytes());

        log::debug!("Serializing document with {} new slide(s)", new_slides.len());
        package.to_bytes()
    }
}

/// Layouts of the master, in `sldLayoutIdLst` order.
fn read_layouts(package: &Package, master_part: &str, master_xml: &str) -> Result<Vec<Layout>> {
    let master_rels = Relationships::parse(&package.part_str(&rels_part_for(master_part))?)?;

    let listed = id_list(master_xml, b"sldLayoutIdLst", b"sldLayoutId")?;
    let layout_parts: Vec<String> = if listed.is_empty() {
        master_rels
            .iter()
            .filter(|r| !r.external && r.is_type(REL_SLIDE_LAYOUT))
            .map(|r| resolve_target(master_part, &r.target))
            .collect()
    } else {
        listed
            .iter()
            .map(|(_, rel_id)| {
                master_rels
                    .get(rel_id)
                    .map(|r| resolve_target(master_part, &r.target))
                    .ok_or_else(|| Error::Build(format!("Layout relationship '{}' not found", rel_id)))
            })
            .collect::<Result<_>>()?
    };

    layout_parts
        .into_iter()
        .enumerate()
        .map(|(index, part)| {
            let tree = ShapeTree::parse(&package.part_str(&part)?)?;
            Ok(Layout::from_tree(index, part, &tree))
        })
        .collect()
}

/// Create a notes master part with its own copy of the slide master's theme.
fn add_notes_master(
    package: &mut Package,
    content_types: &mut ContentTypes,
    master_part: &str,
) -> Result<String> {
    let part = package.next_part_name("ppt/notesMasters/notesMaster", ".xml");
    package.set_part(part.clone(), notes_master_xml().into_bytes());
    content_types.set_override(&part, CT_NOTES_MASTER);

    let master_rels = match package.part(&rels_part_for(master_part)) {
        Some(_) => Relationships::parse(&package.part_str(&rels_part_for(master_part))?)?,
        None => Relationships::default(),
    };
    let theme = master_rels
        .first_of_type(REL_THEME)
        .map(|r| resolve_target(master_part, &r.target))
        .and_then(|theme_part| package.part(&theme_part).map(<[u8]>::to_vec))
        .ok_or_else(|| Error::Build("Slide master has no theme to share with notes".to_string()))?;

    let theme_part = package.next_part_name("ppt/theme/theme", ".xml");
    package.set_part(theme_part.clone(), theme);
    content_types.set_override(&theme_part, CT_THEME);

    let mut rels = Relationships::default();
    rels.add(REL_THEME, relative_target(&part, &theme_part));
    package.set_part(rels_part_for(&part), rels.to_xml().into_bytes());

    log::debug!("Template has no notes master; created {}", part);
    Ok(part)
}

fn follows_slide_list(local: &[u8]) -> bool {
    AFTER_SLIDE_LIST.iter().any(|name| *name == local)
}

/// `(id, r:id)` of each `item` element inside the `list` element.
fn id_list(xml: &str, list: &[u8], item: &[u8]) -> Result<Vec<(Option<u32>, String)>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut in_list = false;
    let mut entries = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == list => in_list = true,
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == list => in_list = false,
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if in_list && local_name(e.name().as_ref()) == item =>
            {
                if let Some(rel_id) = prefixed_attr(e, b"id") {
                    entries.push((attr_num(e, b"id"), rel_id));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("Error parsing presentation lists", e)),
            _ => {}
        }
    }

    Ok(entries)
}

/// Splice new `<p:sldId>` entries, and optionally a notes master list, into
/// `presentation.xml`, leaving everything else byte-for-byte intact.
fn rewrite_presentation(
    xml: &str,
    slides: &[(u32, String)],
    notes_master_rel: Option<&str>,
) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut prefix = String::new();
    let mut splices: Vec<(usize, usize, String)> = Vec::new();
    let mut depth = 0usize;
    let mut slide_list_written = false;
    // Where a notes master list goes: replacing an existing one, else after the slide masters.
    let mut notes_list_start = None;
    let mut notes_list_span: Option<(usize, usize)> = None;
    let mut notes_list_insert = None;

    let entries = |prefix: &str| {
        slides
            .iter()
            .map(|(id, rel_id)| format!(r#"<{}sldId id="{}" r:id="{}"/>"#, prefix, id, rel_id))
            .collect::<String>()
    };

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if depth == 0 {
                    let qualified = name.as_ref();
                    if qualified.len() > local.len() {
                        prefix = String::from_utf8_lossy(&qualified[..qualified.len() - local.len()]).into_owned();
                    }
                } else if depth == 1 && !slide_list_written && follows_slide_list(local) {
                    splices.push((before, before, format!("<{p}sldIdLst>{}</{p}sldIdLst>", entries(&prefix), p = prefix)));
                    slide_list_written = true;
                }
                if depth == 1 && local == b"notesMasterIdLst" {
                    notes_list_start = Some(before);
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if depth == 1 && local == b"notesMasterIdLst" && notes_list_span.is_none() {
                    notes_list_span = Some((before, reader.buffer_position() as usize));
                }
                if depth == 1 && !slide_list_written {
                    if local == b"sldIdLst" {
                        let after = reader.buffer_position() as usize;
                        splices.push((before, after, format!("<{p}sldIdLst>{}</{p}sldIdLst>", entries(&prefix), p = prefix)));
                        slide_list_written = true;
                    } else if follows_slide_list(local) {
                        splices.push((before, before, format!("<{p}sldIdLst>{}</{p}sldIdLst>", entries(&prefix), p = prefix)));
                        slide_list_written = true;
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                depth = depth.saturating_sub(1);
                let name = e.name();
                let local = local_name(name.as_ref());
                if depth == 1 && local == b"sldIdLst" && !slide_list_written {
                    splices.push((before, before, entries(&prefix)));
                    slide_list_written = true;
                } else if depth == 1 && local == b"sldMasterIdLst" {
                    notes_list_insert = Some(reader.buffer_position() as usize);
                } else if depth == 1 && local == b"notesMasterIdLst" {
                    if let Some(start) = notes_list_start.take() {
                        if notes_list_span.is_none() {
                            notes_list_span = Some((start, reader.buffer_position() as usize));
                        }
                    }
                } else if depth == 0 && !slide_list_written {
                    splices.push((before, before, format!("<{p}sldIdLst>{}</{p}sldIdLst>", entries(&prefix), p = prefix)));
                    slide_list_written = true;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("Error parsing presentation part", e)),
            _ => {}
        }
    }

    if let Some(rel_id) = notes_master_rel {
        let list = format!(
            r#"<{p}notesMasterIdLst><{p}notesMasterId r:id="{}"/></{p}notesMasterIdLst>"#,
            rel_id,
            p = prefix
        );
        let (start, end) = match (notes_list_span, notes_list_insert) {
            (Some(span), _) => span,
            (None, Some(at)) => (at, at),
            (None, None) => {
                return Err(Error::Build("Presentation has no slide master list".to_string()));
            }
        };
        let index = splices.partition_point(|(s, _, _)| *s < start);
        splices.insert(index, (start, end, list));
    }

    let mut out = xml.to_string();
    for (start, end, text) in splices.into_iter().rev() {
        out.replace_range(start..end, &text);
    }
    Ok(out)
}
