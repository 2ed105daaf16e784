//! In-memory template fixtures.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT: &str = "application/vnd.openxmlformats-officedocument";

pub type Rect = (i64, i64, i64, i64);

#[derive(Debug, Clone)]
pub struct Ph {
    kind: Option<&'static str>,
    idx: u32,
    bounds: Option<Rect>,
    size: Option<u32>,
}

pub fn title() -> Ph {
    Ph {
        kind: Some("title"),
        idx: 0,
        bounds: Some((457200, 274638, 8229600, 1143000)),
        size: None,
    }
}

pub fn body(idx: u32) -> Ph {
    Ph {
        kind: None,
        idx,
        bounds: Some((457200, 1600200, 8229600, 4525963)),
        size: None,
    }
}

pub fn picture(idx: u32, bounds: Option<Rect>) -> Ph {
    Ph {
        kind: Some("pic"),
        idx,
        bounds,
        size: None,
    }
}

pub fn footer(idx: u32) -> Ph {
    Ph {
        kind: Some("ftr"),
        idx,
        bounds: None,
        size: None,
    }
}

impl Ph {
    pub fn sized(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }
}

/// A minimal PNG-looking blob; `extra` pads it to a distinct length.
pub fn png(extra: usize, fill: u8) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x10\0\0\0\x10\x08\x02\0\0\0".to_vec();
    data.extend(std::iter::repeat(fill).take(extra));
    data
}

pub const MASTER_BODY_BOUNDS: Rect = (457200, 1600200, 8229600, 4525963);

#[derive(Debug, Clone, Default)]
pub struct TemplateBuilder {
    layouts: Vec<(Option<String>, Vec<Ph>)>,
    slides: Vec<Vec<Vec<u8>>>,
    master_title_size: Option<u32>,
    notes_master: bool,
    potx: bool,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self {
            master_title_size: Some(4400),
            ..Self::default()
        }
    }

    pub fn layout(mut self, name: &str, placeholders: Vec<Ph>) -> Self {
        self.layouts.push((Some(name.to_string()), placeholders));
        self
    }

    pub fn unnamed_layout(mut self, placeholders: Vec<Ph>) -> Self {
        self.layouts.push((None, placeholders));
        self
    }

    /// An existing slide holding one picture per blob.
    pub fn slide_with_pictures(mut self, images: Vec<Vec<u8>>) -> Self {
        self.slides.push(images);
        self
    }

    pub fn master_title_size(mut self, size: Option<u32>) -> Self {
        self.master_title_size = size;
        self
    }

    pub fn with_notes_master(mut self) -> Self {
        self.notes_master = true;
        self
    }

    pub fn potx(mut self) -> Self {
        self.potx = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut parts: Vec<(String, String)> = Vec::new();
        let mut media: Vec<(String, Vec<u8>)> = Vec::new();

        let main_ct = if self.potx {
            format!("{}.presentationml.template.main+xml", CT)
        } else {
            format!("{}.presentationml.presentation.main+xml", CT)
        };
        let mut overrides = vec![
            ("/ppt/presentation.xml".to_string(), main_ct),
            (
                "/ppt/slideMasters/slideMaster1.xml".to_string(),
                format!("{}.presentationml.slideMaster+xml", CT),
            ),
            ("/ppt/theme/theme1.xml".to_string(), format!("{}.theme+xml", CT)),
        ];

        parts.push((
            "_rels/.rels".to_string(),
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
        ));

        // presentation
        let mut pres_rels = vec![
            ("rId1".to_string(), "slideMaster", "slideMasters/slideMaster1.xml".to_string()),
            ("rId2".to_string(), "theme", "theme/theme1.xml".to_string()),
        ];
        let mut pres = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            NS
        );
        if self.notes_master {
            pres.push_str(r#"<p:notesMasterIdLst><p:notesMasterId r:id="rId3"/></p:notesMasterIdLst>"#);
            pres_rels.push(("rId3".to_string(), "notesMaster", "notesMasters/notesMaster1.xml".to_string()));
        }
        if !self.slides.is_empty() {
            pres.push_str("<p:sldIdLst>");
            for i in 0..self.slides.len() {
                let _ = write!(pres, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, 10 + i);
                pres_rels.push((format!("rId{}", 10 + i), "slide", format!("slides/slide{}.xml", i + 1)));
            }
            pres.push_str("</p:sldIdLst>");
        }
        pres.push_str(r#"<p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#);
        parts.push(("ppt/presentation.xml".to_string(), pres));
        let pres_rels: Vec<(&str, &str, &str)> = pres_rels
            .iter()
            .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
            .collect();
        parts.push(("ppt/_rels/presentation.xml.rels".to_string(), rels(&pres_rels)));

        // master
        let mut master = format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {}><p:cSld><p:spTree>"#, NS);
        master.push_str(GROUP);
        master.push_str(&shape_xml(2, "Title Placeholder 1", &title()));
        master.push_str(&shape_xml(3, "Text Placeholder 2", &Ph {
            kind: Some("body"),
            idx: 1,
            bounds: Some(MASTER_BODY_BOUNDS),
            size: None,
        }));
        master.push_str(r#"</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst>"#);
        let mut master_rels = Vec::new();
        for i in 0..self.layouts.len() {
            let _ = write!(master, r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#, 2147483649u64 + i as u64, i + 1);
            master_rels.push((format!("rId{}", i + 1), "slideLayout", format!("../slideLayouts/slideLayout{}.xml", i + 1)));
        }
        master_rels.push((format!("rId{}", self.layouts.len() + 1), "theme", "../theme/theme1.xml".to_string()));
        master.push_str("</p:sldLayoutIdLst><p:txStyles><p:titleStyle><a:lvl1pPr>");
        match self.master_title_size {
            Some(size) => {
                let _ = write!(master, r#"<a:defRPr sz="{}"/>"#, size);
            }
            None => master.push_str("<a:defRPr/>"),
        }
        master.push_str("</a:lvl1pPr></p:titleStyle></p:txStyles></p:sldMaster>");
        parts.push(("ppt/slideMasters/slideMaster1.xml".to_string(), master));
        let master_rels: Vec<(&str, &str, &str)> = master_rels
            .iter()
            .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
            .collect();
        parts.push(("ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(), rels(&master_rels)));

        // layouts
        for (i, (name, placeholders)) in self.layouts.iter().enumerate() {
            let n = i + 1;
            let mut xml = format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {}>"#, NS);
            match name {
                Some(name) => {
                    let _ = write!(xml, r#"<p:cSld name="{}">"#, name);
                }
                None => xml.push_str("<p:cSld>"),
            }
            xml.push_str("<p:spTree>");
            xml.push_str(GROUP);
            for (j, ph) in placeholders.iter().enumerate() {
                xml.push_str(&shape_xml(j as u32 + 2, &format!("Placeholder {}", j + 1), ph));
            }
            xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");
            parts.push((format!("ppt/slideLayouts/slideLayout{}.xml", n), xml));
            parts.push((
                format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n),
                rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
            ));
            overrides.push((
                format!("/ppt/slideLayouts/slideLayout{}.xml", n),
                format!("{}.presentationml.slideLayout+xml", CT),
            ));
        }

        // existing slides
        for (i, images) in self.slides.iter().enumerate() {
            let n = i + 1;
            let mut xml = format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree>"#, NS);
            xml.push_str(GROUP);
            let mut slide_rels = vec![("rId1".to_string(), "slideLayout", "../slideLayouts/slideLayout1.xml".to_string())];
            for (j, image) in images.iter().enumerate() {
                let media_name = format!("image{}.png", media.len() + 1);
                media.push((format!("ppt/media/{}", media_name), image.clone()));
                let rel_id = format!("rId{}", j + 2);
                let _ = write!(
                    xml,
                    r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr></p:pic>"#,
                    j + 2,
                    j + 1,
                    rel_id
                );
                slide_rels.push((rel_id, "image", format!("../media/{}", media_name)));
            }
            xml.push_str("</p:spTree></p:cSld></p:sld>");
            parts.push((format!("ppt/slides/slide{}.xml", n), xml));
            let slide_rels: Vec<(&str, &str, &str)> = slide_rels
                .iter()
                .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
                .collect();
            parts.push((format!("ppt/slides/_rels/slide{}.xml.rels", n), rels(&slide_rels)));
            overrides.push((
                format!("/ppt/slides/slide{}.xml", n),
                format!("{}.presentationml.slide+xml", CT),
            ));
        }

        if self.notes_master {
            let mut xml = format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notesMaster {}><p:cSld><p:spTree>"#, NS);
            xml.push_str(GROUP);
            xml.push_str(r#"</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/></p:notesMaster>"#);
            parts.push(("ppt/notesMasters/notesMaster1.xml".to_string(), xml));
            parts.push((
                "ppt/notesMasters/_rels/notesMaster1.xml.rels".to_string(),
                rels(&[("rId1", "theme", "../theme/theme1.xml")]),
            ));
            overrides.push((
                "/ppt/notesMasters/notesMaster1.xml".to_string(),
                format!("{}.presentationml.notesMaster+xml", CT),
            ));
        }

        parts.push((
            "ppt/theme/theme1.xml".to_string(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Fixture"><a:themeElements/></a:theme>"#.to_string(),
        ));

        let mut types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/>"#,
        );
        for (name, ct) in &overrides {
            let _ = write!(types, r#"<Override PartName="{}" ContentType="{}"/>"#, name, ct);
        }
        types.push_str("</Types>");

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(types.as_bytes()).unwrap();
        for (name, xml) in &parts {
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
        }
        for (name, data) in &media {
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

const GROUP: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, kind, target) in entries {
        let _ = write!(xml, r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#, id, REL, kind, target);
    }
    xml.push_str("</Relationships>");
    xml
}

fn shape_xml(id: u32, name: &str, ph: &Ph) -> String {
    let mut xml = format!(r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr/><p:nvPr><p:ph"#, id, name);
    if let Some(kind) = ph.kind {
        let _ = write!(xml, r#" type="{}""#, kind);
    }
    if ph.idx != 0 {
        let _ = write!(xml, r#" idx="{}""#, ph.idx);
    }
    xml.push_str("/></p:nvPr></p:nvSpPr>");
    match ph.bounds {
        Some((x, y, cx, cy)) => {
            let _ = write!(
                xml,
                r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm></p:spPr>"#,
                x, y, cx, cy
            );
        }
        None => xml.push_str("<p:spPr/>"),
    }
    xml.push_str("<p:txBody><a:bodyPr/>");
    match ph.size {
        Some(size) => {
            let _ = write!(xml, r#"<a:lstStyle><a:lvl1pPr><a:defRPr sz="{}"/></a:lvl1pPr></a:lstStyle>"#, size);
        }
        None => xml.push_str("<a:lstStyle/>"),
    }
    xml.push_str(r#"<a:p><a:r><a:rPr lang="en-US"/><a:t>Click to edit</a:t></a:r></a:p></p:txBody></p:sp>"#);
    xml
}
