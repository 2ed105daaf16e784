//! Speaker notes parts.

use crate::layout::PlaceholderKind;
use crate::reader::ShapeTree;
use crate::slide::{split_paragraphs, write_group_properties, write_paragraphs};
use crate::xml::{NS_A, NS_P, NS_R, XML_DECLARATION};
use deckgen_core::Result;
use std::fmt::Write;

fn open_root(xml: &mut String, element: &str) {
    xml.push_str(XML_DECLARATION);
    let _ = write!(
        xml,
        r#"<p:{} xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        element, NS_A, NS_R, NS_P
    );
}

/// Notes slide with a slide image and a body holding `notes`, one paragraph
/// per line.
pub fn notes_slide_xml(notes: &str) -> String {
    let mut xml = String::with_capacity(1536 + notes.len());
    open_root(&mut xml, "notes");
    xml.push_str("<p:cSld><p:spTree>");
    write_group_properties(&mut xml);

    xml.push_str(r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Slide Image Placeholder 1"/>"#);
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr>"#);
    xml.push_str(r#"<p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#);

    xml.push_str(r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/>"#);
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    xml.push_str(r#"<p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/>"#);
    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
    write_paragraphs(&mut xml, &split_paragraphs(notes), None);
    xml.push_str("</p:txBody></p:sp>");

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:notes>");
    xml
}

/// A notes master for templates that ship without one.
pub fn notes_master_xml() -> String {
    let mut xml = String::with_capacity(2048);
    open_root(&mut xml, "notesMaster");
    xml.push_str(r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#);
    write_group_properties(&mut xml);

    xml.push_str(r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Slide Image Placeholder 1"/>"#);
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr>"#);
    xml.push_str(r#"<p:nvPr><p:ph type="sldImg" idx="2"/></p:nvPr></p:nvSpPr>"#);
    xml.push_str(r#"<p:spPr><a:xfrm><a:off x="381000" y="685800"/><a:ext cx="6096000" cy="3429000"/></a:xfrm>"#);
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr></p:sp>"#);

    xml.push_str(r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/>"#);
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    xml.push_str(r#"<p:nvPr><p:ph type="body" sz="quarter" idx="3"/></p:nvPr></p:nvSpPr>"#);
    xml.push_str(r#"<p:spPr><a:xfrm><a:off x="685800" y="4343400"/><a:ext cx="5486400" cy="4114800"/></a:xfrm>"#);
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#);
    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp>");

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    );
    xml.push_str(r#"<p:notesStyle><a:lvl1pPr marL="0" algn="l"><a:defRPr sz="1200"/></a:lvl1pPr></p:notesStyle>"#);
    xml.push_str("</p:notesMaster>");
    xml
}

/// Text of the notes body placeholder, paragraphs joined by newlines.
///
/// A notes slide without a body placeholder reads as empty.
pub fn read_notes_text(notes_xml: &str) -> Result<String> {
    let tree = ShapeTree::parse(notes_xml)?;
    let text = tree
        .placeholders()
        .find(|s| s.placeholder_kind() == Some(&PlaceholderKind::Body))
        .map(|s| s.text())
        .unwrap_or_default();
    Ok(text)
}
