//! Small helpers shared by the OOXML readers and writers.

use deckgen_core::{Error, Result};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesStart;

pub const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Whether a qualified name carries a namespace prefix.
fn is_prefixed(name: &[u8]) -> bool {
    name.contains(&b':')
}

fn attr_string(attr: &Attribute<'_>) -> String {
    attr.unescape_value()
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Value of an unprefixed attribute, e.g. `id` or `name`.
pub fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| attr_string(&a))
}

/// Value of a prefixed attribute by local name, e.g. `r:id` or `r:embed`.
pub fn prefixed_attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| is_prefixed(a.key.as_ref()) && local_name(a.key.as_ref()) == local)
        .map(|a| attr_string(&a))
}

/// Parse a numeric attribute, ignoring values that do not parse.
pub fn attr_num<T: std::str::FromStr>(e: &BytesStart<'_>, key: &[u8]) -> Option<T> {
    attr(e, key).and_then(|v| v.trim().parse().ok())
}

/// Escape text for element content or attribute values.
///
/// Characters that XML 1.0 cannot carry at all are dropped.
pub fn escape(text: &str) -> String {
    let cleaned: String = text.chars().filter(|&c| is_xml_char(c)).collect();
    quick_xml::escape::escape(cleaned.as_str()).into_owned()
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || ('\u{20}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || c >= '\u{10000}'
}

pub(crate) fn xml_error(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Xml(format!("{}: {}", context, e))
}

pub(crate) fn utf8(bytes: &[u8], part: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::Xml(format!("Part '{}' is not UTF-8: {}", part, e)))
}
