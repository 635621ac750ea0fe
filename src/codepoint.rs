//! Code-point inventory
//!
//! Tracks "high" (non-Latin-range) Unicode code points produced by glyph
//! rendering. A run keeps two sets: the known set shipped as a resource, and
//! the new set accumulated while converting, so that code points which often
//! signal font-substitution or encoding problems can be reported without
//! re-deriving the reference table each run.

use std::collections::BTreeSet;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// Known high code points shipped with the crate
pub const KNOWN_HIGH_CODE_POINTS_XML: &str = include_str!("../resources/knownCodePoints.xml");

/// Code points at or below this value are ordinary Latin/basic-symbol
/// characters and are not tracked
pub const HIGH_CODE_POINT_FLOOR: u32 = 0xFF;

/// Returns true for code points above the Latin-1 boundary
pub fn is_high(code_point: u32) -> bool {
    code_point > HIGH_CODE_POINT_FLOOR
}

/// An ordered, duplicate-free collection of Unicode code points
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodePointSet {
    points: BTreeSet<u32>,
}

impl CodePointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a code point; duplicates are a no-op.
    ///
    /// Returns true if the code point was not already present.
    pub fn add(&mut self, code_point: u32) -> bool {
        self.points.insert(code_point)
    }

    pub fn contains(&self, code_point: u32) -> bool {
        self.points.contains(&code_point)
    }

    /// Number of distinct code points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Ascending iteration over the contained code points
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.points.iter().copied()
    }

    /// Parse a `<codePointSet>` XML document into a set
    ///
    /// Each entry is a `<codePoint decimal="8722"/>` element; a `unicode`
    /// attribute of the form `U+2212` is accepted when `decimal` is absent.
    pub fn read_code_point_set(xml: &str) -> Result<CodePointSet> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut set = CodePointSet::new();
        loop {
            match reader.read_event().map_err(|e| resource_error(e.to_string()))? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.name().as_ref() != b"codePoint" {
                        continue;
                    }
                    let code_point = parse_code_point_attrs(&e)?;
                    set.add(code_point);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(set)
    }

    /// One-time load of the shipped known-high-code-points table
    pub fn load_known() -> Result<CodePointSet> {
        Self::read_code_point_set(KNOWN_HIGH_CODE_POINTS_XML)
    }

    /// Sorted XML report element, in the same format `read_code_point_set`
    /// accepts
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);

        let mut root = BytesStart::new("codePointSet");
        root.push_attribute(("count", self.len().to_string().as_str()));
        writer.write_event(Event::Start(root))?;

        for code_point in self.iter() {
            let mut element = BytesStart::new("codePoint");
            element.push_attribute(("decimal", code_point.to_string().as_str()));
            element.push_attribute(("unicode", format!("U+{:04X}", code_point).as_str()));
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new("codePointSet")))?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::General(format!("code point report is not UTF-8: {}", e)))
    }
}

fn parse_code_point_attrs(element: &BytesStart) -> Result<u32> {
    let mut decimal: Option<u32> = None;
    let mut unicode: Option<u32> = None;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| resource_error(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| resource_error(e.to_string()))?;
        match attr.key.as_ref() {
            b"decimal" => {
                decimal = Some(value.parse().map_err(|_| {
                    resource_error(format!("bad decimal code point '{}'", value))
                })?);
            }
            b"unicode" => {
                let hex = value.strip_prefix("U+").unwrap_or(&value);
                unicode = Some(u32::from_str_radix(hex, 16).map_err(|_| {
                    resource_error(format!("bad unicode code point '{}'", value))
                })?);
            }
            _ => {}
        }
    }

    decimal
        .or(unicode)
        .ok_or_else(|| resource_error("codePoint element has no decimal or unicode attribute".into()))
}

fn resource_error(reason: String) -> Error {
    Error::ResourceLoad {
        name: "codePointSet".to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_ignores_duplicates() {
        let mut set = CodePointSet::new();
        assert!(set.add(8722));
        assert!(set.add(945));
        assert!(!set.add(8722));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut set = CodePointSet::new();
        for cp in [8722, 913, 8230, 945] {
            set.add(cp);
        }
        let points: Vec<u32> = set.iter().collect();
        assert_eq!(points, vec![913, 945, 8230, 8722]);
    }

    #[test]
    fn test_is_high_boundary() {
        assert!(!is_high(0x41));
        assert!(!is_high(0xFF));
        assert!(is_high(0x100));
        assert!(is_high(8722));
    }

    #[test]
    fn test_parse_decimal_and_unicode_attributes() {
        let xml = r#"<codePointSet>
 <codePoint decimal="8722"/>
 <codePoint unicode="U+03B1"/>
</codePointSet>"#;
        let set = CodePointSet::read_code_point_set(xml).unwrap();
        assert!(set.contains(8722));
        assert!(set.contains(0x03B1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_parse_malformed_xml_is_resource_error() {
        let result = CodePointSet::read_code_point_set("<codePointSet><codePoint");
        assert!(matches!(result, Err(Error::ResourceLoad { .. })));
    }

    #[test]
    fn test_parse_bad_decimal_is_resource_error() {
        let xml = r#"<codePointSet><codePoint decimal="xyz"/></codePointSet>"#;
        let result = CodePointSet::read_code_point_set(xml);
        assert!(matches!(result, Err(Error::ResourceLoad { .. })));
    }

    #[test]
    fn test_report_round_trip() {
        let mut set = CodePointSet::new();
        for cp in [0x2212, 0x0391, 0x2192, 0x2022] {
            set.add(cp);
        }
        let xml = set.to_xml().unwrap();
        let reparsed = CodePointSet::read_code_point_set(&xml).unwrap();
        assert_eq!(reparsed, set);
    }

    #[test]
    fn test_load_known_resource() {
        let known = CodePointSet::load_known().unwrap();
        assert!(!known.is_empty());
        // Greek alpha and the true minus sign are in the shipped table
        assert!(known.contains(0x03B1));
        assert!(known.contains(0x2212));
        // Everything shipped is high
        assert!(known.iter().all(is_high));
    }
}
