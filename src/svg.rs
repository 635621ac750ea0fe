//! Minimal SVG document model
//!
//! Each converted page becomes one [`SvgDocument`]. The only contract the
//! rest of the system relies on is deterministic, human-readable XML
//! serialization; the shape vocabulary is intentionally small.

use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Error, Result};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// One per-page vector-graphics document
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    pub width: f64,
    pub height: f64,
    elements: Vec<SvgElement>,
}

/// Drawing vocabulary of the converter
#[derive(Debug, Clone, PartialEq)]
pub enum SvgElement {
    /// Document title, rendered as an `<title>` child
    Title(String),
    /// A positioned text run
    Text {
        x: f64,
        y: f64,
        font_family: String,
        font_size: f64,
        content: String,
    },
}

impl SvgDocument {
    pub fn new(width: f64, height: f64) -> Self {
        SvgDocument {
            width,
            height,
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialize with single-space indentation
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);

        let mut svg = BytesStart::new("svg");
        svg.push_attribute(("xmlns", SVG_NAMESPACE));
        svg.push_attribute(("width", format_number(self.width).as_str()));
        svg.push_attribute(("height", format_number(self.height).as_str()));
        svg.push_attribute((
            "viewBox",
            format!("0 0 {} {}", format_number(self.width), format_number(self.height)).as_str(),
        ));
        writer.write_event(Event::Start(svg))?;

        for element in &self.elements {
            match element {
                SvgElement::Title(title) => {
                    writer.write_event(Event::Start(BytesStart::new("title")))?;
                    writer.write_event(Event::Text(BytesText::new(title)))?;
                    writer.write_event(Event::End(BytesEnd::new("title")))?;
                }
                SvgElement::Text {
                    x,
                    y,
                    font_family,
                    font_size,
                    content,
                } => {
                    let mut text = BytesStart::new("text");
                    text.push_attribute(("x", format_number(*x).as_str()));
                    text.push_attribute(("y", format_number(*y).as_str()));
                    text.push_attribute(("font-family", font_family.as_str()));
                    text.push_attribute(("font-size", format_number(*font_size).as_str()));
                    writer.write_event(Event::Start(text))?;
                    writer.write_event(Event::Text(BytesText::new(content)))?;
                    writer.write_event(Event::End(BytesEnd::new("text")))?;
                }
            }
        }

        writer.write_event(Event::End(BytesEnd::new("svg")))?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::General(format!("SVG output is not UTF-8: {}", e)))
    }

    /// Write the serialized document as UTF-8 to a file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let xml = self.to_xml()?;
        std::fs::write(path, xml).map_err(|e| {
            Error::OutputWrite(format!("'{}': {}", path.display(), e))
        })
    }
}

/// Render coordinates without a trailing `.0` for whole numbers
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let doc = SvgDocument::new(600.0, 800.0);
        let xml = doc.to_xml().unwrap();
        assert!(xml.starts_with("<svg"));
        assert!(xml.contains("width=\"600\""));
        assert!(xml.contains("viewBox=\"0 0 600 800\""));
        assert!(xml.ends_with("</svg>"));
    }

    #[test]
    fn test_text_element_escapes_content() {
        let mut doc = SvgDocument::new(600.0, 800.0);
        doc.push(SvgElement::Text {
            x: 72.0,
            y: 720.5,
            font_family: "Helvetica".to_string(),
            font_size: 12.0,
            content: "a < b & c".to_string(),
        });
        let xml = doc.to_xml().unwrap();
        assert!(xml.contains("font-family=\"Helvetica\""));
        assert!(xml.contains("y=\"720.5\""));
        assert!(xml.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_serialization_is_indented() {
        let mut doc = SvgDocument::new(100.0, 100.0);
        doc.push(SvgElement::Title("page".to_string()));
        let xml = doc.to_xml().unwrap();
        assert!(xml.contains("\n <title>"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.svg");
        let doc = SvgDocument::new(10.0, 10.0);
        doc.write_to(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, doc.to_xml().unwrap());
    }

    #[test]
    fn test_write_to_bad_path_is_output_error() {
        let doc = SvgDocument::new(10.0, 10.0);
        let result = doc.write_to(Path::new("no/such/dir/page.svg"));
        assert!(matches!(result, Err(Error::OutputWrite(_))));
    }
}
