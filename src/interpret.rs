//! Page interpretation seam
//!
//! The conversion engine proper is behind the [`PageInterpreter`] trait: one
//! operation turning a page into an [`SvgDocument`], with the shared
//! [`ConverterContext`] carrying the font and code-point accumulators as
//! side-channel state. The batch orchestrator only depends on the trait, so
//! it is testable with a stub.

use log::warn;
use lopdf::{Document, Object, ObjectId};

use crate::codepoint::{is_high, CodePointSet};
use crate::error::Result;
use crate::font::AmiFontManager;
use crate::publisher::Publisher;
use crate::svg::{SvgDocument, SvgElement};

pub const DEFAULT_PAGE_WIDTH: f64 = 600.0;
pub const DEFAULT_PAGE_HEIGHT: f64 = 800.0;

const FALLBACK_FONT_FAMILY: &str = "sans-serif";
const BODY_FONT_SIZE: f64 = 12.0;

/// Run-scoped state shared by every page of one document
///
/// Constructed once at the start of a document's conversion and passed by
/// reference into each page-interpretation step; the accumulators are read
/// back for reporting after the last page.
pub struct ConverterContext {
    pub font_manager: AmiFontManager,
    /// Read-only after load
    pub known_code_points: CodePointSet,
    /// High code points first observed this run
    pub new_code_points: CodePointSet,
    pub publisher: Option<Publisher>,
    /// Geometry used when a page carries no usable MediaBox
    pub page_width: f64,
    pub page_height: f64,
    /// Apply font-name suffix normalization when resolving raw names
    pub fix_font: bool,
}

impl ConverterContext {
    /// Build the context for one document run
    ///
    /// The known-code-point table degrades to empty if unreadable; the
    /// publisher's page geometry, when present, overrides the defaults.
    pub fn new(publisher: Option<Publisher>) -> Self {
        let known_code_points = match CodePointSet::load_known() {
            Ok(set) => set,
            Err(e) => {
                warn!("known code-point table unusable ({}), continuing with empty table", e);
                CodePointSet::new()
            }
        };

        let page_width = publisher
            .as_ref()
            .and_then(|p| p.page_width)
            .unwrap_or(DEFAULT_PAGE_WIDTH);
        let page_height = publisher
            .as_ref()
            .and_then(|p| p.page_height)
            .unwrap_or(DEFAULT_PAGE_HEIGHT);

        ConverterContext {
            font_manager: AmiFontManager::new(),
            known_code_points,
            new_code_points: CodePointSet::new(),
            publisher,
            page_width,
            page_height,
            fix_font: true,
        }
    }

    /// Track one produced code point
    ///
    /// Only high code points absent from the known table land in the new
    /// set. Returns true if this call added a code point.
    pub fn record_code_point(&mut self, code_point: u32) -> bool {
        if is_high(code_point) && !self.known_code_points.contains(code_point) {
            self.new_code_points.add(code_point)
        } else {
            false
        }
    }
}

/// Capability interface for the per-page conversion engine
pub trait PageInterpreter {
    /// Convert one page into an SVG document, mutating the shared context
    /// (font registry, code-point inventory) as a side effect
    fn interpret(
        &self,
        doc: &Document,
        page_number: u32,
        page_id: ObjectId,
        ctx: &mut ConverterContext,
    ) -> Result<SvgDocument>;
}

/// Default interpreter: page geometry, font resolution and extracted text
///
/// This walks the page's font resources through the font manager, extracts
/// the page text, records high code points, and lays the text out as plain
/// SVG text lines. Full glyph outlining is out of scope.
pub struct TextInterpreter;

impl PageInterpreter for TextInterpreter {
    fn interpret(
        &self,
        doc: &Document,
        page_number: u32,
        page_id: ObjectId,
        ctx: &mut ConverterContext,
    ) -> Result<SvgDocument> {
        let (width, height) = page_geometry(doc, page_id).unwrap_or((ctx.page_width, ctx.page_height));
        let mut svg = SvgDocument::new(width, height);
        svg.push(SvgElement::Title(format!("page {}", page_number)));

        let raw_font_names = page_font_names(doc, page_id);
        let fix_font = ctx.fix_font;
        let mut body_family = None;
        for raw_name in &raw_font_names {
            let resolved = ctx.font_manager.resolve_with_normalization(raw_name, fix_font);
            if body_family.is_none() {
                body_family = Some(resolved.family.clone());
            }
        }
        let body_family = body_family.unwrap_or_else(|| FALLBACK_FONT_FAMILY.to_string());

        let text = doc.extract_text(&[page_number])?;
        for ch in text.chars() {
            ctx.record_code_point(ch as u32);
        }

        let mut y = BODY_FONT_SIZE * 2.0;
        for line in text.lines() {
            let line = line.trim_end();
            if !line.is_empty() {
                svg.push(SvgElement::Text {
                    x: BODY_FONT_SIZE,
                    y,
                    font_family: body_family.clone(),
                    font_size: BODY_FONT_SIZE,
                    content: line.to_string(),
                });
            }
            y += BODY_FONT_SIZE * 1.2;
        }

        Ok(svg)
    }
}

/// MediaBox width/height for a page, following Parent inheritance
fn page_geometry(doc: &Document, page_id: ObjectId) -> Option<(f64, f64)> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    // inheritance chains are shallow in practice
    for _ in 0..8 {
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let media_box = resolve(doc, media_box);
            if let Object::Array(values) = media_box {
                if values.len() == 4 {
                    let n: Vec<f64> = values.iter().filter_map(number).collect();
                    if n.len() == 4 && n[2] > n[0] && n[3] > n[1] {
                        return Some((n[2] - n[0], n[3] - n[1]));
                    }
                }
            }
            return None;
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => {
                dict = doc.get_dictionary(*parent_id).ok()?;
            }
            _ => return None,
        }
    }
    None
}

/// Raw BaseFont names from the page's font resources, sorted for
/// deterministic resolution order
fn page_font_names(doc: &Document, page_id: ObjectId) -> Vec<String> {
    let mut names = Vec::new();

    let page_dict = match doc.get_dictionary(page_id) {
        Ok(dict) => dict,
        Err(_) => return names,
    };
    let resources = match page_dict.get(b"Resources").map(|r| resolve(doc, r)) {
        Ok(Object::Dictionary(dict)) => dict,
        _ => return names,
    };
    let fonts = match resources.get(b"Font").map(|f| resolve(doc, f)) {
        Ok(Object::Dictionary(dict)) => dict,
        _ => return names,
    };

    for (_, font) in fonts.iter() {
        if let Object::Dictionary(font_dict) = resolve(doc, font) {
            if let Ok(Object::Name(base_font)) = font_dict.get(b"BaseFont") {
                names.push(String::from_utf8_lossy(base_font).to_string());
            }
        }
    }

    names.sort();
    names.dedup();
    names
}

/// Follow a reference to its target object
fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_defaults() {
        let ctx = ConverterContext::new(None);
        assert_eq!(ctx.page_width, DEFAULT_PAGE_WIDTH);
        assert_eq!(ctx.page_height, DEFAULT_PAGE_HEIGHT);
        assert!(ctx.new_code_points.is_empty());
        assert!(ctx.fix_font);
    }

    #[test]
    fn test_publisher_geometry_overrides_defaults() {
        let publisher = Publisher {
            abbreviation: "bmc".to_string(),
            name: "BioMed Central".to_string(),
            page_width: Some(540.0),
            page_height: Some(770.0),
        };
        let ctx = ConverterContext::new(Some(publisher));
        assert_eq!(ctx.page_width, 540.0);
        assert_eq!(ctx.page_height, 770.0);
    }

    #[test]
    fn test_record_code_point_filters_low_and_known() {
        let mut ctx = ConverterContext::new(None);
        // ordinary Latin characters are never tracked
        assert!(!ctx.record_code_point('a' as u32));
        // the Greek lowercase alpha ships in the known table
        assert!(ctx.known_code_points.contains(0x03B1));
        assert!(!ctx.record_code_point(0x03B1));
        // an unknown high code point is tracked exactly once
        assert!(ctx.record_code_point(0xFFFD));
        assert!(!ctx.record_code_point(0xFFFD));
        assert_eq!(ctx.new_code_points.len(), 1);
    }

    #[test]
    fn test_number_conversion() {
        assert_eq!(number(&Object::Integer(612)), Some(612.0));
        assert_eq!(number(&Object::Real(11.5)), Some(11.5));
        assert_eq!(number(&Object::Null), None);
    }
}
