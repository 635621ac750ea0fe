//! Font identity normalization
//!
//! Raw font names in PDF content streams are noisy: subset prefixes
//! (`ABCDEF+Arial`), foundry decorations (`TimesNewRomanPSMT`) and style
//! suffixes (`Helvetica-BoldOblique`, `Arial,Italic`) all spell the same
//! family. The manager maps every raw spelling to one canonical [`AmiFont`]
//! record and tracks which families were first seen this run.

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// Reference table of font families shipped with the crate
pub const FONT_FAMILY_SET_XML: &str = include_str!("../resources/fontFamilySet.xml");

/// Canonical font record that multiple raw font-name spellings map to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmiFont {
    /// Canonical family name
    pub family: String,
    pub bold: bool,
    pub italic: bool,
    /// Present in the reference font table
    pub known: bool,
}

/// The reference table: families we expect to encounter
#[derive(Debug, Clone, Default)]
pub struct FontFamilySet {
    // folded key -> canonical spelling
    families: HashMap<String, String>,
}

impl FontFamilySet {
    /// Parse a `<fontFamilySet>` XML document
    pub fn read_font_family_set(xml: &str) -> Result<FontFamilySet> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut set = FontFamilySet::default();
        loop {
            match reader.read_event().map_err(|e| resource_error(e.to_string()))? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.name().as_ref() != b"fontFamily" {
                        continue;
                    }
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| resource_error(e.to_string()))?;
                        if attr.key.as_ref() == b"family" {
                            let family = attr
                                .unescape_value()
                                .map_err(|e| resource_error(e.to_string()))?
                                .to_string();
                            set.insert(family);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(set)
    }

    fn insert(&mut self, family: String) {
        self.families.insert(fold_family(&family), family);
    }

    /// Canonical spelling for a family, if the table knows it
    pub fn canonical(&self, family: &str) -> Option<&str> {
        self.families.get(&fold_family(family)).map(String::as_str)
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains_key(&fold_family(family))
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// Registry mapping raw font-name strings to canonical font records
#[derive(Debug)]
pub struct AmiFontManager {
    fonts: HashMap<String, AmiFont>,
    reference: FontFamilySet,
    new_families: BTreeSet<String>,
}

impl Default for AmiFontManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AmiFontManager {
    /// Create a manager backed by the shipped reference table
    ///
    /// A malformed table degrades to an empty one: every family then counts
    /// as new, but conversion itself proceeds.
    pub fn new() -> Self {
        let reference = match FontFamilySet::read_font_family_set(FONT_FAMILY_SET_XML) {
            Ok(set) => set,
            Err(e) => {
                warn!("font reference table unusable ({}), continuing with empty table", e);
                FontFamilySet::default()
            }
        };
        Self::with_reference(reference)
    }

    pub fn with_reference(reference: FontFamilySet) -> Self {
        AmiFontManager {
            fonts: HashMap::new(),
            reference,
            new_families: BTreeSet::new(),
        }
    }

    /// Look up or lazily create the canonical record for a raw font name
    ///
    /// Never fails: an unrecognized name degrades to a generic record keyed
    /// by its base family token. The first time a family absent from the
    /// reference table is seen, it is recorded as new (once per family, no
    /// matter how many raw spellings map to it).
    pub fn resolve(&mut self, raw_name: &str) -> &AmiFont {
        self.resolve_with_normalization(raw_name, true)
    }

    /// [`resolve`](Self::resolve) with suffix normalization made optional
    ///
    /// Without normalization the full raw string is the family key, which
    /// mirrors the converter's fix-font toggle being switched off.
    pub fn resolve_with_normalization(&mut self, raw_name: &str, normalize: bool) -> &AmiFont {
        if !self.fonts.contains_key(raw_name) {
            let font = if normalize {
                self.canonicalize(raw_name)
            } else {
                self.verbatim(raw_name)
            };
            if !font.known && self.new_families.insert(font.family.clone()) {
                debug!("new font family '{}' (raw name '{}')", font.family, raw_name);
            }
            self.fonts.insert(raw_name.to_string(), font);
        }
        &self.fonts[raw_name]
    }

    fn verbatim(&self, raw_name: &str) -> AmiFont {
        AmiFont {
            family: raw_name.to_string(),
            bold: false,
            italic: false,
            known: self.reference.contains(raw_name),
        }
    }

    fn canonicalize(&self, raw_name: &str) -> AmiFont {
        let (family, bold, italic) = normalize_font_name(raw_name);
        match self.reference.canonical(&family) {
            Some(canonical) => AmiFont {
                family: canonical.to_string(),
                bold,
                italic,
                known: true,
            },
            None => AmiFont {
                family,
                bold,
                italic,
                known: false,
            },
        }
    }

    /// Number of distinct raw names resolved so far
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Families first observed this run and absent from the reference table
    pub fn new_font_family_set(&self) -> &BTreeSet<String> {
        &self.new_families
    }

    /// XML report element listing the new families
    pub fn new_font_family_report(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 1);

        let mut root = BytesStart::new("fontFamilySet");
        root.push_attribute(("count", self.new_families.len().to_string().as_str()));
        writer.write_event(Event::Start(root))?;

        for family in &self.new_families {
            let mut element = BytesStart::new("fontFamily");
            element.push_attribute(("family", family.as_str()));
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new("fontFamilySet")))?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::General(format!("font report is not UTF-8: {}", e)))
    }
}

/// Reduce a raw font name to (base family, bold, italic)
///
/// Strips a subset prefix of six uppercase letters plus '+', then splits the
/// remainder on '-' and ',' into a base token and style tokens.
pub fn normalize_font_name(raw_name: &str) -> (String, bool, bool) {
    let name = strip_subset_prefix(raw_name.trim());

    let mut parts = name.split(['-', ',']).filter(|p| !p.is_empty());
    let base = parts.next().unwrap_or(name);

    let mut bold = false;
    let mut italic = false;
    for token in parts {
        let token = token.to_ascii_lowercase();
        if token.contains("bold") {
            bold = true;
        }
        if token.contains("italic") || token.contains("oblique") {
            italic = true;
        }
    }

    let family = strip_foundry_decoration(base);
    if family.is_empty() {
        // degenerate raw name, fall back to the full string as the key
        return (name.to_string(), bold, italic);
    }
    (family.to_string(), bold, italic)
}

/// Subset prefixes are exactly six uppercase ASCII letters and a '+'
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((prefix, rest))
            if prefix.len() == 6 && prefix.bytes().all(|b| b.is_ascii_uppercase()) =>
        {
            rest
        }
        _ => name,
    }
}

/// Drop trailing PostScript/Monotype decorations from a family token
fn strip_foundry_decoration(base: &str) -> &str {
    for suffix in ["PSMT", "MT", "PS"] {
        if let Some(stripped) = base.strip_suffix(suffix) {
            if !stripped.is_empty() {
                return stripped;
            }
        }
    }
    base
}

/// Case- and separator-insensitive key for family comparison
fn fold_family(family: &str) -> String {
    family
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn resource_error(reason: String) -> Error {
    Error::ResourceLoad {
        name: "fontFamilySet".to_string(),
        reason,
    }
}
