//! Publisher profiles
//!
//! A publisher profile is a convenience override layer keyed by a short
//! abbreviation: page geometry and similar conventions for a particular
//! source. The default conversion path works identically with no publisher
//! selected, so lookups miss softly instead of failing.

use std::collections::HashMap;
use std::path::Path;

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// Publisher catalog shipped with the crate
pub const PUBLISHER_SET_XML: &str = include_str!("../resources/publisherSet.xml");

/// A named set of graphical override parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Publisher {
    /// Unique short identifier used for lookup
    pub abbreviation: String,
    pub name: String,
    /// Page geometry override, if the publisher deviates from the default
    pub page_width: Option<f64>,
    pub page_height: Option<f64>,
}

impl Publisher {
    /// Serialize the parameters as an XML diagnostic element
    pub fn create_element(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        let mut element = BytesStart::new("publisher");
        element.push_attribute(("abbreviation", self.abbreviation.as_str()));
        element.push_attribute(("name", self.name.as_str()));
        if let Some(width) = self.page_width {
            element.push_attribute(("pageWidth", width.to_string().as_str()));
        }
        if let Some(height) = self.page_height {
            element.push_attribute(("pageHeight", height.to_string().as_str()));
        }
        writer.write_event(Event::Empty(element))?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::General(format!("publisher element is not UTF-8: {}", e)))
    }
}

/// Catalog of publisher profiles keyed by abbreviation
#[derive(Debug, Clone, Default)]
pub struct PublisherSet {
    publishers: HashMap<String, Publisher>,
}

impl PublisherSet {
    /// Parse a `<publisherSet>` XML catalog
    pub fn read_publisher_set(xml: &str) -> Result<PublisherSet> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut set = PublisherSet::default();
        loop {
            match reader.read_event().map_err(|e| resource_error(e.to_string()))? {
                Event::Start(e) | Event::Empty(e) => {
                    if e.name().as_ref() != b"publisher" {
                        continue;
                    }
                    let publisher = parse_publisher(&e)?;
                    set.publishers
                        .insert(publisher.abbreviation.clone(), publisher);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(set)
    }

    /// Load the shipped catalog; a malformed catalog degrades to an empty,
    /// always-miss set
    pub fn load_default() -> PublisherSet {
        match Self::read_publisher_set(PUBLISHER_SET_XML) {
            Ok(set) => set,
            Err(e) => {
                warn!("publisher catalog unusable ({}), continuing without profiles", e);
                PublisherSet::default()
            }
        }
    }

    /// Read a catalog from a file path
    ///
    /// A missing file yields the empty set; a file that exists but does not
    /// parse is a resource error.
    pub fn read_from_file(path: &Path) -> Result<PublisherSet> {
        if !path.exists() {
            warn!("publisher catalog '{}' not found, continuing without profiles", path.display());
            return Ok(PublisherSet::default());
        }
        let xml = std::fs::read_to_string(path)?;
        Self::read_publisher_set(&xml)
    }

    /// Case-sensitive exact lookup; a miss is `None`, never an error
    pub fn get_publisher_by_abbreviation(&self, abbreviation: &str) -> Option<&Publisher> {
        self.publishers.get(abbreviation)
    }

    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}

fn parse_publisher(element: &BytesStart) -> Result<Publisher> {
    let mut abbreviation = None;
    let mut name = None;
    let mut page_width = None;
    let mut page_height = None;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| resource_error(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| resource_error(e.to_string()))?;
        match attr.key.as_ref() {
            b"abbreviation" => abbreviation = Some(value.to_string()),
            b"name" => name = Some(value.to_string()),
            b"pageWidth" => {
                page_width = Some(value.parse().map_err(|_| {
                    resource_error(format!("bad pageWidth '{}'", value))
                })?);
            }
            b"pageHeight" => {
                page_height = Some(value.parse().map_err(|_| {
                    resource_error(format!("bad pageHeight '{}'", value))
                })?);
            }
            _ => {}
        }
    }

    let abbreviation = abbreviation
        .ok_or_else(|| resource_error("publisher element has no abbreviation".into()))?;
    Ok(Publisher {
        name: name.unwrap_or_else(|| abbreviation.clone()),
        abbreviation,
        page_width,
        page_height,
    })
}

fn resource_error(reason: String) -> Error {
    Error::ResourceLoad {
        name: "publisherSet".to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_loads() {
        let set = PublisherSet::load_default();
        assert!(!set.is_empty());
        let bmc = set.get_publisher_by_abbreviation("bmc").unwrap();
        assert_eq!(bmc.name, "BioMed Central");
        assert!(bmc.page_width.is_some());
    }

    #[test]
    fn test_lookup_miss_returns_none() {
        let set = PublisherSet::load_default();
        assert!(set.get_publisher_by_abbreviation("no-such-publisher").is_none());
        // lookups are case-sensitive
        assert!(set.get_publisher_by_abbreviation("BMC").is_none());
    }

    #[test]
    fn test_malformed_catalog_is_resource_error() {
        let result = PublisherSet::read_publisher_set("<publisherSet><publisher></publisherSet>");
        assert!(matches!(result, Err(Error::ResourceLoad { .. })));
    }

    #[test]
    fn test_missing_file_yields_empty_set() {
        let set = PublisherSet::read_from_file(Path::new("no/such/catalog.xml")).unwrap();
        assert!(set.is_empty());
        assert!(set.get_publisher_by_abbreviation("bmc").is_none());
    }

    #[test]
    fn test_create_element_lists_parameters() {
        let publisher = Publisher {
            abbreviation: "acs".to_string(),
            name: "American Chemical Society".to_string(),
            page_width: Some(612.0),
            page_height: None,
        };
        let xml = publisher.create_element().unwrap();
        assert!(xml.contains("abbreviation=\"acs\""));
        assert!(xml.contains("pageWidth=\"612\""));
        assert!(!xml.contains("pageHeight"));
    }
}
