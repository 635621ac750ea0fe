//! PDF to SVG Conversion Library
//!
//! Converts paginated PDF content into per-page SVG documents while tracking
//! cross-page state across a batch:
//! - Font identity normalization: noisy raw font names map to canonical
//!   records, and previously-unseen families are flagged
//! - Code-point inventory: high Unicode code points produced by glyph
//!   rendering, split into known and newly-observed sets
//! - Publisher profiles: per-publisher graphical overrides selected by
//!   abbreviation
//! - Batch orchestration: page-range resolution, per-page conversion and
//!   output writing, end-of-run diagnostic reports, and a navigation index
//!
//! # Example
//!
//! ```no_run
//! use pdf2svg::{BatchConverter, ConvertOptions, PageRanges};
//! use std::path::PathBuf;
//!
//! let options = ConvertOptions {
//!     page_ranges: Some(PageRanges::parse("1-3,7").unwrap()),
//!     output_dir: PathBuf::from("out"),
//!     ..Default::default()
//! };
//!
//! let mut converter = BatchConverter::new(options);
//! converter.run(&[PathBuf::from("paper.pdf")]).expect("conversion failed");
//! ```

pub mod batch;
pub mod codepoint;
pub mod error;
pub mod font;
pub mod interpret;
pub mod menu;
pub mod pages;
pub mod publisher;
pub mod svg;

// Re-export commonly used items
pub use batch::{BatchConverter, ConvertOptions};
pub use codepoint::CodePointSet;
pub use error::{Error, Result};
pub use font::{AmiFont, AmiFontManager};
pub use interpret::{ConverterContext, PageInterpreter, TextInterpreter};
pub use pages::PageRanges;
pub use publisher::{Publisher, PublisherSet};
pub use svg::{SvgDocument, SvgElement};
