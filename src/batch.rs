//! Batch orchestration
//!
//! Drives the whole conversion: per input document, resolve the page range,
//! prepare the output directory, convert each selected page to SVG, write
//! the page files, then emit the diagnostic reports and the navigation
//! index. Inputs are processed strictly in order, fail-fast: the first
//! unrecoverable per-document error aborts the remaining inputs.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use lopdf::Document;

use crate::error::{Error, Result};
use crate::interpret::{ConverterContext, PageInterpreter, TextInterpreter};
use crate::menu::MenuSystem;
use crate::pages::PageRanges;
use crate::publisher::{Publisher, PublisherSet};
use crate::svg::SvgDocument;

/// Conversion options for a run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Password used when a document is encrypted
    pub password: String,
    /// Read the whole file into memory before parsing instead of loading
    /// from the path
    pub load_in_memory: bool,
    /// Pages to convert; `None` means all pages
    pub page_ranges: Option<PageRanges>,
    /// Publisher profile abbreviation
    pub publisher: Option<String>,
    /// Directory the page files and the index are written to
    pub output_dir: PathBuf,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            password: String::new(),
            load_in_memory: false,
            page_ranges: None,
            publisher: None,
            output_dir: PathBuf::from("."),
        }
    }
}

/// The batch converter
pub struct BatchConverter {
    options: ConvertOptions,
    publisher_set: PublisherSet,
    interpreter: Box<dyn PageInterpreter>,
    svg_pages: Vec<SvgDocument>,
}

impl BatchConverter {
    pub fn new(options: ConvertOptions) -> Self {
        BatchConverter {
            options,
            publisher_set: PublisherSet::load_default(),
            interpreter: Box::new(TextInterpreter),
            svg_pages: Vec::new(),
        }
    }

    /// Swap in another page-conversion engine (used by tests with a stub)
    pub fn with_interpreter(mut self, interpreter: Box<dyn PageInterpreter>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// SVG documents accumulated over the run, in conversion order
    pub fn page_list(&self) -> &[SvgDocument] {
        &self.svg_pages
    }

    /// Convert every input in order; the first error aborts the rest
    pub fn run(&mut self, inputs: &[PathBuf]) -> Result<()> {
        for input in inputs {
            self.convert_file(input)?;
        }
        Ok(())
    }

    /// Convert one PDF file into per-page SVG files plus the index
    ///
    /// Returns the paths of the written page files, in page order.
    pub fn convert_file(&mut self, path: &Path) -> Result<Vec<PathBuf>> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        println!("Parsing PDF file {} ...", path.display());
        let doc = self.read_document(path)?;
        self.convert_document(doc, path)
    }

    fn read_document(&self, path: &Path) -> Result<Document> {
        let loaded = if self.options.load_in_memory {
            let bytes = std::fs::read(path)?;
            Document::load_mem(&bytes)
        } else {
            Document::load(path)
        };
        loaded.map_err(|e| Error::DocumentParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Convert an already-loaded document
    ///
    /// `path` supplies the output basename and error context. Decryption
    /// failure abandons the document before any page is converted.
    pub fn convert_document(&mut self, mut doc: Document, path: &Path) -> Result<Vec<PathBuf>> {
        if doc.trailer.get(b"Encrypt").is_ok() {
            doc.decrypt(&self.options.password)
                .map_err(|e| Error::Decryption {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
        }

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(Error::EmptyPdf(path.to_path_buf()));
        }

        let range = match &self.options.page_ranges {
            Some(ranges) => ranges.clone(),
            None => PageRanges::all(pages.len()),
        };

        // must exist and be a directory before any page is written
        let outdir = self.create_output_directory()?;

        println!("Processing pages {} (of {}) ...", range, pages.len());

        let mut ctx = ConverterContext::new(self.active_publisher());
        let basename = output_basename(path);
        let mut outfiles = Vec::new();

        for page_number in range.limited(pages.len()) {
            let page_id = match pages.get(&page_number) {
                Some(&id) => id,
                None => {
                    warn!("page {} missing from the page tree, skipping", page_number);
                    continue;
                }
            };

            println!("=== {} ===", page_number);
            let svg = self
                .interpreter
                .interpret(&doc, page_number, page_id, &mut ctx)?;

            let outfile = outdir.join(format!("{}-page{}.svg", basename, page_number));
            info!("writing output to '{}'", outfile.display());
            svg.write_to(&outfile)?;

            self.svg_pages.push(svg);
            outfiles.push(outfile);
        }

        report_high_code_points(&ctx);
        report_new_font_families(&ctx);
        report_publisher(&ctx);
        MenuSystem::new(&outdir).write_display_files(&outfiles)?;

        Ok(outfiles)
    }

    fn create_output_directory(&self) -> Result<PathBuf> {
        let outdir = self.options.output_dir.clone();
        if !outdir.exists() {
            std::fs::create_dir_all(&outdir).map_err(|e| {
                Error::OutputWrite(format!("cannot create '{}': {}", outdir.display(), e))
            })?;
        }
        if !outdir.is_dir() {
            return Err(Error::NotADirectory(outdir));
        }
        Ok(outdir)
    }

    fn active_publisher(&self) -> Option<Publisher> {
        let abbreviation = self.options.publisher.as_deref()?;
        match self.publisher_set.get_publisher_by_abbreviation(abbreviation) {
            Some(publisher) => Some(publisher.clone()),
            None => {
                warn!("no publisher profile for abbreviation '{}'", abbreviation);
                None
            }
        }
    }
}

/// Input filename with its extension stripped (case-insensitive match)
fn output_basename(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    if name.len() > 4
        && name.is_char_boundary(name.len() - 4)
        && name[name.len() - 4..].eq_ignore_ascii_case(".pdf")
    {
        name[..name.len() - 4].to_string()
    } else {
        name
    }
}

fn report_high_code_points(ctx: &ConverterContext) {
    let count = ctx.new_code_points.len();
    if count == 0 {
        return;
    }
    debug!("new high code points: {}", count);
    match ctx.new_code_points.to_xml() {
        Ok(xml) => debug!("{}", xml),
        Err(e) => warn!("cannot serialize code point report: {}", e),
    }
}

fn report_new_font_families(ctx: &ConverterContext) {
    match ctx.font_manager.new_font_family_report() {
        Ok(xml) => debug!("new font family names: {}", xml),
        Err(e) => warn!("cannot serialize font family report: {}", e),
    }
}

fn report_publisher(ctx: &ConverterContext) {
    if let Some(publisher) = &ctx.publisher {
        match publisher.create_element() {
            Ok(xml) => debug!("PUB {}", xml),
            Err(e) => warn!("cannot serialize publisher element: {}", e),
        }
    }
}
