//! pdf2svg CLI tool
//!
//! Converts each page of the given PDF documents into an SVG file, plus a
//! navigation index per document.

use anyhow::Context;
use clap::Parser;
use glob::glob;
use std::path::PathBuf;
use std::process;

use pdf2svg::{BatchConverter, ConvertOptions, PageRanges};

/// pdf2svg - Convert PDF pages to per-page SVG documents
#[derive(Parser)]
#[command(name = "pdf2svg")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Convert every page of a document into the current directory
    pdf2svg paper.pdf

    # Convert pages 1-3 and 7 into out/, using the BMC publisher profile
    pdf2svg --pages 1-3,7 --pub bmc --outdir out paper.pdf

    # Convert several documents, decrypting with a password
    pdf2svg --password secret --outdir out \"papers/*.pdf\"")]
struct Cli {
    /// Password to decrypt the documents (default none)
    #[arg(long, default_value = "")]
    password: String,

    /// Read each document fully into memory before parsing
    #[arg(long)]
    nonseq: bool,

    /// Restrict pages to be output, e.g. "1-3,7,10-12" (default all)
    #[arg(long)]
    pages: Option<String>,

    /// Publisher profile abbreviation, e.g. "bmc"
    #[arg(long = "pub")]
    publisher: Option<String>,

    /// Location to write output pages
    #[arg(short, long, default_value = ".")]
    outdir: PathBuf,

    /// The PDF documents to be converted. Supports glob patterns like "*.pdf"
    #[arg(required = true)]
    inputs: Vec<String>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // malformed configuration fails here, before any document is opened
    let page_ranges = cli
        .pages
        .as_deref()
        .map(PageRanges::parse)
        .transpose()
        .context("invalid --pages value")?;

    let inputs = expand_globs(cli.inputs)?;

    let options = ConvertOptions {
        password: cli.password,
        load_in_memory: cli.nonseq,
        page_ranges,
        publisher: cli.publisher,
        output_dir: cli.outdir,
    };

    let mut converter = BatchConverter::new(options);
    converter.run(&inputs)?;

    eprintln!("Converted {} page(s)", converter.page_list().len());
    Ok(())
}

/// Expand glob patterns in input paths
fn expand_globs(patterns: Vec<String>) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched = Vec::new();
            for entry in glob(&pattern).with_context(|| format!("invalid glob pattern: {}", pattern))? {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => eprintln!("Warning: glob error for {}: {}", pattern, e),
                }
            }
            if matched.is_empty() {
                anyhow::bail!("No files matched pattern: {}", pattern);
            }
            // Sort matches for consistent ordering
            matched.sort();
            paths.extend(matched);
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}
