//! Error types for the pdf2svg library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pdf2svg library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML (de)serialization error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A reference resource (font table, code-point list, publisher catalog)
    /// is missing or malformed
    #[error("Failed to load resource '{name}': {reason}")]
    ResourceLoad { name: String, reason: String },

    /// Wrong password or unsupported protection scheme
    #[error("Cannot decrypt '{}': {reason}", .path.display())]
    Decryption { path: PathBuf, reason: String },

    /// Source document is unreadable or corrupt
    #[error("Cannot parse PDF '{}': {reason}", .path.display())]
    DocumentParse { path: PathBuf, reason: String },

    /// Output directory or page file cannot be written
    #[error("Cannot write output: {0}")]
    OutputWrite(String),

    /// Output directory path exists but is not a directory
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Malformed page-range expression
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// General error
    #[error("{0}")]
    General(String),
}
