//! Navigation wrapper
//!
//! After a document's pages are converted, a single `index.html` is written
//! to the output directory linking every produced page file in page order,
//! so the output set can be browsed as a unit.

use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;

use crate::error::{Error, Result};

const INDEX_FILE_NAME: &str = "index.html";

/// Writes the HTML index over a set of per-page output files
pub struct MenuSystem {
    outdir: PathBuf,
}

impl MenuSystem {
    pub fn new(outdir: &Path) -> Self {
        MenuSystem {
            outdir: outdir.to_path_buf(),
        }
    }

    /// Write `index.html` linking the given files, in the order given
    ///
    /// Returns the path of the written index.
    pub fn write_display_files(&self, files: &[PathBuf]) -> Result<PathBuf> {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str(" <meta charset=\"utf-8\"/>\n");
        html.push_str(" <title>Converted pages</title>\n");
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!(" <h1>Converted pages ({})</h1>\n", files.len()));
        html.push_str(" <ul>\n");
        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            html.push_str(&format!("  <li><a href=\"{}\">{}</a></li>\n", name, name));
        }
        html.push_str(" </ul>\n");
        html.push_str(&format!(
            " <p>Generated {}</p>\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        html.push_str("</body>\n</html>\n");

        let index = self.outdir.join(INDEX_FILE_NAME);
        std::fs::write(&index, html)
            .map_err(|e| Error::OutputWrite(format!("'{}': {}", index.display(), e)))?;
        info!("wrote navigation index '{}'", index.display());
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_links_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            dir.path().join("doc-page1.svg"),
            dir.path().join("doc-page3.svg"),
        ];
        let index = MenuSystem::new(dir.path())
            .write_display_files(&files)
            .unwrap();

        let html = std::fs::read_to_string(&index).unwrap();
        let first = html.find("doc-page1.svg").unwrap();
        let second = html.find("doc-page3.svg").unwrap();
        assert!(first < second);
        assert!(html.contains("<a href=\"doc-page1.svg\">"));
    }

    #[test]
    fn test_missing_directory_is_output_error() {
        let result = MenuSystem::new(Path::new("no/such/dir")).write_display_files(&[]);
        assert!(matches!(result, Err(Error::OutputWrite(_))));
    }
}
