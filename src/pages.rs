//! Page-range parsing
//!
//! A page range is a user-specified, possibly non-contiguous, ascending
//! selection of 1-based page numbers, e.g. `"1-3,7,10-12"`.

use std::collections::BTreeSet;
use std::fmt;

use log::warn;

use crate::error::{Error, Result};

/// Ascending, duplicate-free selection of 1-based page numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRanges {
    pages: BTreeSet<u32>,
}

impl PageRanges {
    /// Parse a range expression like `"1-3,7,10-12"`
    ///
    /// Page numbers are 1-based; empty tokens, page 0 and reversed ranges
    /// are rejected.
    pub fn parse(expression: &str) -> Result<PageRanges> {
        let mut pages = BTreeSet::new();

        for token in expression.split(',') {
            let token = token.trim();
            if token.is_empty() {
                return Err(Error::InvalidPageRange(expression.to_string()));
            }
            match token.split_once('-') {
                Some((start, end)) => {
                    let start = parse_page_number(start, expression)?;
                    let end = parse_page_number(end, expression)?;
                    if start > end {
                        return Err(Error::InvalidPageRange(expression.to_string()));
                    }
                    pages.extend(start..=end);
                }
                None => {
                    pages.insert(parse_page_number(token, expression)?);
                }
            }
        }

        if pages.is_empty() {
            return Err(Error::InvalidPageRange(expression.to_string()));
        }
        Ok(PageRanges { pages })
    }

    /// All pages of an n-page document, `1..=n`
    pub fn all(page_count: usize) -> PageRanges {
        PageRanges {
            pages: (1..=page_count as u32).collect(),
        }
    }

    /// Ascending page numbers clamped to the document length
    ///
    /// Out-of-range entries are skipped with a warning rather than failing
    /// the run.
    pub fn limited(&self, page_count: usize) -> Vec<u32> {
        let mut selected = Vec::with_capacity(self.pages.len());
        for &page in &self.pages {
            if page as usize <= page_count {
                selected.push(page);
            } else {
                warn!("page {} is beyond the document's {} pages, skipping", page, page_count);
            }
        }
        selected
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn parse_page_number(token: &str, expression: &str) -> Result<u32> {
    let page: u32 = token
        .trim()
        .parse()
        .map_err(|_| Error::InvalidPageRange(expression.to_string()))?;
    if page == 0 {
        return Err(Error::InvalidPageRange(expression.to_string()));
    }
    Ok(page)
}

impl fmt::Display for PageRanges {
    /// Compact rendering, contiguous runs collapsed back to `a-b`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut runs: Vec<(u32, u32)> = Vec::new();
        for &page in &self.pages {
            match runs.last_mut() {
                Some((_, end)) if page == *end + 1 => *end = page,
                _ => runs.push((page, page)),
            }
        }

        for (i, (start, end)) in runs.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if start == end {
                write!(f, "{}", start)?;
            } else {
                write!(f, "{}-{}", start, end)?;
            }
        }
        Ok(())
    }
}
