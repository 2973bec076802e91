//! Candidate PDF discovery

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::DEFAULT_OUTPUT_DIR;
use crate::error::{Error, Result};

/// Recursive directory walker yielding PDF files in a stable order
#[derive(Debug, Clone)]
pub struct PdfScanner {
    output_dir_name: String,
}

impl Default for PdfScanner {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl PdfScanner {
    pub fn new(output_dir_name: impl Into<String>) -> Self {
        Self {
            output_dir_name: output_dir_name.into(),
        }
    }

    /// Every `*.pdf` under `root` (extension matched case-insensitively),
    /// skipping output directories below the root. Files reachable through
    /// more than one path are reported once, at their first path.
    ///
    /// Output directories are pruned at every depth except the root itself:
    /// a root named like the output directory is still walked.
    #[instrument(skip(self))]
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(Error::UsageError(format!("Folder not found: {}", root.display())));
        }

        let mut seen = HashSet::new();
        let mut found = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_output_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !has_pdf_extension(entry.path()) {
                continue;
            }

            let canonical = fs::canonicalize(entry.path()).unwrap_or_else(|_| entry.path().to_path_buf());
            if seen.insert(canonical) {
                found.push(entry.into_path());
            } else {
                debug!("Duplicate path skipped: {}", entry.path().display());
            }
        }

        info!("Found {} PDF file(s) under {}", found.len(), root.display());
        Ok(found)
    }

    fn is_output_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == self.output_dir_name.as_str()
    }
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension_matching() {
        assert!(has_pdf_extension(Path::new("a.pdf")));
        assert!(has_pdf_extension(Path::new("a.PDF")));
        assert!(has_pdf_extension(Path::new("dir/b.Pdf")));
        assert!(!has_pdf_extension(Path::new("a.pdfx")));
        assert!(!has_pdf_extension(Path::new("pdf")));
    }

    #[test]
    fn test_missing_root() {
        let scanner = PdfScanner::default();
        assert!(scanner.discover(Path::new("/definitely/not/here")).is_err());
    }
}
