//! Scan files and folders for invoice numbers.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::rules::InvoiceNumberExtractor;
use crate::models::record::InvoiceMatch;
use crate::pdf::{is_pdf, TextSource};

/// All PDFs below `dir`, recursively, sorted by path.
pub fn list_pdfs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_pdfs(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_pdfs(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_pdfs(&path, files)?;
        } else if is_pdf(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Extracts text from files and looks for an invoice number in it.
pub struct InvoiceScanner<S> {
    source: S,
    extractor: InvoiceNumberExtractor,
}

impl<S: TextSource> InvoiceScanner<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            extractor: InvoiceNumberExtractor::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: InvoiceNumberExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Invoice number of a single file. Unreadable files scan as empty text.
    pub fn scan_file(&self, path: &Path) -> InvoiceMatch {
        let text = match self.source.text_of(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                String::new()
            }
        };

        match self.extractor.extract_with_rule(&text) {
            Some((rule, m)) => {
                debug!(
                    "{} -> {} via {} ({:.2})",
                    path.display(),
                    m.value,
                    rule.name(),
                    m.confidence
                );
                InvoiceMatch::new(path, Some(m.value))
            }
            None => {
                debug!("{} -> no invoice number", path.display());
                InvoiceMatch::new(path, None)
            }
        }
    }

    /// Invoice numbers of every PDF below `dir`, in path order.
    pub fn scan_folder(&self, dir: &Path) -> std::io::Result<Vec<InvoiceMatch>> {
        Ok(list_pdfs(dir)?
            .iter()
            .map(|path| self.scan_file(path))
            .collect())
    }
}
