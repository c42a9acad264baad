//! PDF processing module.

mod extractor;
mod merge;

pub use extractor::{PdfExtractor, PdfTextSource};
pub use merge::{is_pdf, merge_documents, merge_folder, pdfs_in};

use std::path::Path;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}

/// Anything that can turn a file into plain text.
///
/// The pipeline only sees this trait, so text can come from embedded PDF
/// text, an OCR service, or a fixture in tests.
pub trait TextSource {
    fn text_of(&self, path: &Path) -> Result<String>;
}

impl<T: TextSource + ?Sized> TextSource for &T {
    fn text_of(&self, path: &Path) -> Result<String> {
        (**self).text_of(path)
    }
}

impl<T: TextSource + ?Sized> TextSource for Box<T> {
    fn text_of(&self, path: &Path) -> Result<String> {
        (**self).text_of(path)
    }
}
