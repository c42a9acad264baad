//! Core library for turning mailed invoices into filed PDFs.
//!
//! This crate provides:
//! - Mailbox polling over IMAP and RFC 822 message parsing
//! - Attachment download with sanitized file names
//! - PDF text extraction and German invoice number detection
//! - Renaming and filing of recognized invoices
//! - JSON, spreadsheet and CSV bookkeeping of processed mail

pub mod error;
pub mod invoice;
pub mod mail;
pub mod mailbox;
pub mod models;
pub mod organize;
pub mod pdf;
pub mod pipeline;
pub mod poller;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{InvoiceMailError, Result};
pub use invoice::{extract_invoice_number, InvoiceNumberExtractor, InvoiceRule, InvoiceScanner};
pub use mail::{sanitize_attachment_name, Attachment, MailMessage};
pub use mailbox::{ImapMailbox, Mailbox};
pub use models::config::{AttachmentPolicy, InvoiceMailConfig, Provider};
pub use models::record::{EmailRecord, InvoiceMatch, MovedFileRecord};
pub use organize::{FileOrganizer, FolderLayout};
pub use pdf::{PdfExtractor, PdfProcessor, PdfTextSource, TextSource};
pub use pipeline::{PassSummary, Pipeline};
pub use poller::{Connect, Poller, PollerHandle};
pub use store::{JsonStore, MetadataStore, MovedLog, RecordStore, SheetStore};
