//! Error types for the invoicemail-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the invoicemail library.
#[derive(Error, Debug)]
pub enum InvoiceMailError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Message parsing error.
    #[error("mail error: {0}")]
    Mail(#[from] MailError),

    /// Mailbox session error.
    #[error("mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    /// Rename or move of a processed file failed.
    #[error("organize error: {0}")]
    Organize(#[from] OrganizeError),

    /// Metadata persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Nothing to merge in the given folder.
    #[error("no PDF files found in {0}")]
    NoInput(PathBuf),

    /// Failed to write a PDF.
    #[error("failed to write PDF: {0}")]
    Write(String),

    /// I/O error while reading or writing a PDF.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to parsing a fetched message.
#[derive(Error, Debug)]
pub enum MailError {
    /// The raw message could not be parsed as RFC 822.
    #[error("failed to parse message: {0}")]
    Parse(#[from] mailparse::MailParseError),

    /// Writing an attachment to disk failed.
    #[error("failed to save attachment {name}: {source}")]
    Save {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the mailbox client.
#[derive(Error, Debug)]
pub enum MailboxError {
    /// TLS setup failed.
    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    /// Protocol or connection failure.
    #[error("IMAP error: {0}")]
    Imap(#[from] imap::Error),

    /// The server rejected the credentials.
    #[error("login failed for {user}: {reason}")]
    Login { user: String, reason: String },

    /// Neither a provider nor a host was configured.
    #[error("no IMAP host configured")]
    NoHost,
}

/// Errors raised while renaming and moving a processed file.
#[derive(Error, Debug)]
pub enum OrganizeError {
    /// The source file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// The source path has no usable file name.
    #[error("invalid file name: {0}")]
    InvalidName(PathBuf),

    /// The target already exists and would be overwritten.
    #[error("target already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Rename within the pending directory failed.
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Move into the done directory failed. The file stays renamed.
    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating the done directory failed.
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to the JSON, spreadsheet and moved-file stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// JSON encode error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet read error.
    #[error("spreadsheet read error: {0}")]
    SheetRead(String),

    /// Spreadsheet path without an `.xlsx` extension.
    #[error("spreadsheet must be an .xlsx file: {}", .0.display())]
    SheetFormat(PathBuf),

    /// Spreadsheet write error.
    #[error("spreadsheet write error: {0}")]
    SheetWrite(#[from] rust_xlsxwriter::XlsxError),

    /// CSV log error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the invoicemail library.
pub type Result<T> = std::result::Result<T, InvoiceMailError>;
