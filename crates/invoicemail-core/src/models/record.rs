//! Records produced while processing a mailbox.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Text shown in place of an invoice number when no rule matched.
pub const NO_INVOICE_NUMBER: &str = "No invoice number found";

/// Metadata of one processed message.
///
/// Records are keyed by `(date, sender)`. Storing a record whose key already
/// exists updates the stored one instead of appending a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    /// Raw `Date` header of the message.
    pub date: String,

    /// Sender address.
    pub sender: String,

    /// Decoded subject.
    pub subject: String,

    /// File names of the saved attachments, in message order.
    #[serde(default)]
    pub attachments: Vec<String>,

    /// Invoice number extracted from one of the attachments.
    #[serde(default)]
    pub invoice_number: Option<String>,
}

impl EmailRecord {
    pub fn new(date: impl Into<String>, sender: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            sender: sender.into(),
            subject: subject.into(),
            attachments: Vec::new(),
            invoice_number: None,
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_invoice_number(mut self, invoice_number: Option<String>) -> Self {
        self.invoice_number = invoice_number;
        self
    }

    /// Whether both records describe the same message.
    pub fn same_key(&self, other: &EmailRecord) -> bool {
        self.date == other.date && self.sender == other.sender
    }

    /// Overwrite the mutable fields with the values of `newer`.
    pub fn update_from(&mut self, newer: &EmailRecord) {
        self.subject = newer.subject.clone();
        self.attachments = newer.attachments.clone();
        self.invoice_number = newer.invoice_number.clone();
    }
}

/// Upsert `record` into `records`, keyed by `(date, sender)`.
///
/// Returns `true` when an existing record was updated.
pub fn upsert_record(records: &mut Vec<EmailRecord>, record: EmailRecord) -> bool {
    match records.iter_mut().find(|r| r.same_key(&record)) {
        Some(existing) => {
            existing.update_from(&record);
            true
        }
        None => {
            records.push(record);
            false
        }
    }
}

/// Invoice number found (or not) in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceMatch {
    /// Path of the scanned file.
    pub path: PathBuf,
    /// Extracted number, `None` when no rule matched.
    pub invoice_number: Option<String>,
}

impl InvoiceMatch {
    pub fn new(path: impl Into<PathBuf>, invoice_number: Option<String>) -> Self {
        Self {
            path: path.into(),
            invoice_number,
        }
    }

    /// File name of the scanned file.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Invoice number, or the "not found" text.
    pub fn display_number(&self) -> &str {
        self.invoice_number.as_deref().unwrap_or(NO_INVOICE_NUMBER)
    }
}

/// Status of a relocated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    Moved,
}

impl fmt::Display for MoveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveStatus::Moved => write!(f, "moved"),
        }
    }
}

/// A file that was renamed and moved into the done directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovedFileRecord {
    /// File name after renaming.
    pub filename: String,
    /// Directory the file now lives in.
    pub location: PathBuf,
    pub status: MoveStatus,
    pub moved_at: DateTime<Local>,
}

impl MovedFileRecord {
    pub fn moved(filename: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            location: location.into(),
            status: MoveStatus::Moved,
            moved_at: Local::now(),
        }
    }

    /// Full path of the moved file.
    pub fn path(&self) -> PathBuf {
        self.location.join(&self.filename)
    }
}
