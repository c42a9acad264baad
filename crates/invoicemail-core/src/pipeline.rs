//! One pass over the mailbox: download, record, scan, organize.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::invoice::InvoiceScanner;
use crate::mail::MailMessage;
use crate::mailbox::Mailbox;
use crate::models::config::{AttachmentPolicy, InvoiceMailConfig};
use crate::organize::{FileOrganizer, FolderLayout};
use crate::pdf::{is_pdf, TextSource};
use crate::store::{MetadataStore, MovedLog};

/// Counts for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Messages fetched and parsed.
    pub messages: usize,
    /// Attachments written to the pending folder.
    pub attachments: usize,
    /// PDFs in which an invoice number was found.
    pub invoices: usize,
    /// Files renamed and moved to the done folder.
    pub moved: usize,
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} messages, {} attachments, {} invoices, {} moved",
            self.messages, self.attachments, self.invoices, self.moved
        )
    }
}

/// Everything a pass needs besides the mailbox.
pub struct Pipeline<S> {
    organizer: FileOrganizer,
    store: MetadataStore,
    moved_log: MovedLog,
    scanner: InvoiceScanner<S>,
    policy: AttachmentPolicy,
}

impl<S: TextSource> Pipeline<S> {
    pub fn new(config: &InvoiceMailConfig, source: S) -> Self {
        let layout = FolderLayout::from_config(&config.folders);
        let store = MetadataStore::from_config(&config.store, &layout.pending);
        let moved_log = MovedLog::new(config.store.moved_log_path_in(&layout.pending));

        Self {
            organizer: FileOrganizer::new(layout),
            store,
            moved_log,
            scanner: InvoiceScanner::new(source),
            policy: config.extraction.attachment_policy,
        }
    }

    pub fn layout(&self) -> &FolderLayout {
        self.organizer.layout()
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn moved_log(&self) -> &MovedLog {
        &self.moved_log
    }

    /// Fetch unseen messages and process each of them.
    ///
    /// Only a failing fetch is returned as an error; problems with single
    /// messages or files are logged and skipped.
    pub fn run_once(&self, mailbox: &mut dyn Mailbox) -> Result<PassSummary> {
        let raw_messages = mailbox.fetch_unseen()?;
        let mut summary = PassSummary::default();

        for raw in &raw_messages {
            let message = match MailMessage::parse(raw, self.policy) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Skipping message: {}", e);
                    continue;
                }
            };
            summary.messages += 1;
            self.process_message(&message, &mut summary);
        }

        if summary.messages > 0 {
            info!("Pass finished: {}", summary);
        }
        Ok(summary)
    }

    fn process_message(&self, message: &MailMessage, summary: &mut PassSummary) {
        info!("Processing email from {}: {}", message.sender, message.subject);

        let pending = &self.layout().pending;
        let saved = match message.save_attachments(pending) {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Could not save attachments: {}", e);
                Vec::new()
            }
        };
        summary.attachments += saved.len();

        let mut record = message.record().with_attachments(file_names(&saved));
        self.store.upsert(&record);

        let numbers: Vec<Option<String>> = saved
            .iter()
            .map(|path| {
                if !is_pdf(path) {
                    return None;
                }
                let found = self.scanner.scan_file(path);
                if found.invoice_number.is_none() {
                    debug!("No invoice number in {}", path.display());
                }
                found.invoice_number
            })
            .collect();
        summary.invoices += numbers.iter().flatten().count();

        let Some(first_number) = numbers.iter().flatten().next().cloned() else {
            return;
        };

        // Attachments without a number of their own are filed under the
        // first number found in the message.
        let mut attachments = Vec::with_capacity(saved.len());
        let mut moved = Vec::new();
        for (path, own_number) in saved.iter().zip(numbers) {
            let number = own_number.unwrap_or_else(|| first_number.clone());
            match self.organizer.organize(path, &number) {
                Ok(entry) => {
                    attachments.push(entry.filename.clone());
                    moved.push(entry);
                }
                Err(e) => {
                    warn!("Error processing {}: {}", path.display(), e);
                    attachments.push(file_name(path));
                }
            }
        }

        summary.moved += moved.len();
        if let Err(e) = self.moved_log.append(&moved) {
            warn!("Could not update {}: {}", self.moved_log.path().display(), e);
        }

        record = record
            .with_attachments(attachments)
            .with_invoice_number(Some(first_number));
        self.store.upsert(&record);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| file_name(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvoiceMailError;
    use crate::models::config::FolderConfig;
    use crate::models::record::EmailRecord;
    use crate::store::RecordStore;
    use crate::test_support::{message_with_parts, message_with_pdf, FakeMailbox, Fetch, PlainText};
    use pretty_assertions::assert_eq;
    use std::fs;

    fn config_in(root: &Path) -> InvoiceMailConfig {
        InvoiceMailConfig {
            folders: FolderConfig {
                pending: root.join("re_"),
                ..FolderConfig::default()
            },
            ..InvoiceMailConfig::default()
        }
    }

    #[test]
    fn test_invoice_is_renamed_moved_and_recorded() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(&config_in(root.path()), PlainText);
        let mut mailbox = FakeMailbox::with(vec![Fetch::Messages(vec![message_with_pdf(
            "Tue, 5 Mar 2024 09:15:00 +0100",
            "rechnung.pdf",
            "Rechnungsnr.: RE42",
        )])]);

        let summary = pipeline.run_once(&mut mailbox).unwrap();

        assert_eq!(
            summary,
            PassSummary {
                messages: 1,
                attachments: 1,
                invoices: 1,
                moved: 1,
            }
        );
        let done = root.path().join("Re_Erledigt");
        assert!(done.join("RE42_rechnung.pdf").is_file());
        assert!(!root.path().join("re_/rechnung.pdf").exists());

        let expected = EmailRecord::new(
            "Tue, 5 Mar 2024 09:15:00 +0100",
            "billing@example.com",
            "Ihre Rechnung",
        )
        .with_attachments(vec!["RE42_rechnung.pdf".to_string()])
        .with_invoice_number(Some("RE42".to_string()));
        assert_eq!(pipeline.store().json.load().unwrap(), vec![expected.clone()]);
        assert_eq!(pipeline.store().sheet.load().unwrap(), vec![expected]);
        assert!(pipeline.moved_log().path().is_file());
    }

    #[test]
    fn test_companion_attachments_follow_the_invoice() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(&config_in(root.path()), PlainText);
        let mut mailbox = FakeMailbox::with(vec![Fetch::Messages(vec![message_with_parts(
            "Thu, 7 Mar 2024 08:00:00 +0100",
            &[
                ("lieferschein.pdf", "Lieferschein 7"),
                ("rechnung.pdf", "Rechnung 2024/0042"),
                ("notiz.txt", "bitte bis Monatsende zahlen"),
            ],
        )])]);

        let summary = pipeline.run_once(&mut mailbox).unwrap();

        assert_eq!(summary.invoices, 1);
        assert_eq!(summary.moved, 3);
        let done = root.path().join("Re_Erledigt");
        for name in [
            "2024-0042_lieferschein.pdf",
            "2024-0042_rechnung.pdf",
            "2024-0042_notiz.txt",
        ] {
            assert!(done.join(name).is_file(), "{} not filed", name);
        }
        assert!(!root.path().join("re_/notiz.txt").exists());

        let records = pipeline.store().json.load().unwrap();
        assert_eq!(
            records[0].attachments,
            vec![
                "2024-0042_lieferschein.pdf".to_string(),
                "2024-0042_rechnung.pdf".to_string(),
                "2024-0042_notiz.txt".to_string(),
            ]
        );
        assert_eq!(records[0].invoice_number.as_deref(), Some("2024/0042"));
    }

    #[test]
    fn test_pdf_without_number_stays_pending() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(&config_in(root.path()), PlainText);
        let mut mailbox = FakeMailbox::with(vec![Fetch::Messages(vec![message_with_pdf(
            "Wed, 6 Mar 2024 10:00:00 +0100",
            "lieferschein.pdf",
            "Lieferschein 7",
        )])]);

        let summary = pipeline.run_once(&mut mailbox).unwrap();

        assert_eq!(summary.invoices, 0);
        assert_eq!(summary.moved, 0);
        assert!(root.path().join("re_/lieferschein.pdf").is_file());

        let records = pipeline.store().json.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].attachments, vec!["lieferschein.pdf".to_string()]);
        assert_eq!(records[0].invoice_number, None);
        assert!(!pipeline.moved_log().path().exists());
    }

    #[test]
    fn test_fetch_failure_is_returned() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(&config_in(root.path()), PlainText);
        let mut mailbox = FakeMailbox::with(vec![Fetch::Fail]);

        let err = pipeline.run_once(&mut mailbox).unwrap_err();
        assert!(matches!(err, InvoiceMailError::Mailbox(_)));
    }

    #[test]
    fn test_empty_mailbox_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(&config_in(root.path()), PlainText);
        let mut mailbox = FakeMailbox::default();

        assert_eq!(pipeline.run_once(&mut mailbox).unwrap(), PassSummary::default());
        assert!(!pipeline.store().json.path().exists());
        assert!(fs::read_dir(root.path()).unwrap().next().is_none());
    }
}
