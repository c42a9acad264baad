//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{MailboxError, PdfError};
use crate::mailbox::{self, Mailbox};
use crate::pdf::{self, TextSource};

/// Reads the file as UTF-8 text, standing in for a PDF text layer.
pub(crate) struct PlainText;

impl TextSource for PlainText {
    fn text_of(&self, path: &Path) -> pdf::Result<String> {
        fs::read_to_string(path).map_err(PdfError::from)
    }
}

/// One scripted answer to `fetch_unseen`.
pub(crate) enum Fetch {
    Messages(Vec<Vec<u8>>),
    Fail,
}

/// Mailbox that replays scripted fetches and counts calls.
///
/// Once the script runs out every fetch returns no messages.
#[derive(Clone, Default)]
pub(crate) struct FakeMailbox {
    script: Arc<Mutex<VecDeque<Fetch>>>,
    pub fetches: Arc<Mutex<usize>>,
    pub logouts: Arc<Mutex<usize>>,
}

impl FakeMailbox {
    pub fn with(script: Vec<Fetch>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            ..Self::default()
        }
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }

    pub fn logout_count(&self) -> usize {
        *self.logouts.lock().unwrap()
    }
}

impl Mailbox for FakeMailbox {
    fn fetch_unseen(&mut self) -> mailbox::Result<Vec<Vec<u8>>> {
        *self.fetches.lock().unwrap() += 1;
        match self.script.lock().unwrap().pop_front() {
            Some(Fetch::Messages(messages)) => Ok(messages),
            Some(Fetch::Fail) => Err(MailboxError::Login {
                user: "fake".to_string(),
                reason: "connection reset".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }

    fn logout(self: Box<Self>) {
        *self.logouts.lock().unwrap() += 1;
    }
}

/// Multipart message with one PDF attachment whose payload is `pdf_text`.
pub(crate) fn message_with_pdf(date: &str, filename: &str, pdf_text: &str) -> Vec<u8> {
    message_with_parts(date, &[(filename, pdf_text)])
}

/// Multipart message with one attachment per `(filename, payload)`.
pub(crate) fn message_with_parts(date: &str, parts: &[(&str, &str)]) -> Vec<u8> {
    let mut raw = format!(
        "From: Buchhaltung <billing@example.com>\r\n\
Date: {date}\r\n\
Subject: Ihre Rechnung\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"B\"\r\n\
\r\n\
--B\r\n\
Content-Type: text/plain\r\n\
\r\n\
Anbei.\r\n"
    );
    for (filename, payload) in parts {
        raw.push_str(&format!(
            "--B\r\n\
Content-Type: application/octet-stream; name=\"{filename}\"\r\n\
Content-Disposition: attachment; filename=\"{filename}\"\r\n\
\r\n\
{payload}\r\n"
        ));
    }
    raw.push_str("--B--\r\n");
    raw.into_bytes()
}
