//! Parsing of fetched messages and attachment download.

use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use mailparse::{parse_header, parse_mail, DispositionType, MailHeader, MailHeaderMap, ParsedMail};
use regex::{Captures, Regex};
use tracing::{debug, info, warn};

use crate::error::MailError;
use crate::models::config::AttachmentPolicy;
use crate::models::record::EmailRecord;

/// Result type for message operations.
pub type Result<T> = std::result::Result<T, MailError>;

lazy_static! {
    static ref ANGLE_ADDRESS: Regex = Regex::new(r"<(.+?)>").unwrap();

    // A run of RFC 2047 encoded words separated by whitespace
    static ref ENCODED_WORDS: Regex = Regex::new(
        r"=\?[^?\s]+\?[QqBb]\?[^?\s]*\?=(?:\s+=\?[^?\s]+\?[QqBb]\?[^?\s]*\?=)*"
    ).unwrap();
}

/// Name used when sanitizing leaves nothing usable.
const FALLBACK_NAME: &str = "attachment";

/// A named MIME part with its decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name as declared in the message.
    pub filename: String,
    /// Payload with the transfer encoding removed.
    pub content: Vec<u8>,
}

impl Attachment {
    /// File name safe to create on disk.
    pub fn safe_name(&self) -> String {
        sanitize_attachment_name(&self.filename)
    }
}

/// Headers and attachments of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// Raw `Date` header.
    pub date: String,
    /// Sender address.
    pub sender: String,
    /// Decoded subject.
    pub subject: String,
    pub attachments: Vec<Attachment>,
}

impl MailMessage {
    /// Parse an RFC 822 message.
    ///
    /// Missing headers become empty strings. Attachments are only collected
    /// from multipart messages.
    pub fn parse(raw: &[u8], policy: AttachmentPolicy) -> Result<Self> {
        let parsed = parse_mail(raw)?;

        let subject = header_text(&parsed, "Subject");
        let sender = sender_address(&header_text(&parsed, "From"));
        let date = header_text(&parsed, "Date");

        let mut attachments = Vec::new();
        if !parsed.subparts.is_empty() {
            collect_attachments(&parsed, policy, &mut attachments);
        }

        debug!(
            "Parsed message {:?} from {} with {} attachments",
            subject,
            sender,
            attachments.len()
        );

        Ok(Self {
            date,
            sender,
            subject,
            attachments,
        })
    }

    /// Record for this message without attachment or invoice data.
    pub fn record(&self) -> EmailRecord {
        EmailRecord::new(&self.date, &self.sender, &self.subject)
    }

    /// Write every attachment into `dir`, creating it if needed.
    ///
    /// A failing attachment is logged and skipped. Returns the written paths
    /// in message order.
    pub fn save_attachments(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|source| MailError::Save {
            name: dir.display().to_string(),
            source,
        })?;

        let mut saved = Vec::with_capacity(self.attachments.len());
        for attachment in &self.attachments {
            let path = dir.join(attachment.safe_name());
            match fs::write(&path, &attachment.content) {
                Ok(()) => {
                    info!("Downloaded attachment: {}", path.display());
                    saved.push(path);
                }
                Err(source) => {
                    let err = MailError::Save {
                        name: attachment.filename.clone(),
                        source,
                    };
                    warn!("{}", err);
                }
            }
        }
        Ok(saved)
    }
}

/// Decoded value of the first header named `name`.
///
/// Encoded words are decoded with the charset they declare. Raw 8-bit
/// text is read as UTF-8, and encoded words mixed into it are still decoded.
fn header_text(mail: &ParsedMail<'_>, name: &str) -> String {
    mail.headers
        .get_first_header(name)
        .map(decode_header)
        .unwrap_or_default()
}

fn decode_header(header: &MailHeader<'_>) -> String {
    let raw = header.get_value_raw();
    if raw.is_ascii() {
        header.get_value().trim().to_string()
    } else {
        let text = String::from_utf8_lossy(raw);
        ENCODED_WORDS
            .replace_all(text.trim(), |caps: &Captures<'_>| decode_encoded_words(&caps[0]))
            .into_owned()
    }
}

fn decode_encoded_words(words: &str) -> String {
    let line = format!("X: {}", words);
    match parse_header(line.as_bytes()) {
        Ok((header, _)) => header.get_value(),
        Err(_) => words.to_string(),
    }
}

/// Address inside `<...>`, or the whole value when there are no brackets.
pub fn sender_address(from: &str) -> String {
    ANGLE_ADDRESS
        .captures(from)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| from.trim().to_string())
}

fn part_filename(part: &ParsedMail<'_>) -> Option<String> {
    let disposition = part.get_content_disposition();
    disposition
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

fn accepts(part: &ParsedMail<'_>, policy: AttachmentPolicy) -> bool {
    match policy {
        AttachmentPolicy::AnyNamedPart => true,
        AttachmentPolicy::DispositionOnly => {
            part.get_content_disposition().disposition == DispositionType::Attachment
        }
    }
}

fn collect_attachments(part: &ParsedMail<'_>, policy: AttachmentPolicy, out: &mut Vec<Attachment>) {
    if let Some(filename) = part_filename(part) {
        if accepts(part, policy) {
            match part.get_body_raw() {
                Ok(content) => out.push(Attachment { filename, content }),
                Err(e) => warn!("Could not decode attachment {}: {}", filename, e),
            }
        } else {
            debug!("Skipping inline part {}", filename);
        }
    }

    for sub in &part.subparts {
        collect_attachments(sub, policy, out);
    }
}

/// Reduce a file name to `[0-9A-Za-z._-]`.
///
/// A name that ended in `.pdf` keeps that suffix. Sanitizing an already
/// sanitized name returns it unchanged.
pub fn sanitize_attachment_name(name: &str) -> String {
    let mut cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        cleaned = FALLBACK_NAME.to_string();
    }

    let was_pdf = name.trim().to_ascii_lowercase().ends_with(".pdf");
    if was_pdf && !cleaned.to_ascii_lowercase().ends_with(".pdf") {
        cleaned.push_str(".pdf");
    }

    cleaned
}
