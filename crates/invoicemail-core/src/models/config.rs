//! Configuration structures for the mailbox pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Main configuration for invoicemail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceMailConfig {
    /// Mailbox connection.
    pub mailbox: MailboxConfig,

    /// Pending and done folders.
    pub folders: FolderConfig,

    /// Poll loop settings.
    pub polling: PollingConfig,

    /// Metadata file locations.
    pub store: StoreConfig,

    /// Attachment handling.
    pub extraction: ExtractionConfig,
}

/// Known mail providers with a fixed IMAP host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Ionos,
    Outlook,
    Gmail,
    Yahoo,
}

impl Provider {
    /// IMAP host for this provider.
    pub fn imap_host(self) -> &'static str {
        match self {
            Provider::Ionos => "imap.ionos.es",
            Provider::Outlook => "outlook.office365.com",
            Provider::Gmail => "imap.gmail.com",
            Provider::Yahoo => "imap.mail.yahoo.com",
        }
    }

    /// Parse a provider name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ionos" => Some(Provider::Ionos),
            "outlook" => Some(Provider::Outlook),
            "gmail" => Some(Provider::Gmail),
            "yahoo" => Some(Provider::Yahoo),
            _ => None,
        }
    }
}

/// Mailbox connection configuration.
///
/// The password is never stored; it is supplied at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    /// Provider used to look up the IMAP host.
    pub provider: Option<Provider>,

    /// Explicit IMAP host, overrides `provider`.
    pub host: Option<String>,

    /// IMAP over TLS port.
    pub port: u16,

    /// Login name, usually the email address.
    pub username: String,

    /// Folder to poll.
    pub folder: String,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            provider: None,
            host: None,
            port: 993,
            username: String::new(),
            folder: "INBOX".to_string(),
        }
    }
}

impl MailboxConfig {
    /// Host to connect to: explicit host first, then the provider table.
    pub fn resolved_host(&self) -> Option<String> {
        self.host
            .clone()
            .filter(|h| !h.trim().is_empty())
            .or_else(|| self.provider.map(|p| p.imap_host().to_string()))
    }
}

/// Pending/done folder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    /// Folder attachments are downloaded into.
    pub pending: PathBuf,

    /// Folder renamed files are moved into. Derived from `pending` when unset.
    pub done: Option<PathBuf>,

    /// Substring of the pending folder name replaced to derive the done folder.
    pub pending_marker: String,

    /// Replacement for `pending_marker`.
    pub done_marker: String,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            pending: PathBuf::from("re_"),
            done: None,
            pending_marker: "re_".to_string(),
            done_marker: "Re_Erledigt".to_string(),
        }
    }
}

/// Poll loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds to wait between two passes.
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

/// Metadata file locations. Relative paths resolve against the pending folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON array of email records.
    pub json_path: PathBuf,

    /// Spreadsheet of email records.
    pub sheet_path: PathBuf,

    /// CSV log of moved files.
    pub moved_log_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            json_path: PathBuf::from("email_info.json"),
            sheet_path: PathBuf::from("email_info.xlsx"),
            moved_log_path: PathBuf::from("moved_files.csv"),
        }
    }
}

impl StoreConfig {
    fn resolve(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }

    pub fn json_path_in(&self, base: &Path) -> PathBuf {
        Self::resolve(base, &self.json_path)
    }

    pub fn sheet_path_in(&self, base: &Path) -> PathBuf {
        Self::resolve(base, &self.sheet_path)
    }

    pub fn moved_log_path_in(&self, base: &Path) -> PathBuf {
        Self::resolve(base, &self.moved_log_path)
    }
}

/// Which MIME parts count as attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentPolicy {
    /// Any part that carries a filename.
    #[default]
    AnyNamedPart,
    /// Only parts with `Content-Disposition: attachment`.
    DispositionOnly,
}

/// Attachment and invoice extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Which MIME parts are saved.
    pub attachment_policy: AttachmentPolicy,
}

impl InvoiceMailConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_hosts() {
        assert_eq!(Provider::Gmail.imap_host(), "imap.gmail.com");
        assert_eq!(Provider::from_name("IONOS"), Some(Provider::Ionos));
        assert_eq!(Provider::from_name("aol"), None);
    }

    #[test]
    fn test_host_overrides_provider() {
        let mut mailbox = MailboxConfig {
            provider: Some(Provider::Yahoo),
            ..MailboxConfig::default()
        };
        assert_eq!(mailbox.resolved_host().as_deref(), Some("imap.mail.yahoo.com"));

        mailbox.host = Some("mail.example.org".to_string());
        assert_eq!(mailbox.resolved_host().as_deref(), Some("mail.example.org"));

        mailbox.host = Some("  ".to_string());
        assert_eq!(mailbox.resolved_host().as_deref(), Some("imap.mail.yahoo.com"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: InvoiceMailConfig =
            serde_json::from_str(r#"{"mailbox": {"provider": "gmail", "username": "me@gmail.com"}}"#)
                .unwrap();
        assert_eq!(config.mailbox.port, 993);
        assert_eq!(config.mailbox.folder, "INBOX");
        assert_eq!(config.polling.interval_secs, 30);
        assert_eq!(config.extraction.attachment_policy, AttachmentPolicy::AnyNamedPart);
    }

    #[test]
    fn test_store_paths_resolve_against_base() {
        let store = StoreConfig::default();
        let base = Path::new("/data/re_");
        assert_eq!(store.json_path_in(base), PathBuf::from("/data/re_/email_info.json"));
    }

    #[test]
    fn test_config_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = InvoiceMailConfig::default();
        config.polling.interval_secs = 5;
        config.save(&path).unwrap();

        let loaded = InvoiceMailConfig::from_file(&path).unwrap();
        assert_eq!(loaded.polling.interval_secs, 5);
    }
}
