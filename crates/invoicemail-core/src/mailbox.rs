//! Mailbox access over IMAP.

use std::net::TcpStream;

use imap::Session;
use native_tls::{TlsConnector, TlsStream};
use tracing::{debug, info, warn};

use crate::error::MailboxError;
use crate::models::config::MailboxConfig;

/// Result type for mailbox operations.
pub type Result<T> = std::result::Result<T, MailboxError>;

/// Source of unread messages.
pub trait Mailbox: Send {
    /// Raw RFC 822 bytes of every unseen message, oldest first.
    ///
    /// Fetched messages are marked as seen.
    fn fetch_unseen(&mut self) -> Result<Vec<Vec<u8>>>;

    /// End the session.
    fn logout(self: Box<Self>);
}

/// IMAP over TLS session with the configured folder selected.
pub struct ImapMailbox {
    session: Session<TlsStream<TcpStream>>,
    user: String,
}

impl ImapMailbox {
    /// Connect, log in and select the configured folder.
    pub fn connect(config: &MailboxConfig, password: &str) -> Result<Self> {
        let host = config.resolved_host().ok_or(MailboxError::NoHost)?;

        debug!("Connecting to {}:{}", host, config.port);
        let tls = TlsConnector::builder().build()?;
        let client = imap::connect((host.as_str(), config.port), &host, &tls)?;

        let mut session = client
            .login(&config.username, password)
            .map_err(|(e, _)| MailboxError::Login {
                user: config.username.clone(),
                reason: e.to_string(),
            })?;

        session.select(&config.folder)?;
        info!("Logged in as {} on {}, folder {}", config.username, host, config.folder);

        Ok(Self {
            session,
            user: config.username.clone(),
        })
    }
}

impl Mailbox for ImapMailbox {
    fn fetch_unseen(&mut self) -> Result<Vec<Vec<u8>>> {
        let mut ids: Vec<u32> = self.session.search("UNSEEN")?.into_iter().collect();
        ids.sort_unstable();
        debug!("{} unseen messages", ids.len());

        let mut messages = Vec::with_capacity(ids.len());
        for id in ids {
            let fetched = self.session.fetch(id.to_string(), "RFC822")?;
            for message in fetched.iter() {
                match message.body() {
                    Some(body) => messages.push(body.to_vec()),
                    None => warn!("Message {} has no body", id),
                }
            }
        }
        Ok(messages)
    }

    fn logout(mut self: Box<Self>) {
        match self.session.logout() {
            Ok(()) => info!("Logged out {}", self.user),
            Err(e) => warn!("Logout failed for {}: {}", self.user, e),
        }
    }
}
