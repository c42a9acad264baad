//! Subcommand implementations.

pub mod config;
pub mod fetch;
pub mod merge;
pub mod organize;
pub mod scan;
pub mod watch;

use std::path::PathBuf;

use clap::Args;

use invoicemail_core::models::config::{InvoiceMailConfig, Provider};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invoicemail")
        .join("config.json")
}

/// Path given with `--config`, or the default one.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration.
///
/// An explicit path must exist. A missing default file yields the defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<InvoiceMailConfig> {
    let path = config_path(explicit);
    if path.exists() {
        return Ok(InvoiceMailConfig::from_file(&path)?);
    }
    if explicit.is_some() {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    Ok(InvoiceMailConfig::default())
}

/// Connection options shared by `watch` and `fetch`.
#[derive(Args, Debug)]
pub struct MailboxArgs {
    /// Mail provider (ionos, outlook, gmail, yahoo)
    #[arg(long, value_parser = parse_provider)]
    provider: Option<Provider>,

    /// IMAP host, overrides the provider
    #[arg(long)]
    host: Option<String>,

    /// Login name
    #[arg(short, long)]
    username: Option<String>,

    /// Password (never written to the config file)
    #[arg(long, env = "INVOICEMAIL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Folder attachments are downloaded into
    #[arg(long)]
    pending: Option<PathBuf>,
}

impl MailboxArgs {
    /// Apply the command line overrides and return the password.
    pub fn apply(self, config: &mut InvoiceMailConfig) -> anyhow::Result<String> {
        if let Some(provider) = self.provider {
            config.mailbox.provider = Some(provider);
        }
        if let Some(host) = self.host {
            config.mailbox.host = Some(host);
        }
        if let Some(username) = self.username {
            config.mailbox.username = username;
        }
        if let Some(pending) = self.pending {
            config.folders.pending = pending;
        }

        if config.mailbox.username.is_empty() {
            anyhow::bail!("No username configured. Use --username or 'config set mailbox.username'.");
        }
        match self.password {
            Some(password) if !password.is_empty() => Ok(password),
            _ => anyhow::bail!("No password given. Use --password or INVOICEMAIL_PASSWORD."),
        }
    }
}

fn parse_provider(name: &str) -> Result<Provider, String> {
    Provider::from_name(name).ok_or_else(|| {
        format!("unknown provider '{}', expected ionos, outlook, gmail or yahoo", name)
    })
}

/// Shorten `name` to `width` characters, ending in `...` when cut.
pub fn truncate_name(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let kept: String = name.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
