//! Watch command - poll the mailbox until interrupted.

use std::time::Duration;

use clap::Args;
use console::style;
use tracing::info;

use invoicemail_core::mailbox::{ImapMailbox, Mailbox};
use invoicemail_core::pdf::PdfTextSource;
use invoicemail_core::pipeline::Pipeline;
use invoicemail_core::poller::{Connect, Poller};

use super::{load_config, MailboxArgs};

/// Arguments for the watch command.
#[derive(Args)]
pub struct WatchArgs {
    #[command(flatten)]
    mailbox: MailboxArgs,

    /// Seconds between two checks (overrides the config)
    #[arg(short, long)]
    interval: Option<u64>,
}

pub async fn run(args: WatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    let password = args.mailbox.apply(&mut config)?;
    if let Some(interval) = args.interval {
        config.polling.interval_secs = interval;
    }

    let session = match ImapMailbox::connect(&config.mailbox, &password) {
        Ok(session) => {
            println!(
                "{} Connected as {}",
                style("✓").green(),
                config.mailbox.username
            );
            session
        }
        Err(e) => {
            println!("{} Connection failed: {}", style("✗").red(), e);
            return Err(e.into());
        }
    };

    let mailbox_config = config.mailbox.clone();
    let connect: Connect = Box::new(move || -> invoicemail_core::Result<Box<dyn Mailbox>> {
        let session = ImapMailbox::connect(&mailbox_config, &password)?;
        Ok(Box::new(session) as Box<dyn Mailbox>)
    });

    let pipeline = Pipeline::new(&config, PdfTextSource);
    println!(
        "{} Saving attachments to {}",
        style("ℹ").blue(),
        pipeline.layout().pending.display()
    );

    let handle = Poller::new(
        pipeline,
        connect,
        Duration::from_secs(config.polling.interval_secs),
    )
    .with_session(Box::new(session))
    .spawn()?;

    println!("Monitoring for new emails... Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;

    info!("Interrupted, stopping poller");
    tokio::task::spawn_blocking(move || handle.stop()).await?;
    println!("{} Stopped", style("✓").green());

    Ok(())
}
