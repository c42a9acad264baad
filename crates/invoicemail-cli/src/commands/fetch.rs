//! Fetch command - run a single pass over the mailbox.

use clap::Args;
use console::style;

use invoicemail_core::mailbox::{ImapMailbox, Mailbox};
use invoicemail_core::pdf::PdfTextSource;
use invoicemail_core::pipeline::Pipeline;

use super::{load_config, MailboxArgs};

/// Arguments for the fetch command.
#[derive(Args)]
pub struct FetchArgs {
    #[command(flatten)]
    mailbox: MailboxArgs,
}

pub async fn run(args: FetchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    let password = args.mailbox.apply(&mut config)?;

    let mut mailbox = ImapMailbox::connect(&config.mailbox, &password)?;
    println!(
        "{} Connected as {}",
        style("✓").green(),
        config.mailbox.username
    );

    let pipeline = Pipeline::new(&config, PdfTextSource);
    let result = pipeline.run_once(&mut mailbox);
    Box::new(mailbox).logout();
    let summary = result?;

    println!("{} {}", style("✓").green(), summary);
    Ok(())
}
