//! Organize command - rename recognized invoices and move them to the done folder.

use std::path::PathBuf;

use clap::Args;
use console::style;

use invoicemail_core::models::config::FolderConfig;
use invoicemail_core::organize::{FileOrganizer, FolderLayout};
use invoicemail_core::store::MovedLog;

use super::{load_config, scan::scan_with_progress};

/// Arguments for the organize command.
#[derive(Args)]
pub struct OrganizeArgs {
    /// Folder holding the downloaded PDFs (defaults to the configured pending folder)
    folder: Option<PathBuf>,

    /// Done folder (derived from the pending folder name when omitted)
    #[arg(short, long)]
    done: Option<PathBuf>,

    /// Only show what would be moved
    #[arg(long)]
    dry_run: bool,

    /// Ignore bare digit runs and only accept labeled numbers
    #[arg(long)]
    labeled_only: bool,
}

pub async fn run(args: OrganizeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let folders = FolderConfig {
        pending: args.folder.unwrap_or_else(|| config.folders.pending.clone()),
        done: args.done.or_else(|| config.folders.done.clone()),
        ..config.folders.clone()
    };
    let layout = FolderLayout::from_config(&folders);
    let matches = scan_with_progress(&layout.pending, args.labeled_only)?;

    let found: Vec<_> = matches.iter().filter(|m| m.invoice_number.is_some()).collect();
    println!(
        "{} {} of {} files carry an invoice number",
        style("ℹ").blue(),
        found.len(),
        matches.len()
    );

    if args.dry_run {
        for m in &found {
            println!("  {} -> {}", m.file_name(), layout.done.display());
        }
        return Ok(());
    }

    let organizer = FileOrganizer::new(layout.clone());
    let moved = organizer.organize_all(&matches);

    let log = MovedLog::new(config.store.moved_log_path_in(&layout.pending));
    log.append(&moved)?;

    for record in &moved {
        println!("{} {}", style("✓").green(), record.path().display());
    }
    let failed = found.len() - moved.len();
    if failed > 0 {
        println!("{} {} files could not be moved", style("⚠").yellow(), failed);
    }

    println!(
        "{} Moved {} files to {}",
        style("✓").green(),
        moved.len(),
        layout.done.display()
    );

    Ok(())
}
