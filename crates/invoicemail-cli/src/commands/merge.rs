//! Merge command - combine all PDFs of a folder into one document.

use std::ffi::OsStr;
use std::path::PathBuf;

use clap::Args;
use console::style;

use invoicemail_core::pdf::{merge_folder, pdfs_in};

/// Arguments for the merge command.
#[derive(Args)]
pub struct MergeArgs {
    /// Folder with the PDFs to merge
    folder: PathBuf,

    /// Name of the merged file, written into the folder
    #[arg(short, long, default_value = "merged.pdf")]
    output: String,
}

pub async fn run(args: MergeArgs) -> anyhow::Result<()> {
    if !args.folder.is_dir() {
        anyhow::bail!("Folder not found: {}", args.folder.display());
    }

    let inputs = pdfs_in(&args.folder)?
        .into_iter()
        .filter(|p| p.file_name() != Some(OsStr::new(&args.output)))
        .count();
    println!("{} Found {} PDF files", style("ℹ").blue(), inputs);

    let output = merge_folder(&args.folder, &args.output)?;

    println!(
        "{} Merged PDF saved to {}",
        style("✓").green(),
        output.display()
    );

    Ok(())
}
