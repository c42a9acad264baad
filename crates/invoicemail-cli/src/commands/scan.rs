//! Scan command - list the invoice number found in every PDF of a folder.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use invoicemail_core::invoice::{list_pdfs, InvoiceNumberExtractor, InvoiceScanner};
use invoicemail_core::models::record::InvoiceMatch;
use invoicemail_core::pdf::PdfTextSource;

use super::truncate_name;

const FILENAME_WIDTH: usize = 20;
const NUMBER_WIDTH: usize = 25;

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Folder to scan (recursively)
    folder: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: ScanFormat,

    /// Ignore bare digit runs and only accept labeled numbers
    #[arg(long)]
    labeled_only: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScanFormat {
    Table,
    Json,
}

pub async fn run(args: ScanArgs) -> anyhow::Result<()> {
    let matches = scan_with_progress(&args.folder, args.labeled_only)?;

    match args.format {
        ScanFormat::Table => print_table(&matches),
        ScanFormat::Json => println!("{}", serde_json::to_string_pretty(&matches)?),
    }

    Ok(())
}

/// Scan every PDF below `folder`, showing a progress bar.
pub fn scan_with_progress(folder: &Path, labeled_only: bool) -> anyhow::Result<Vec<InvoiceMatch>> {
    if !folder.is_dir() {
        anyhow::bail!("Folder not found: {}", folder.display());
    }

    let files = list_pdfs(folder)?;
    let mut scanner = InvoiceScanner::new(PdfTextSource);
    if labeled_only {
        scanner = scanner.with_extractor(InvoiceNumberExtractor::new().labeled_only());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut matches = Vec::with_capacity(files.len());
    for path in &files {
        matches.push(scanner.scan_file(path));
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(matches)
}

fn print_table(matches: &[InvoiceMatch]) {
    if matches.is_empty() {
        println!("{} No PDF files found.", style("ℹ").blue());
        return;
    }

    println!(
        "{:<fw$} {:<nw$}",
        style("Filename").bold(),
        style("Rechnungsnummer").bold(),
        fw = FILENAME_WIDTH,
        nw = NUMBER_WIDTH
    );
    println!("{}", "=".repeat(FILENAME_WIDTH + NUMBER_WIDTH));

    for m in matches {
        let number = match &m.invoice_number {
            Some(number) => style(number.as_str()).green(),
            None => style(m.display_number()).yellow(),
        };
        println!(
            "{:<fw$} {:<nw$}",
            truncate_name(&m.file_name(), FILENAME_WIDTH),
            number,
            fw = FILENAME_WIDTH,
            nw = NUMBER_WIDTH
        );
    }
}
