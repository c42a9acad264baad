//! CLI application for mailbox invoice intake.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, fetch, merge, organize, scan, watch};

/// Invoice mail - download mailed invoices, find their numbers and file them
#[derive(Parser)]
#[command(name = "invoicemail")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the mailbox and process new mail until interrupted
    Watch(watch::WatchArgs),

    /// Process unseen mail once
    Fetch(fetch::FetchArgs),

    /// Show the invoice number of every PDF in a folder
    Scan(scan::ScanArgs),

    /// Rename recognized invoices and move them to the done folder
    Organize(organize::OrganizeArgs),

    /// Merge all PDFs of a folder into one file
    Merge(merge::MergeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Watch(args) => watch::run(args, cli.config.as_deref()).await,
        Commands::Fetch(args) => fetch::run(args, cli.config.as_deref()).await,
        Commands::Scan(args) => scan::run(args).await,
        Commands::Organize(args) => organize::run(args, cli.config.as_deref()).await,
        Commands::Merge(args) => merge::run(args).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
