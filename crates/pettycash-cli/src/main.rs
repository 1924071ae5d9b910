//! CLI application for petty-cash voucher digitization.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::{batch, config, extract, ingest, list, save, show, GlobalOpts};

/// Petty cash OCR - Turn scanned petty-cash vouchers into stored records
#[derive(Parser)]
#[command(name = "pettycash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Voucher database (overrides storage.database_path)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a voucher from an image or OCR text without saving
    Extract(extract::ExtractArgs),

    /// Extract a voucher and save it
    Ingest(ingest::IngestArgs),

    /// Ingest every voucher matching a pattern
    Batch(batch::BatchArgs),

    /// Save an edited voucher JSON file
    Save(save::SaveArgs),

    /// List stored vouchers, newest first
    List(list::ListArgs),

    /// Show one stored voucher
    Show(show::ShowArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let opts = GlobalOpts {
        config: cli.config,
        database: cli.database,
    };

    match cli.command {
        Commands::Extract(args) => extract::run(args, &opts).await,
        Commands::Ingest(args) => ingest::run(args, &opts).await,
        Commands::Batch(args) => batch::run(args, &opts).await,
        Commands::Save(args) => save::run(args, &opts).await,
        Commands::List(args) => list::run(args, &opts).await,
        Commands::Show(args) => show::run(args, &opts).await,
        Commands::Config(args) => config::run(args, &opts).await,
    }
}
