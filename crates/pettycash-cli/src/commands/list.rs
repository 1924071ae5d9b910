//! List command - stored vouchers, newest first.

use std::path::PathBuf;

use clap::Args;

use super::{emit, format_vouchers, load_config, open_reconciler, GlobalOpts, OutputFormat};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Show at most this many vouchers
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ListArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;
    let reconciler = open_reconciler(opts, &config)?;

    let mut vouchers = reconciler.list()?;
    if let Some(limit) = args.limit {
        vouchers.truncate(limit);
    }

    emit(&format_vouchers(&vouchers, args.format)?, args.output.as_deref())
}
