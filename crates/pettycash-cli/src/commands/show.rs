//! Show command - one stored voucher with all its rows.

use std::path::PathBuf;

use clap::Args;

use super::{emit, format_voucher, load_config, open_reconciler, GlobalOpts, OutputFormat};

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Voucher id
    id: i64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ShowArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;
    let reconciler = open_reconciler(opts, &config)?;

    let Some(voucher) = reconciler.get_by_id(args.id)? else {
        anyhow::bail!("Voucher {} not found", args.id);
    };

    emit(&format_voucher(&voucher, args.format)?, args.output.as_deref())
}
