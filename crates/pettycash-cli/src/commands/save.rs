//! Save command - persist an edited voucher JSON file.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;

use pettycash_core::VoucherAggregate;

use super::{load_config, open_reconciler, GlobalOpts};

/// Arguments for the save command.
#[derive(Args)]
pub struct SaveArgs {
    /// Voucher JSON, as printed by `extract` or `show`
    #[arg(required = true)]
    input: PathBuf,

    /// Replace this stored voucher instead of the id inside the file
    #[arg(long)]
    id: Option<i64>,

    /// Store as a new voucher even if the file carries an id
    #[arg(long, conflicts_with = "id")]
    new: bool,
}

pub async fn run(args: SaveArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;
    let reconciler = open_reconciler(opts, &config)?;

    let data = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let mut voucher: VoucherAggregate = serde_json::from_str(&data)
        .with_context(|| format!("{} is not a voucher JSON file", args.input.display()))?;

    if args.new {
        voucher.id = None;
    } else if let Some(id) = args.id {
        voucher.id = Some(id);
    }

    let id = reconciler.save(voucher)?;
    println!("{} Saved voucher {}", style("✓").green(), id);

    Ok(())
}
