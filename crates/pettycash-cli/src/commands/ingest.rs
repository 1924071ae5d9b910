//! Ingest command - OCR, extract and save one voucher.

use std::path::PathBuf;

use clap::Args;
use console::style;

use pettycash_core::VoucherBuilder;

use super::{load_config, open_reconciler, GlobalOpts, TextReader};

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Voucher image, or a text file with OCR output
    #[arg(required = true)]
    input: PathBuf,

    /// Treat the input as OCR text even without a .txt extension
    #[arg(long)]
    text: bool,
}

pub async fn run(args: IngestArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;
    let reconciler = open_reconciler(opts, &config)?;

    let text = TextReader::new(&config.ocr).read(&args.input, args.text).await?;
    let result = VoucherBuilder::with_config(config.extraction).build(&text);

    for warning in &result.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    let id = reconciler.save(result.voucher)?;
    println!(
        "{} Saved voucher {} from {}",
        style("✓").green(),
        id,
        args.input.display()
    );

    Ok(())
}
