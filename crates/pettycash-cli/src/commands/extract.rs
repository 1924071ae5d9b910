//! Extract command - read a voucher without saving it.
//!
//! The JSON output is the editing surface: correct it by hand, then feed it
//! to `pettycash save`.

use std::path::PathBuf;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use pettycash_core::VoucherBuilder;

use super::{emit, format_voucher, load_config, GlobalOpts, OutputFormat, TextReader};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Voucher image, or a text file with OCR output
    #[arg(required = true)]
    input: PathBuf,

    /// Treat the input as OCR text even without a .txt extension
    #[arg(long)]
    text: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print fields that could not be extracted
    #[arg(long)]
    warnings: bool,

    /// Also print the normalized text the rules ran against
    #[arg(long)]
    show_text: bool,
}

pub async fn run(args: ExtractArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config(opts)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Reading voucher...");

    let text = TextReader::new(&config.ocr).read(&args.input, args.text).await;
    pb.finish_and_clear();
    let text = text?;

    info!("Extracting voucher from {}", args.input.display());
    let result = VoucherBuilder::with_config(config.extraction.clone()).build(&text);

    emit(
        &format_voucher(&result.voucher, args.format)?,
        args.output.as_deref(),
    )?;

    if args.show_text {
        eprintln!("{}", style("Normalized text:").blue());
        eprintln!("{}", result.normalized_text);
    }

    if args.warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Extraction warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    Ok(())
}
