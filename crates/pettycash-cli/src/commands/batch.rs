//! Batch command - ingest every voucher matching a glob pattern.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use pettycash_core::{VoucherBuilder, VoucherId};

use super::{is_image_file, is_text_file, load_config, open_reconciler, GlobalOpts, TextReader};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for voucher images or OCR text files
    #[arg(required = true)]
    input: String,

    /// Extract only; do not save to the database
    #[arg(long)]
    dry_run: bool,

    /// Write a summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome for one input file.
struct FileResult {
    path: PathBuf,
    voucher_id: Option<VoucherId>,
    voucher_no: String,
    total: String,
    warnings: usize,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, opts: &GlobalOpts) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(opts)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_image_file(p) || is_text_file(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let reconciler = if args.dry_run {
        None
    } else {
        Some(open_reconciler(opts, &config)?)
    };
    let builder = VoucherBuilder::with_config(config.extraction.clone());
    let mut reader = TextReader::new(&config.ocr);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        pb.set_message(path.display().to_string());

        let outcome = async {
            let text = reader.read(&path, false).await?;
            let result = builder.build(&text);
            let id = match &reconciler {
                Some(reconciler) => Some(reconciler.save(result.voucher.clone())?),
                None => None,
            };
            anyhow::Ok((result, id))
        }
        .await;

        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok((result, id)) => {
                debug!("{} -> voucher {:?}", path.display(), id);
                results.push(FileResult {
                    path,
                    voucher_id: id,
                    voucher_no: result.voucher.voucher_no,
                    total: result.voucher.total_amount.to_string(),
                    warnings: result.warnings.len(),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = format!("{:#}", e);
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(FileResult {
                        path,
                        voucher_id: None,
                        voucher_no: String::new(),
                        total: String::new(),
                        warnings: 0,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let succeeded = results.len() - failed.len();

    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(succeeded).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "voucher_id",
        "voucher_no",
        "total_amount",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let status = if result.error.is_some() { "error" } else { "success" };

        wtr.write_record([
            filename,
            status,
            &result.voucher_id.map(|id| id.to_string()).unwrap_or_default(),
            &result.voucher_no,
            &result.total,
            &result.warnings.to_string(),
            &result.processing_time_ms.to_string(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
