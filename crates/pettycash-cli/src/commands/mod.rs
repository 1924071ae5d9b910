//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod ingest;
pub mod list;
pub mod save;
pub mod show;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use console::style;
use tracing::debug;

use pettycash_core::models::config::{OcrConfig, PettyCashConfig};
use pettycash_core::{
    create_recognizer, recognize_until, Reconciler, SqliteVoucherStore, TextRecognizer,
    VoucherAggregate,
};

/// Options every subcommand can see.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
}

/// Output format for vouchers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per voucher
    Csv,
    /// Plain text summary
    Text,
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pettycash")
        .join("config.json")
}

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(opts: &GlobalOpts) -> anyhow::Result<PettyCashConfig> {
    if let Some(path) = &opts.config {
        return PettyCashConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config {}", path.display());
        Ok(PettyCashConfig::from_file(&path)?)
    } else {
        Ok(PettyCashConfig::default())
    }
}

/// Open the voucher database named by `--database` or the config.
pub fn open_reconciler(
    opts: &GlobalOpts,
    config: &PettyCashConfig,
) -> anyhow::Result<Reconciler<SqliteVoucherStore>> {
    let path = opts
        .database
        .clone()
        .unwrap_or_else(|| config.storage.database_path.clone());
    let store = SqliteVoucherStore::open(&path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    Ok(Reconciler::new(store))
}

/// Whether a file already holds OCR text rather than an image.
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

/// Whether a file looks like a scanned voucher image.
pub fn is_image_file(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    matches!(
        ext.as_str(),
        "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "webp"
    )
}

/// Turns input files into voucher text, loading the OCR engine on first use.
pub struct TextReader {
    config: OcrConfig,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl TextReader {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            config: config.clone(),
            recognizer: None,
        }
    }

    /// Read `path` as text when `as_text` is set or it is a `.txt` file,
    /// otherwise run OCR on it. Ctrl-C cancels a running recognition.
    pub async fn read(&mut self, path: &Path, as_text: bool) -> anyhow::Result<String> {
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }

        if as_text || is_text_file(path) {
            return Ok(fs::read_to_string(path)?);
        }

        let image = fs::read(path)?;
        let recognizer = match &self.recognizer {
            Some(r) => r.clone(),
            None => {
                let r = create_recognizer(&self.config)
                    .map_err(|e| anyhow::anyhow!("Failed to load OCR engine: {}", e))?;
                self.recognizer = Some(r.clone());
                r
            }
        };

        let cancel = async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        let text = recognize_until(recognizer, image, self.config.timeout(), cancel)
            .await
            .with_context(|| format!("OCR failed for {}", path.display()))?;

        if text.trim().is_empty() {
            anyhow::bail!("No text detected in {}", path.display());
        }
        Ok(text)
    }
}

/// Write `output` to a file, or print it.
pub fn emit(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", output),
    }
    Ok(())
}

/// Render vouchers in the requested format.
pub fn format_vouchers(vouchers: &[VoucherAggregate], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(vouchers)?),
        OutputFormat::Csv => format_csv(vouchers),
        OutputFormat::Text => Ok(vouchers
            .iter()
            .map(format_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Render one voucher in the requested format.
pub fn format_voucher(voucher: &VoucherAggregate, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(voucher)?),
        OutputFormat::Csv => format_csv(std::slice::from_ref(voucher)),
        OutputFormat::Text => Ok(format_text(voucher)),
    }
}

fn format_csv(vouchers: &[VoucherAggregate]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "voucher_no",
        "date",
        "paid_to",
        "staff_no",
        "department",
        "cost_center",
        "station",
        "line_items",
        "total_amount",
        "received_cash",
        "approved_by",
    ])?;

    for v in vouchers {
        wtr.write_record([
            v.id.map(|id| id.to_string()).unwrap_or_default(),
            v.voucher_no.clone(),
            v.date.clone(),
            v.paid_to.clone(),
            v.staff_no.clone(),
            v.department.clone(),
            v.cost_center.clone(),
            v.station.clone(),
            v.line_items.len().to_string(),
            v.total_amount.to_string(),
            v.received_cash.to_string(),
            v.approved_by.clone(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(v: &VoucherAggregate) -> String {
    let mut output = String::new();

    match v.id {
        Some(id) => output.push_str(&format!("Voucher #{} ({})\n", id, v.voucher_no)),
        None => output.push_str(&format!("Voucher {}\n", v.voucher_no)),
    }
    output.push_str(&format!("Date: {}\n", v.date));
    output.push_str(&format!("Paid to: {}", v.paid_to));
    if !v.staff_no.is_empty() {
        output.push_str(&format!(" (staff {})", v.staff_no));
    }
    output.push('\n');
    output.push_str(&format!(
        "Department: {}  Cost center: {}  Station: {}\n",
        v.department, v.cost_center, v.station
    ));

    if !v.line_items.is_empty() {
        output.push_str("\nItems:\n");
        for item in &v.line_items {
            match item.item_date {
                Some(date) => output.push_str(&format!(
                    "  {}  {:<30} {:>12.2}\n",
                    date.format("%d/%m/%Y"),
                    item.details,
                    item.amount
                )),
                None => output.push_str(&format!("  {:<30} {:>12.2}\n", item.details, item.amount)),
            }
        }
    }
    output.push_str(&format!("\nTotal: {:.2}\n", v.total_amount));

    if !v.budget_rows.is_empty() {
        output.push_str(&format!("Budget rows: {}\n", v.budget_rows.len()));
    }
    if !v.allocations.is_empty() {
        output.push_str(&format!("Allocations: {}\n", v.allocations.len()));
    }
    if !v.approved_by.is_empty() {
        output.push_str(&format!("Approved by: {}\n", v.approved_by));
    }

    output
}
