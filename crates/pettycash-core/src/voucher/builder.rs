//! Voucher assembly from OCR text.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::models::config::ExtractionConfig;
use crate::models::voucher::VoucherAggregate;

use super::normalize::normalize;
use super::rules::{HeaderField, HeaderFields};
use super::tables::TableExtractor;

/// Result of voucher extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted voucher, not yet saved.
    pub voucher: VoucherAggregate,
    /// Normalized text the rules ran against.
    pub normalized_text: String,
    /// Total printed on the voucher, kept for comparison only.
    pub stated_total: Option<Decimal>,
    /// Fields and tables that fell back to defaults.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Builds a [`VoucherAggregate`] from raw OCR text.
///
/// Building is a pure function of the text and the extraction config.
#[derive(Debug, Clone)]
pub struct VoucherBuilder {
    config: ExtractionConfig,
    tables: TableExtractor,
}

impl VoucherBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::with_config(ExtractionConfig::default())
    }

    pub fn with_config(config: ExtractionConfig) -> Self {
        let tables = TableExtractor::new(&config);
        Self { config, tables }
    }

    /// Extract a voucher and report what could not be found.
    pub fn build(&self, raw_text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let text = normalize(raw_text);
        info!(
            "Extracting voucher from {} characters ({} normalized)",
            raw_text.len(),
            text.len()
        );

        let (header, missing) = HeaderFields::extract(&text, self.config.auto_correct);
        for field in missing {
            // A missing printed total is expected; the line sum replaces it anyway.
            if field != HeaderField::StatedTotal {
                warnings.push(format!("Could not extract {}", field.name()));
            }
        }

        let line_items = self.tables.line_items(&text);
        let budget_rows = self.tables.budget_rows(&text);
        let allocations = self.tables.allocations(&text);
        debug!(
            "Found {} line items, {} budget rows, {} allocation rows",
            line_items.len(),
            budget_rows.len(),
            allocations.len()
        );

        if line_items.is_empty() {
            warnings.push("Could not extract line items".to_string());
        }
        if budget_rows.is_empty() {
            warnings.push("Could not extract budget rows".to_string());
        }
        if allocations.is_empty() {
            warnings.push("Could not extract allocation rows".to_string());
        }

        let mut voucher = VoucherAggregate {
            id: None,
            paid_to: header.paid_to,
            staff_no: header.staff_no,
            email: header.email,
            contact_no: header.contact_no,
            department: header.department,
            cost_center: header.cost_center,
            station: header.station,
            date: header.date,
            voucher_no: header.voucher_no,
            amount_in_words: header.amount_in_words,
            approved_by: header.approved_by,
            received_cash: header.received_cash,
            total_amount: Decimal::ZERO,
            line_items,
            budget_rows,
            allocations,
        };
        if let Err(e) = voucher.recompute_total() {
            warn!("Leaving total at zero: {}", e);
            warnings.push(e.to_string());
        }

        if let Some(stated) = header.stated_total {
            if stated != voucher.total_amount {
                warnings.push(format!(
                    "Printed total {} differs from line item sum {}",
                    stated, voucher.total_amount
                ));
            }
        }

        debug!(
            "Extracted voucher {:?} totalling {}",
            voucher.voucher_no, voucher.total_amount
        );

        ExtractionResult {
            voucher,
            normalized_text: text,
            stated_total: header.stated_total,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Extract just the voucher.
    pub fn extract(&self, raw_text: &str) -> VoucherAggregate {
        self.build(raw_text).voucher
    }
}

impl Default for VoucherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract a voucher from OCR text with default settings.
pub fn extract(raw_text: &str) -> VoucherAggregate {
    VoucherBuilder::new().extract(raw_text)
}
