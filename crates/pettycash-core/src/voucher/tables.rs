//! Repeating-row extraction: line items, budget rows and allocation rows.

use chrono::NaiveDate;
use regex::{Captures, Regex, RegexBuilder};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::config::ExtractionConfig;
use crate::models::voucher::{AllocationRow, BudgetRow, LineItem};

use super::rules::amounts::{combine_split_amount, format_amount, parse_integer};
use super::rules::patterns::{
    ALLOCATION_PATTERN, BUDGET_PATTERN, LINE_ITEM_PATTERN, RESERVED_LABEL_PATTERN,
};

/// Where a row pattern is applied.
#[derive(Debug, Clone)]
pub enum ScanScope {
    /// Every line of the document.
    WholeDocument,
    /// Only text after the first match of the marker. No marker, no rows.
    AfterMarker(Regex),
}

impl ScanScope {
    /// Scope to the text following `label`, matched case-insensitively.
    pub fn after_label(label: &str) -> Self {
        let marker = RegexBuilder::new(&regex::escape(label))
            .case_insensitive(true)
            .build()
            .unwrap_or_else(|e| panic!("escaped label failed to compile: {}", e));
        ScanScope::AfterMarker(marker)
    }

    /// The slice of `text` this scope covers.
    ///
    /// Blanks and a colon after the marker are skipped, so a row that OCR
    /// joins onto the marker line starts the region.
    pub fn region<'t>(&self, text: &'t str) -> Option<&'t str> {
        match self {
            ScanScope::WholeDocument => Some(text),
            ScanScope::AfterMarker(marker) => marker.find(text).map(|m| {
                text[m.end()..].trim_start_matches(|c: char| matches!(c, ' ' | '\t' | ':'))
            }),
        }
    }
}

/// Collect every non-overlapping match of `pattern` within `scope`.
pub fn scan<'t>(pattern: &Regex, scope: &ScanScope, text: &'t str) -> Vec<Captures<'t>> {
    match scope.region(text) {
        Some(region) => pattern.captures_iter(region).collect(),
        None => Vec::new(),
    }
}

/// Column coercion with per-column defaults.
#[derive(Debug, Clone, Copy)]
struct Columns {
    auto_correct: bool,
}

impl Columns {
    fn text(&self, caps: &Captures<'_>, index: usize) -> String {
        caps.get(index)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }

    fn integer(&self, caps: &Captures<'_>, index: usize) -> i64 {
        let raw = caps.get(index).map_or("", |m| m.as_str());
        parse_integer(raw, self.auto_correct).unwrap_or_else(|| {
            debug!("Column {} {:?} is not an integer, using 0", index, raw);
            0
        })
    }

    fn currency(&self, caps: &Captures<'_>, whole: usize, fraction: usize) -> Option<Decimal> {
        let whole = caps.get(whole).map_or("", |m| m.as_str());
        let fraction = caps.get(fraction).map_or("", |m| m.as_str());
        combine_split_amount(whole, fraction, self.auto_correct)
    }
}

/// Extracts the three row types from normalized voucher text.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    columns: Columns,
    allocation_scope: ScanScope,
}

impl TableExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            columns: Columns {
                auto_correct: config.auto_correct,
            },
            allocation_scope: ScanScope::after_label(&config.allocation_marker),
        }
    }

    /// Line items anywhere in the document.
    pub fn line_items(&self, text: &str) -> Vec<LineItem> {
        scan(&LINE_ITEM_PATTERN, &ScanScope::WholeDocument, text)
            .iter()
            .filter_map(|caps| self.line_item(caps))
            .collect()
    }

    fn line_item(&self, caps: &Captures<'_>) -> Option<LineItem> {
        let details = self.columns.text(caps, 2);
        if RESERVED_LABEL_PATTERN.is_match(&details) {
            debug!("Skipping label line {:?}", details);
            return None;
        }

        let amount = self.columns.currency(caps, 3, 4).unwrap_or_else(|| {
            debug!("Amount for {:?} did not parse, using 0", details);
            Decimal::ZERO
        });
        let item_date = caps
            .get(1)
            .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%d/%m/%Y").ok());

        Some(LineItem {
            details,
            amount,
            item_date,
        })
    }

    /// Budget rows anywhere in the document.
    ///
    /// A column that fails to parse becomes zero; the row is kept.
    pub fn budget_rows(&self, text: &str) -> Vec<BudgetRow> {
        scan(&BUDGET_PATTERN, &ScanScope::WholeDocument, text)
            .iter()
            .map(|caps| BudgetRow {
                account: self.columns.text(caps, 1),
                cost_center: self.columns.text(caps, 2),
                budget: self.columns.integer(caps, 3),
                utilised: self.columns.integer(caps, 4),
                variance: self.columns.integer(caps, 5),
                this_payment: self.columns.currency(caps, 6, 7).unwrap_or(Decimal::ZERO),
            })
            .collect()
    }

    /// Allocation rows after the allocation marker.
    ///
    /// Rows with any empty column are dropped.
    pub fn allocations(&self, text: &str) -> Vec<AllocationRow> {
        scan(&ALLOCATION_PATTERN, &self.allocation_scope, text)
            .iter()
            .filter_map(|caps| {
                let row = AllocationRow {
                    account: self.columns.text(caps, 1),
                    cost_center: self.columns.text(caps, 2),
                    flight_no: self.columns.text(caps, 3),
                    aircraft: self.columns.text(caps, 4),
                    project: self.columns.text(caps, 5),
                    amount: self
                        .columns
                        .currency(caps, 6, 7)
                        .map(format_amount)
                        .unwrap_or_default(),
                    cross_reference: self.columns.text(caps, 8),
                    description: self.columns.text(caps, 9),
                };
                match row.missing_field() {
                    None => Some(row),
                    Some(field) => {
                        warn!("Rejecting allocation row {:?}: missing {}", &caps[0], field);
                        None
                    }
                }
            })
            .collect()
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_items_whole_document() {
        let text = "Voucher No [ 12 ]\nBook 300 00\nPen 100 00\nPins 50 00\nTotal 450 00";
        let items = TableExtractor::default().line_items(text);

        let details: Vec<_> = items.iter().map(|i| i.details.as_str()).collect();
        assert_eq!(details, vec!["Book", "Pen", "Pins"]);
        assert_eq!(items[0].amount, Decimal::new(30000, 2));
        assert_eq!(items[2].amount, Decimal::new(5000, 2));
    }

    #[test]
    fn test_line_item_with_date() {
        let items = TableExtractor::default().line_items("12/03/2025 Taxi fare 1,200.50");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].details, "Taxi fare");
        assert_eq!(items[0].amount, Decimal::new(120050, 2));
        assert_eq!(items[0].item_date, NaiveDate::from_ymd_opt(2025, 3, 12));
    }

    #[test]
    fn test_line_item_bad_date_is_dropped_not_the_row() {
        let items = TableExtractor::default().line_items("31/02/2025 Taxi 90 00");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_date, None);
    }

    #[test]
    fn test_budget_rows() {
        let text = "Budget\n5100 200 | 1000 500 500 450 00\n5200 210 | 2,000 100 1900 75.50";
        let rows = TableExtractor::default().budget_rows(text);

        assert_eq!(
            rows,
            vec![
                BudgetRow {
                    account: "5100".into(),
                    cost_center: "200".into(),
                    budget: 1000,
                    utilised: 500,
                    variance: 500,
                    this_payment: Decimal::new(45000, 2),
                },
                BudgetRow {
                    account: "5200".into(),
                    cost_center: "210".into(),
                    budget: 2000,
                    utilised: 100,
                    variance: 1900,
                    this_payment: Decimal::new(7550, 2),
                },
            ]
        );
    }

    #[test]
    fn test_budget_bad_column_becomes_zero() {
        let rows = TableExtractor::default().budget_rows("5100 200 | 1000 5X0 500 450");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].budget, 1000);
        assert_eq!(rows[0].utilised, 0);
        assert_eq!(rows[0].variance, 500);
        assert_eq!(rows[0].this_payment, Decimal::new(450, 0));
    }

    #[test]
    fn test_budget_auto_correct_toggle() {
        let text = "5100 200 | 1O00 500 500 450";
        let corrected = TableExtractor::default().budget_rows(text);
        assert_eq!(corrected[0].budget, 1000);

        let config = ExtractionConfig {
            auto_correct: false,
            ..Default::default()
        };
        let strict = TableExtractor::new(&config).budget_rows(text);
        assert_eq!(strict[0].budget, 0);
    }

    #[test]
    fn test_allocations_after_marker() {
        let text = "5100 200 |111 22 33 100 00 44 Before marker\n\
                    Accounting Allocation Only\n\
                    5100 200 |123 45 67 450 00 99 Office supplies";
        let rows = TableExtractor::default().allocations(text);

        assert_eq!(
            rows,
            vec![AllocationRow {
                account: "5100".into(),
                cost_center: "200".into(),
                flight_no: "123".into(),
                aircraft: "45".into(),
                project: "67".into(),
                amount: "450.00".into(),
                cross_reference: "99".into(),
                description: "Office supplies".into(),
            }]
        );
    }

    #[test]
    fn test_allocations_without_marker() {
        let text = "5100 200 |123 45 67 450 00 99 Office supplies";
        assert!(TableExtractor::default().allocations(text).is_empty());
    }

    #[test]
    fn test_allocation_marker_is_case_insensitive() {
        let text = "ACCOUNTING ALLOCATION ONLY\n5100 200 |123 45 67 450 00 99 Stationery";
        assert_eq!(TableExtractor::default().allocations(text).len(), 1);
    }

    #[test]
    fn test_allocation_row_on_marker_line() {
        let text = "Accounting Allocation Only 5100 200 |123 45 67 450 00 99 Office supplies\n\
                    5200 210 |124 46 68 75 50 98 Taxi";
        let rows = TableExtractor::default().allocations(text);

        let accounts: Vec<_> = rows.iter().map(|r| r.account.as_str()).collect();
        assert_eq!(accounts, vec!["5100", "5200"]);
        assert_eq!(rows[0].description, "Office supplies");
        assert_eq!(rows[1].amount, "75.50");
    }

    #[test]
    fn test_allocation_missing_description_rejected() {
        let text = "Accounting Allocation Only\n5100 200 |123 45 67 450 00 99";
        assert!(TableExtractor::default().allocations(text).is_empty());
    }

    #[test]
    fn test_scope_region() {
        let scope = ScanScope::after_label("alloc");
        assert_eq!(scope.region("head ALLOC tail"), Some("tail"));
        assert_eq!(scope.region("alloc:\nrow"), Some("\nrow"));
        assert_eq!(scope.region("nothing"), None);
        assert_eq!(ScanScope::WholeDocument.region("all"), Some("all"));
    }
}
