//! Petty-cash voucher data model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identity assigned to a voucher by the store.
pub type VoucherId = i64;

/// A complete petty-cash voucher with its owned child rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoucherAggregate {
    /// Store identity, absent until the voucher is first saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<VoucherId>,

    /// Payee ("Paid To" / "Claim By").
    pub paid_to: String,

    /// Staff number of the claimant.
    pub staff_no: String,

    /// Contact e-mail.
    pub email: String,

    /// Contact phone number.
    pub contact_no: String,

    pub department: String,

    pub cost_center: String,

    pub station: String,

    /// Voucher date as printed; vouchers use several date conventions.
    pub date: String,

    pub voucher_no: String,

    pub amount_in_words: String,

    pub approved_by: String,

    /// Cash figure in the "Received Cash" box.
    pub received_cash: Decimal,

    /// Sum of the line item amounts. Never taken from the document text.
    pub total_amount: Decimal,

    pub line_items: Vec<LineItem>,

    pub budget_rows: Vec<BudgetRow>,

    pub allocations: Vec<AllocationRow>,
}

/// A single expense line on the voucher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// What the money was spent on.
    pub details: String,

    /// Amount spent, two decimal places.
    pub amount: Decimal,

    /// Date printed next to the line, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_date: Option<NaiveDate>,
}

/// A row from the budgetary control box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetRow {
    pub account: String,
    pub cost_center: String,
    pub budget: i64,
    pub utilised: i64,
    pub variance: i64,
    pub this_payment: Decimal,
}

/// A row from the "Accounting Allocation Only" box.
///
/// Every column is required; see [`AllocationRow::missing_field`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationRow {
    pub account: String,
    pub cost_center: String,
    pub flight_no: String,
    pub aircraft: String,
    pub project: String,
    /// Amount kept as formatted text (`"450.00"`).
    pub amount: String,
    pub cross_reference: String,
    pub description: String,
}

impl AllocationRow {
    /// Name of the first column that is empty, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("account", &self.account),
            ("cost_center", &self.cost_center),
            ("flight_no", &self.flight_no),
            ("aircraft", &self.aircraft),
            ("project", &self.project),
            ("amount", &self.amount),
            ("cross_reference", &self.cross_reference),
            ("description", &self.description),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    /// Whether every column is present.
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }
}

impl VoucherAggregate {
    /// Create an empty, unsaved voucher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the line item amounts, or `None` if it overflows.
    pub fn line_item_total(&self) -> Option<Decimal> {
        self.line_items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.amount))
    }

    /// Overwrite `total_amount` with the line item sum.
    ///
    /// This is the only place the total is derived; the builder and the
    /// reconciler both go through it. On overflow the total is left as is.
    pub fn recompute_total(&mut self) -> Result<(), ValidationError> {
        self.total_amount = self.line_item_total().ok_or(ValidationError::TotalOverflow)?;
        Ok(())
    }

    /// Check the rules a voucher must satisfy before it can be stored.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (row, item) in self.line_items.iter().enumerate() {
            if item.details.trim().is_empty() {
                return Err(ValidationError::EmptyLineItem { row });
            }
            if item.amount.is_sign_negative() && !item.amount.is_zero() {
                return Err(ValidationError::NegativeAmount {
                    row,
                    amount: item.amount.to_string(),
                });
            }
            if item.amount.round_dp(2) != item.amount {
                return Err(ValidationError::SubCentAmount {
                    row,
                    amount: item.amount.to_string(),
                });
            }
        }

        if self.line_item_total().is_none() {
            return Err(ValidationError::TotalOverflow);
        }

        for (row, allocation) in self.allocations.iter().enumerate() {
            if let Some(field) = allocation.missing_field() {
                return Err(ValidationError::IncompleteAllocation { row, field });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(details: &str, amount: Decimal) -> LineItem {
        LineItem {
            details: details.to_string(),
            amount,
            item_date: None,
        }
    }

    fn allocation() -> AllocationRow {
        AllocationRow {
            account: "5100".into(),
            cost_center: "200".into(),
            flight_no: "123".into(),
            aircraft: "45".into(),
            project: "67".into(),
            amount: "450.00".into(),
            cross_reference: "99".into(),
            description: "Office supplies".into(),
        }
    }

    #[test]
    fn test_recompute_total_ignores_previous_value() {
        let mut voucher = VoucherAggregate {
            total_amount: Decimal::new(500, 0),
            line_items: vec![
                item("Book", Decimal::new(30000, 2)),
                item("Pen", Decimal::new(15000, 2)),
            ],
            ..Default::default()
        };

        voucher.recompute_total().unwrap();
        assert_eq!(voucher.total_amount, Decimal::new(45000, 2));
    }

    #[test]
    fn test_recompute_total_empty() {
        let mut voucher = VoucherAggregate {
            total_amount: Decimal::new(12, 0),
            ..Default::default()
        };
        voucher.recompute_total().unwrap();
        assert!(voucher.total_amount.is_zero());
    }

    #[test]
    fn test_recompute_total_overflow_is_an_error() {
        let mut voucher = VoucherAggregate {
            total_amount: Decimal::new(7, 0),
            line_items: vec![item("Book", Decimal::MAX), item("Pen", Decimal::ONE)],
            ..Default::default()
        };

        assert_eq!(voucher.line_item_total(), None);
        assert_eq!(voucher.recompute_total(), Err(ValidationError::TotalOverflow));
        assert_eq!(voucher.total_amount, Decimal::new(7, 0));
        assert_eq!(voucher.validate(), Err(ValidationError::TotalOverflow));
    }

    #[test]
    fn test_validate_rejects_sub_cent_amounts() {
        let mut voucher = VoucherAggregate {
            line_items: vec![item("Book", Decimal::new(1005, 3))],
            ..Default::default()
        };
        assert_eq!(
            voucher.validate(),
            Err(ValidationError::SubCentAmount {
                row: 0,
                amount: "1.005".into()
            })
        );

        // Trailing zeros are still whole cents.
        voucher.line_items[0].amount = Decimal::new(1500, 3);
        assert!(voucher.validate().is_ok());
        voucher.recompute_total().unwrap();
        assert_eq!(voucher.total_amount, Decimal::new(150, 2));
    }

    #[test]
    fn test_allocation_missing_field() {
        assert_eq!(allocation().missing_field(), None);

        let mut row = allocation();
        row.description = "  ".into();
        assert_eq!(row.missing_field(), Some("description"));

        let mut row = allocation();
        row.flight_no.clear();
        row.description.clear();
        assert_eq!(row.missing_field(), Some("flight_no"));
    }

    #[test]
    fn test_validate() {
        let mut voucher = VoucherAggregate {
            line_items: vec![item("Book", Decimal::ONE)],
            allocations: vec![allocation()],
            ..Default::default()
        };
        assert!(voucher.validate().is_ok());

        voucher.allocations[0].cross_reference.clear();
        assert_eq!(
            voucher.validate(),
            Err(ValidationError::IncompleteAllocation {
                row: 0,
                field: "cross_reference"
            })
        );

        voucher.allocations.clear();
        voucher.line_items.push(item("", Decimal::ONE));
        assert_eq!(voucher.validate(), Err(ValidationError::EmptyLineItem { row: 1 }));

        voucher.line_items[1] = item("Pins", Decimal::new(-5, 0));
        assert!(matches!(
            voucher.validate(),
            Err(ValidationError::NegativeAmount { row: 1, .. })
        ));
    }

    #[test]
    fn test_json_defaults_for_edited_input() {
        let voucher: VoucherAggregate = serde_json::from_str(
            r#"{"paid_to": "Ali Khan", "line_items": [{"details": "Book", "amount": "300.00"}]}"#,
        )
        .unwrap();

        assert_eq!(voucher.id, None);
        assert_eq!(voucher.paid_to, "Ali Khan");
        assert_eq!(voucher.line_items[0].amount, Decimal::new(30000, 2));
        assert!(voucher.budget_rows.is_empty());
    }
}
