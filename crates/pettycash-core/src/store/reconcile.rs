//! Merging extracted or edited vouchers into stored state.

use tracing::info;

use crate::error::Result;
use crate::models::voucher::{VoucherAggregate, VoucherId};

use super::VoucherStore;

/// Decides between insert and full replace for each save.
pub struct Reconciler<S> {
    store: S,
}

impl<S: VoucherStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate, recompute the total, then insert or replace.
    ///
    /// A voucher without an identity, or whose identity is unknown to the
    /// store, is inserted and receives a fresh identity. Otherwise its header
    /// is overwritten and every child collection replaced.
    pub fn save(&self, mut voucher: VoucherAggregate) -> Result<VoucherId> {
        voucher.validate()?;
        voucher.recompute_total()?;

        let existing = match voucher.id {
            Some(id) => self.store.find(id)?.map(|_| id),
            None => None,
        };

        match existing {
            Some(id) => {
                self.store.replace_all(id, &voucher)?;
                info!(
                    "Replaced voucher {} ({} line items, total {})",
                    id,
                    voucher.line_items.len(),
                    voucher.total_amount
                );
                Ok(id)
            }
            None => {
                let id = self.store.insert(&voucher)?;
                info!(
                    "Inserted voucher {} ({} line items, total {})",
                    id,
                    voucher.line_items.len(),
                    voucher.total_amount
                );
                Ok(id)
            }
        }
    }

    /// Every stored voucher, newest first.
    pub fn list(&self) -> Result<Vec<VoucherAggregate>> {
        Ok(self.store.list()?)
    }

    pub fn get_by_id(&self, id: VoucherId) -> Result<Option<VoucherAggregate>> {
        Ok(self.store.find(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PettyCashError, ValidationError};
    use crate::models::voucher::{AllocationRow, LineItem};
    use crate::store::SqliteVoucherStore;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn reconciler() -> Reconciler<SqliteVoucherStore> {
        Reconciler::new(SqliteVoucherStore::open_in_memory().unwrap())
    }

    fn item(details: &str, amount: i64) -> LineItem {
        LineItem {
            details: details.into(),
            amount: Decimal::new(amount, 0),
            item_date: None,
        }
    }

    fn voucher() -> VoucherAggregate {
        VoucherAggregate {
            voucher_no: "1042".into(),
            line_items: vec![item("Book", 300), item("Pen", 100)],
            ..Default::default()
        }
    }

    #[test]
    fn test_save_new_assigns_id_and_total() {
        let reconciler = reconciler();
        let mut input = voucher();
        input.total_amount = Decimal::new(9999, 0);

        let id = reconciler.save(input).unwrap();
        let stored = reconciler.get_by_id(id).unwrap().unwrap();

        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.total_amount, Decimal::new(400, 0));
    }

    #[test]
    fn test_resave_replaces_children() {
        let reconciler = reconciler();
        let id = reconciler.save(voucher()).unwrap();

        let mut edited = reconciler.get_by_id(id).unwrap().unwrap();
        edited.line_items = vec![item("Taxi", 75)];
        let again = reconciler.save(edited).unwrap();

        assert_eq!(again, id);
        let stored = reconciler.get_by_id(id).unwrap().unwrap();
        assert_eq!(stored.line_items, vec![item("Taxi", 75)]);
        assert_eq!(stored.total_amount, Decimal::new(75, 0));
        assert_eq!(reconciler.list().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_id_is_inserted() {
        let reconciler = reconciler();
        let mut input = voucher();
        input.id = Some(500);

        let id = reconciler.save(input).unwrap();
        assert_ne!(id, 500);
        assert!(reconciler.get_by_id(500).unwrap().is_none());
        assert!(reconciler.get_by_id(id).unwrap().is_some());
    }

    #[test]
    fn test_incomplete_allocation_rejected() {
        let reconciler = reconciler();
        let mut input = voucher();
        input.allocations.push(AllocationRow {
            account: "5100".into(),
            ..Default::default()
        });

        let err = reconciler.save(input).unwrap_err();
        assert!(matches!(
            err,
            PettyCashError::Validation(ValidationError::IncompleteAllocation { row: 0, .. })
        ));
        assert!(reconciler.list().unwrap().is_empty());
    }

    #[test]
    fn test_sub_cent_amount_rejected() {
        let reconciler = reconciler();
        let mut input = voucher();
        input.line_items[0].amount = Decimal::new(1005, 3);

        let err = reconciler.save(input).unwrap_err();
        assert!(matches!(
            err,
            PettyCashError::Validation(ValidationError::SubCentAmount { row: 0, .. })
        ));
        assert!(reconciler.list().unwrap().is_empty());
    }

    #[test]
    fn test_saved_total_matches_line_items() {
        let reconciler = reconciler();
        let mut input = voucher();
        input.line_items[0].amount = Decimal::new(30055, 2);

        let id = reconciler.save(input).unwrap();
        let stored = reconciler.get_by_id(id).unwrap().unwrap();
        assert_eq!(Some(stored.total_amount), stored.line_item_total());
        assert_eq!(stored.total_amount, Decimal::new(40055, 2));
    }

    #[test]
    fn test_overflowing_total_rejected() {
        let reconciler = reconciler();
        let mut input = voucher();
        input.line_items[0].amount = Decimal::MAX;

        let err = reconciler.save(input).unwrap_err();
        assert!(matches!(
            err,
            PettyCashError::Validation(ValidationError::TotalOverflow)
        ));
        assert!(reconciler.list().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_resave_keeps_stored_state() {
        let reconciler = reconciler();
        let id = reconciler.save(voucher()).unwrap();

        let mut edited = reconciler.get_by_id(id).unwrap().unwrap();
        edited.line_items.push(item("", 10));
        assert!(reconciler.save(edited).is_err());

        let stored = reconciler.get_by_id(id).unwrap().unwrap();
        assert_eq!(stored.line_items.len(), 2);
    }

    #[test]
    fn test_list_newest_first() {
        let reconciler = reconciler();
        let first = reconciler.save(voucher()).unwrap();
        let second = reconciler.save(voucher()).unwrap();

        let ids: Vec<_> = reconciler.list().unwrap().iter().filter_map(|v| v.id).collect();
        assert_eq!(ids, vec![second, first]);
    }
}
