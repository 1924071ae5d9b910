//! Voucher persistence and reconciliation.

mod reconcile;
mod sqlite;

pub use reconcile::Reconciler;
pub use sqlite::SqliteVoucherStore;

use crate::error::PersistenceError;
use crate::models::voucher::{VoucherAggregate, VoucherId};

/// Storage for voucher aggregates.
///
/// `insert` and `replace_all` must each be atomic: either the header and all
/// child collections are written, or the store is left unchanged.
pub trait VoucherStore: Send + Sync {
    /// Load one voucher with all child collections.
    fn find(&self, id: VoucherId) -> Result<Option<VoucherAggregate>, PersistenceError>;

    /// Store a new voucher, returning its assigned identity.
    fn insert(&self, voucher: &VoucherAggregate) -> Result<VoucherId, PersistenceError>;

    /// Overwrite the header of `id` and replace every child collection.
    fn replace_all(&self, id: VoucherId, voucher: &VoucherAggregate)
    -> Result<(), PersistenceError>;

    /// All vouchers, most recently created first.
    fn list(&self) -> Result<Vec<VoucherAggregate>, PersistenceError>;
}
