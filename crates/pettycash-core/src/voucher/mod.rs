//! Voucher extraction pipeline: normalization, field rules, tables, assembly.

mod builder;
pub mod normalize;
pub mod rules;
pub mod tables;

pub use builder::{extract, ExtractionResult, VoucherBuilder};
pub use normalize::{normalize, normalized_lines, NormalizedLines};
pub use tables::{ScanScope, TableExtractor};
