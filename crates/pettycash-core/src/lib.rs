//! Core library for petty-cash voucher digitization.
//!
//! This crate provides:
//! - OCR collaborators with timeout and cancellation
//! - Rule-based voucher field and table extraction from OCR text
//! - Voucher data models and configuration
//! - SQLite persistence with insert-or-replace reconciliation

pub mod error;
pub mod models;
pub mod ocr;
pub mod store;
pub mod voucher;

pub use error::{OcrError, PersistenceError, PettyCashError, Result, ValidationError};
pub use models::config::PettyCashConfig;
pub use models::voucher::{AllocationRow, BudgetRow, LineItem, VoucherAggregate, VoucherId};
pub use ocr::{create_recognizer, recognize_until, recognize_with_timeout, TextRecognizer};
pub use store::{Reconciler, SqliteVoucherStore, VoucherStore};
pub use voucher::{extract, ExtractionResult, VoucherBuilder};
