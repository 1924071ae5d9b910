//! Error types for the pettycash-core library.

use std::time::Duration;

use thiserror::Error;

/// Main error type for the pettycash library.
#[derive(Error, Debug)]
pub enum PettyCashError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// The voucher failed validation and was not saved.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The store rejected or failed an operation.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Recognition did not finish within the configured time.
    #[error("recognition timed out after {0:?}")]
    Timeout(Duration),

    /// Recognition was cancelled by the caller.
    #[error("recognition cancelled")]
    Cancelled,
}

/// Reasons a voucher is refused by the reconciler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An accounting allocation row is missing one of its columns.
    #[error("allocation row {row} is missing {field}")]
    IncompleteAllocation { row: usize, field: &'static str },

    /// A line item has no details text.
    #[error("line item {row} has empty details")]
    EmptyLineItem { row: usize },

    /// A line item carries a negative amount.
    #[error("line item {row} has negative amount {amount}")]
    NegativeAmount { row: usize, amount: String },

    /// A line item amount is finer than whole cents.
    #[error("line item {row} amount {amount} has more than two decimal places")]
    SubCentAmount { row: usize, amount: String },

    /// The line item amounts do not fit in a single total.
    #[error("line item total is out of range")]
    TotalOverflow,
}

/// Errors raised by a voucher store.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// SQLite failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The database file or its directory could not be prepared.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No voucher exists with the given identity.
    #[error("voucher {0} not found")]
    NotFound(i64),

    /// A stored value could not be read back.
    #[error("corrupt value in column {column}: {value}")]
    Corrupt { column: &'static str, value: String },

    /// The store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result type for the pettycash library.
pub type Result<T> = std::result::Result<T, PettyCashError>;
