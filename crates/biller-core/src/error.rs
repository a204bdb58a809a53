//! Error types for the biller-core library.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the biller library.
#[derive(Error, Debug)]
pub enum BillerError {
    /// Line item or category validation error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised when a value cannot become part of a bill.
///
/// The receipt extractor never returns these to its caller; it records them
/// as rejected lines instead. They surface from the checked constructors
/// (`LineItem::new`, `Category::from_str`) used for manual entry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// Item description is empty after trimming.
    #[error("item description is empty")]
    EmptyDescription,

    /// Amount is zero or negative.
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount text could not be read as a number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Category is not one of the canonical categories.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Adding up amounts exceeded the largest representable total.
    #[error("amounts add up to more than the largest supported total")]
    AmountOverflow,
}

/// Result type for the biller library.
pub type Result<T> = std::result::Result<T, BillerError>;
