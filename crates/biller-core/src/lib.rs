//! Core library for the Biller expense tracker.
//!
//! This crate provides:
//! - Receipt text extraction (date, line items, categories) from vision model output
//! - Bill data models and per-item expense records
//! - Monthly and per-category expense summaries with bill list filters
//! - The prompt that asks the vision model for the expected item format

pub mod error;
pub mod models;
pub mod receipt;
pub mod ledger;

pub use error::{BillerError, ExtractionError, Result};
pub use models::bill::{BillRecord, Category, LineItem, ParsedBill};
pub use models::config::{BillerConfig, CategoryPolicy, ExtractionConfig};
pub use receipt::{BillParser, ExtractionResult, ReceiptExtractor, RejectReason, RejectedLine};
pub use receipt::prompt::{build_prompt, RECEIPT_PROMPT};
pub use ledger::{
    category_summary, monthly_summary, total_spent, BillFilter, CategoryTotal, DateRange,
    MonthlyTotal,
};
