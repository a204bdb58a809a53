//! Receipt text extraction.
//!
//! Turns the free-form text a vision model returns for a receipt photo into
//! a [`ParsedBill`]. Extraction never fails on malformed input: the worst
//! case is an empty bill, which callers treat as "enter manually".

mod parser;
pub mod prompt;
pub mod rules;

pub use parser::{ExtractionResult, ReceiptExtractor};
pub use rules::items::{ItemScan, RejectReason, RejectedLine};

use crate::models::bill::ParsedBill;

/// Trait for receipt parsers.
pub trait BillParser {
    /// Parse receipt text, keeping diagnostics about what was dropped.
    fn parse(&self, text: &str) -> ExtractionResult;

    /// Parse receipt text into a bill.
    fn extract(&self, text: &str) -> ParsedBill {
        self.parse(text).bill
    }
}
