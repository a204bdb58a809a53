//! Receipt parser combining the date, item and total rules.

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{BillerError, Result};
use crate::models::bill::ParsedBill;
use crate::models::config::{CategoryPolicy, ExtractionConfig};

use super::rules::{
    amounts::extract_stated_total,
    dates::DateExtractor,
    items::{ItemExtractor, RejectedLine},
    patterns::{stated_total_pattern, DEFAULT_CURRENCY_SYMBOL, STATED_TOTAL},
};
use super::BillParser;

/// Result of receipt extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted bill.
    pub bill: ParsedBill,
    /// Raw model text.
    pub raw_text: String,
    /// Text the date was read from, before normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_source: Option<String>,
    /// Total the model stated itself; never used as the bill total.
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub stated_total: Option<Decimal>,
    /// Item lines that were dropped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedLine>,
    /// Extraction warnings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Stateless receipt extractor.
///
/// Runs three independent passes over the text: date, line items, and a
/// diagnostic read of the model's own total. The bill total is always the
/// sum of accepted items.
#[derive(Debug, Clone)]
pub struct ReceiptExtractor {
    dates: DateExtractor,
    items: ItemExtractor,
    total_pattern: Regex,
    currency_symbol: String,
    check_stated_total: bool,
}

impl ReceiptExtractor {
    /// Create an extractor for `€` receipts with exact category matching.
    pub fn new() -> Self {
        Self {
            dates: DateExtractor::new(),
            items: ItemExtractor::new(),
            total_pattern: STATED_TOTAL.clone(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            check_stated_total: true,
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self::new()
            .with_currency_symbol(config.currency_symbol.trim())?
            .with_category_policy(config.category_policy)
            .with_stated_total_check(config.check_stated_total))
    }

    /// Set the currency symbol that prefixes amounts.
    pub fn with_currency_symbol(mut self, symbol: &str) -> Result<Self> {
        let invalid = |e: regex::Error| BillerError::Config(format!("invalid currency symbol {symbol:?}: {e}"));
        self.items = self.items.with_currency_symbol(symbol).map_err(invalid)?;
        self.total_pattern = stated_total_pattern(symbol).map_err(invalid)?;
        self.currency_symbol = symbol.to_string();
        Ok(self)
    }

    /// Set the category matching policy.
    pub fn with_category_policy(mut self, policy: CategoryPolicy) -> Self {
        self.items = self.items.with_category_policy(policy);
        self
    }

    /// Enable or disable the stated-total mismatch warning.
    pub fn with_stated_total_check(mut self, check: bool) -> Self {
        self.check_stated_total = check;
        self
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BillParser for ReceiptExtractor {
    fn parse(&self, text: &str) -> ExtractionResult {
        #[cfg(not(target_arch = "wasm32"))]
        let start = std::time::Instant::now();
        let mut warnings = Vec::new();

        info!("Parsing receipt from {} characters of text", text.len());

        // Date
        let date = self.dates.extract_with_pattern(text);
        match &date {
            Some((pattern, m)) => debug!("Bill date {} from {:?} pattern", m.value, pattern),
            None => warnings.push("Could not extract bill date".to_string()),
        }
        let (date, date_source) = match date {
            Some((_, m)) => (Some(m.value), Some(m.source)),
            None => (None, None),
        };

        // Line items
        let scan = self.items.scan(text);
        for rejected in &scan.rejected {
            debug!(
                "Rejected line {} ({}): {}",
                rejected.line_number, rejected.reason, rejected.line
            );
        }
        if scan.items.is_empty() {
            warnings.push("No line items extracted".to_string());
        } else if !scan.rejected.is_empty() {
            warnings.push(format!(
                "Skipped {} item line(s) that could not be parsed",
                scan.rejected.len()
            ));
        }

        let bill = ParsedBill::from_parts(scan.items, scan.total, date);

        // Stated total, for comparison only
        let stated_total = extract_stated_total(&self.total_pattern, text).map(|m| m.value);
        if let Some(stated) = stated_total {
            if self.check_stated_total && !bill.is_empty() && stated != bill.total_amount() {
                warn!(
                    "Stated total {} differs from item sum {}",
                    stated,
                    bill.total_amount()
                );
                warnings.push(format!(
                    "Stated total {} differs from item sum {}",
                    stated,
                    bill.total_amount()
                ));
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        let processing_time_ms = start.elapsed().as_millis() as u64;
        #[cfg(target_arch = "wasm32")]
        let processing_time_ms = 0;

        debug!(
            "Extracted {} items totalling {}",
            bill.items().len(),
            bill.total_amount()
        );

        ExtractionResult {
            bill,
            raw_text: text.to_string(),
            date_source,
            stated_total,
            rejected: scan.rejected,
            warnings,
            processing_time_ms,
        }
    }
}
