//! WASM bindings for Biller receipt extraction.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! The vision model call happens on the JavaScript side; these bindings turn
//! its text into bills and summarize saved records.

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use biller_core::ledger::{category_summary, monthly_summary, BillFilter, DateRange};
use biller_core::models::bill::{BillRecord, Category, ParsedBill};
use biller_core::models::config::{CategoryPolicy, ExtractionConfig};
use biller_core::receipt::prompt::{build_prompt, RECEIPT_PROMPT};
use biller_core::receipt::rules::extract_date;
use biller_core::receipt::{BillParser, ReceiptExtractor, RejectedLine};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_error(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Extract a bill from vision model text.
///
/// Never fails on bad text; an empty `items` list means nothing could be read.
#[wasm_bindgen]
pub fn extract_bill_from_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&ReceiptExtractor::new().extract(text))
}

/// Parse an amount such as "17.50", "1.234,56" or "1,234.56".
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<f64> {
    biller_core::receipt::rules::parse_amount(amount).and_then(|d| d.to_f64())
}

/// Find the bill date in text, as `YYYY-MM-DD`.
#[wasm_bindgen]
pub fn parse_date(text: &str) -> Option<String> {
    extract_date(text).map(|m| m.value.to_string())
}

/// The vision model prompt for euro receipts.
#[wasm_bindgen]
pub fn receipt_prompt() -> String {
    RECEIPT_PROMPT.clone()
}

/// The vision model prompt for another currency symbol.
#[wasm_bindgen]
pub fn receipt_prompt_for(symbol: &str) -> String {
    build_prompt(symbol)
}

/// Canonical category names.
#[wasm_bindgen]
pub fn categories() -> Vec<String> {
    Category::ALL.iter().map(|c| c.to_string()).collect()
}

/// Bill extractor class for browser use.
#[wasm_bindgen]
pub struct BillExtractor {
    extractor: ReceiptExtractor,
}

#[wasm_bindgen]
impl BillExtractor {
    /// Create a bill extractor for euro receipts with exact categories.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            extractor: ReceiptExtractor::new(),
        }
    }

    /// Set the currency symbol that prefixes amounts.
    #[wasm_bindgen]
    pub fn set_currency_symbol(&mut self, symbol: &str) -> Result<(), JsValue> {
        let config = ExtractionConfig {
            currency_symbol: symbol.to_string(),
            ..ExtractionConfig::default()
        };
        config.validate().map_err(js_error)?;

        self.extractor = self
            .extractor
            .clone()
            .with_currency_symbol(symbol.trim())
            .map_err(js_error)?;
        Ok(())
    }

    /// Accept category names that contain, or are contained in, a known category.
    #[wasm_bindgen]
    pub fn set_fuzzy_categories(&mut self, fuzzy: bool) {
        let policy = if fuzzy { CategoryPolicy::Fuzzy } else { CategoryPolicy::Exact };
        self.extractor = self.extractor.clone().with_category_policy(policy);
    }

    /// Extract a bill from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.extractor.extract(text))
    }

    /// Extract a bill along with rejected lines and warnings.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.extractor.parse(text);

        #[derive(Serialize)]
        struct ExtractResult {
            bill: ParsedBill,
            date_source: Option<String>,
            rejected: Vec<RejectedLine>,
            warnings: Vec<String>,
            processing_time_ms: u64,
        }

        to_js(&ExtractResult {
            bill: result.bill,
            date_source: result.date_source,
            rejected: result.rejected,
            warnings: result.warnings,
            processing_time_ms: result.processing_time_ms,
        })
    }
}

impl Default for BillExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Today's date from the JavaScript clock.
fn js_today() -> Result<chrono::NaiveDate, JsValue> {
    let now = js_sys::Date::new_0();
    chrono::NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| js_error("invalid system date"))
}

/// Monthly and per-category totals for saved records.
///
/// `records` is an array of `{date, category, amount, description}` objects.
#[wasm_bindgen]
pub fn summarize_records(records: JsValue) -> Result<JsValue, JsValue> {
    let records: Vec<BillRecord> = serde_wasm_bindgen::from_value(records).map_err(js_error)?;

    #[derive(Serialize)]
    struct Summary {
        monthly: Vec<biller_core::ledger::MonthlyTotal>,
        categories: Vec<biller_core::ledger::CategoryTotal>,
    }

    to_js(&Summary {
        monthly: monthly_summary(&records).map_err(js_error)?,
        categories: category_summary(&records).map_err(js_error)?,
    })
}

/// Filter saved records, newest first.
///
/// `range` is one of `all-time`, `this-month`, `last-three-months` or `this-year`.
#[wasm_bindgen]
pub fn filter_records(
    records: JsValue,
    category: Option<String>,
    range: Option<String>,
    search: Option<String>,
) -> Result<JsValue, JsValue> {
    let records: Vec<BillRecord> = serde_wasm_bindgen::from_value(records).map_err(js_error)?;

    let mut filter = BillFilter::new();
    if let Some(category) = category {
        filter = filter.with_category(category.parse::<Category>().map_err(js_error)?);
    }
    if let Some(range) = range {
        filter = filter.with_range(range.parse::<DateRange>().map_err(js_error)?);
    }
    if let Some(search) = search {
        filter = filter.with_search(search);
    }

    to_js(&filter.apply(&records, js_today()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_parse_amount() {
        let amount = parse_amount("1.234,56");
        assert!(amount.is_some());
        assert!((amount.unwrap() - 1234.56).abs() < 0.001);
        assert_eq!(parse_amount("abc"), None);
    }

    #[wasm_bindgen_test]
    fn test_parse_date() {
        assert_eq!(parse_date("Date: 2024-01-15"), Some("2024-01-15".to_string()));
        assert_eq!(parse_date("15/01/2024"), Some("2024-01-15".to_string()));
        assert_eq!(parse_date("nothing"), None);
    }

    #[wasm_bindgen_test]
    fn test_categories() {
        assert_eq!(categories(), vec!["grocery", "utensil", "clothing", "miscellaneous"]);
    }

    #[wasm_bindgen_test]
    fn test_prompt() {
        assert!(receipt_prompt().contains("€XX.XX"));
        assert!(receipt_prompt_for("$").contains("$XX.XX"));
    }

    #[wasm_bindgen_test]
    fn test_extractor_settings() {
        let mut extractor = BillExtractor::new();
        assert!(extractor.set_currency_symbol(" £ ").is_ok());
        assert_eq!(extractor.extractor.currency_symbol(), "£");
        extractor.set_fuzzy_categories(true);

        let bill = extractor.extractor.extract("- Tea: £2.00 (Category: groceries)");
        assert!(bill.is_empty());
        let bill = extractor.extractor.extract("- Tea: £2.00 (Category: grocery items)");
        assert_eq!(bill.items().len(), 1);
    }
}
