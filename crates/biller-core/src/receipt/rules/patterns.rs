//! Common regex patterns for receipt text extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Amount token: a digit followed by digits, separators or grouping spaces.
const AMOUNT_TOKEN: &str = r"\d[\d.,\x{00a0} ]*";

/// Currency symbol the vision model is asked to use.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "€";

lazy_static! {
    // Dates, highest priority first. ISO dates may run straight into a
    // `T` time part, which the match then ends on.
    pub static ref DATE_LABELED: Regex = Regex::new(
        r"(?i)\bdate\s*:\s*(\d{4})-(\d{1,2})-(\d{1,2})(?:\b|T)"
    ).unwrap();

    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:\b|T)"
    ).unwrap();

    pub static ref DATE_DMY_SLASH: Regex = Regex::new(
        r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b"
    ).unwrap();

    pub static ref DATE_DMY_DASH: Regex = Regex::new(
        r"\b(\d{1,2})-(\d{1,2})-(\d{4})\b"
    ).unwrap();

    // Item and total lines for the default currency
    pub static ref ITEM_LINE: Regex = item_line_pattern(DEFAULT_CURRENCY_SYMBOL).unwrap();

    pub static ref STATED_TOTAL: Regex = stated_total_pattern(DEFAULT_CURRENCY_SYMBOL).unwrap();
}

/// Build the item line pattern for a currency symbol.
///
/// Shape: `- <description>: <symbol><amount> (Category: <category>)`.
/// Trailing text after the closing parenthesis is allowed.
pub fn item_line_pattern(symbol: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"^-\s*(?P<description>.*?)\s*:\s*{symbol}\s*(?P<amount>{AMOUNT_TOKEN})\s*\(\s*(?i:category)\s*:\s*(?P<category>[^)]*)\)",
        symbol = regex::escape(symbol),
    ))
}

/// Build the pattern for the model's own total line (`Total: €X`, `Total Amount: €X`).
pub fn stated_total_pattern(symbol: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)\btotal(?:\s+amount)?\s*:\s*{symbol}\s*(?P<amount>{AMOUNT_TOKEN})",
        symbol = regex::escape(symbol),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_line_captures() {
        let caps = ITEM_LINE
            .captures("- Milk: €2.50 (Category: grocery)")
            .unwrap();
        assert_eq!(&caps["description"], "Milk");
        assert_eq!(caps["amount"].trim(), "2.50");
        assert_eq!(&caps["category"], "grocery");
    }

    #[test]
    fn test_item_line_description_may_contain_colon() {
        let caps = ITEM_LINE
            .captures("- Water: 6x1.5L: €3.99 (Category: grocery)")
            .unwrap();
        assert_eq!(&caps["description"], "Water: 6x1.5L");
    }

    #[test]
    fn test_item_line_custom_symbol_is_escaped() {
        let pattern = item_line_pattern("$").unwrap();
        assert!(pattern.is_match("- Nails: $4.00 (Category: utensil)"));
        assert!(!pattern.is_match("- Nails: €4.00 (Category: utensil)"));
    }

    #[test]
    fn test_date_patterns_use_word_boundaries() {
        assert!(DATE_ISO.is_match("2024-01-15"));
        assert!(!DATE_ISO.is_match("12024-01-150"));
        assert!(!DATE_ISO.is_match("2024-01-150"));
        assert!(DATE_ISO.is_match("2024-01-15T10:30"));
        assert!(DATE_LABELED.is_match("date: 2024-01-15t10:30"));
        assert!(!DATE_DMY_DASH.is_match("2024-01-15"));
    }
}
