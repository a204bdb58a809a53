//! Amount parsing for receipt text.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;

use super::ExtractionMatch;

/// Parse a price as written on a receipt.
///
/// Accepts `2.50`, `2,50`, `1.234,56`, `1,234.56`, `1 234,56` and plain
/// integers. When both `.` and `,` appear, the last one is the decimal
/// separator. A lone comma followed by exactly three digits groups
/// thousands; any other lone comma is a decimal comma. Several dots with no
/// comma are all thousands separators.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.trim_end_matches(['.', ',']);

    if !cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let commas = cleaned.matches(',').count();
    let dots = cleaned.matches('.').count();

    let decimal_pos = match (last_comma, last_dot) {
        (Some(c), Some(d)) => Some(c.max(d)),
        (Some(c), None) => {
            let fraction_len = cleaned.len() - c - 1;
            if commas == 1 && fraction_len != 3 {
                Some(c)
            } else {
                None
            }
        }
        (None, Some(d)) if dots == 1 => Some(d),
        _ => None,
    };

    let (integer, fraction) = match decimal_pos {
        Some(pos) => (&cleaned[..pos], &cleaned[pos + 1..]),
        None => (cleaned, ""),
    };

    if !fraction.chars().all(|c| c.is_ascii_digit()) || !valid_grouping(integer) {
        return None;
    }
    let integer: String = integer.chars().filter(|c| c.is_ascii_digit()).collect();

    let normalized = if fraction.is_empty() {
        integer
    } else {
        format!("{integer}.{fraction}")
    };

    Decimal::from_str(&normalized).ok()
}

/// Thousands groups after the first must be exactly three digits.
fn valid_grouping(integer: &str) -> bool {
    let mut groups = integer.split(['.', ',']);
    let first_ok = groups
        .next()
        .is_some_and(|g| !g.is_empty() && (integer.len() == g.len() || g.len() <= 3));
    first_ok && groups.all(|g| g.len() == 3)
}

/// Format an amount for display, e.g. `€17.50`.
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    format!("{symbol}{:.2}", amount)
}

/// Extract the total the model states on its own (`Total: €17.50`).
///
/// This value is diagnostic only; bill totals are always re-summed from items.
pub fn extract_stated_total(pattern: &Regex, text: &str) -> Option<ExtractionMatch<Decimal>> {
    pattern.captures_iter(text).find_map(|caps| {
        let full_match = caps.get(0)?;
        let amount = parse_amount(&caps["amount"])?;
        Some(
            ExtractionMatch::new(amount, full_match.as_str().trim_end())
                .with_position(full_match.start(), full_match.end()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::rules::patterns::STATED_TOTAL;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount_dot_and_comma_decimals() {
        assert_eq!(parse_amount("2.50"), Some(dec("2.50")));
        assert_eq!(parse_amount("2,50"), Some(dec("2.50")));
        assert_eq!(parse_amount("15"), Some(dec("15")));
        assert_eq!(parse_amount("15."), Some(dec("15")));
        assert_eq!(parse_amount(" 3.20 "), Some(dec("3.20")));
    }

    #[test]
    fn test_parse_amount_thousands() {
        assert_eq!(parse_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1 234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1\u{00a0}234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1,234"), Some(dec("1234")));
        assert_eq!(parse_amount("1.234.567"), Some(dec("1234567")));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("-5.00"), None);
        assert_eq!(parse_amount(".50"), None);
        assert_eq!(parse_amount("1,2,3,4"), None);
        assert_eq!(parse_amount("12.34,56"), None);
    }

    #[test]
    fn test_parse_amount_keeps_zero() {
        // Positivity is the item rule's concern, not the parser's.
        assert_eq!(parse_amount("0.00"), Some(Decimal::ZERO));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("17.5"), "€"), "€17.50");
        assert_eq!(format_amount(dec("3"), "$"), "$3.00");
    }

    #[test]
    fn test_extract_stated_total() {
        let text = "- Milk: €2.50 (Category: grocery)\nTotal Amount: €2,50\n";
        let total = extract_stated_total(&STATED_TOTAL, text).unwrap();
        assert_eq!(total.value, dec("2.50"));
        assert_eq!(total.source, "Total Amount: €2,50");

        assert!(extract_stated_total(&STATED_TOTAL, "no totals here").is_none());
    }
}
