//! Line item extraction for receipt text.

use std::fmt;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::models::bill::LineItem;
use crate::models::config::CategoryPolicy;

use super::amounts::parse_amount;
use super::categories::resolve_category;
use super::patterns::{item_line_pattern, ITEM_LINE};
use super::FieldExtractor;

/// Why a hyphen-led line did not become a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RejectReason {
    /// The line does not have the `- item: €amount (Category: x)` shape.
    Malformed,
    /// Description is empty after trimming.
    EmptyDescription,
    /// Amount text is not a number.
    InvalidAmount(String),
    /// Amount is zero or negative.
    NonPositiveAmount(Decimal),
    /// Category is not one of the canonical categories.
    UnknownCategory(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Malformed => f.write_str("line does not match the item format"),
            RejectReason::EmptyDescription => f.write_str("item description is empty"),
            RejectReason::InvalidAmount(s) => write!(f, "invalid amount: {s}"),
            RejectReason::NonPositiveAmount(d) => write!(f, "amount must be greater than zero, got {d}"),
            RejectReason::UnknownCategory(c) => write!(f, "unknown category: {c}"),
        }
    }
}

impl From<ExtractionError> for RejectReason {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::EmptyDescription => RejectReason::EmptyDescription,
            ExtractionError::NonPositiveAmount(d) => RejectReason::NonPositiveAmount(d),
            ExtractionError::InvalidAmount(s) => RejectReason::InvalidAmount(s),
            ExtractionError::UnknownCategory(c) => RejectReason::UnknownCategory(c),
            overflow @ ExtractionError::AmountOverflow => {
                RejectReason::InvalidAmount(overflow.to_string())
            }
        }
    }
}

/// A hyphen-led line that was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLine {
    /// 1-based line number in the raw text.
    pub line_number: usize,
    /// The line as it appeared, trimmed.
    pub line: String,
    /// Why it was dropped.
    pub reason: RejectReason,
}

/// Result of looking at one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Accepted(LineItem),
    Rejected(RejectReason),
}

/// Items and rejections found in one text, both in line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemScan {
    pub items: Vec<LineItem>,
    pub rejected: Vec<RejectedLine>,
    /// Sum of the accepted item amounts.
    pub total: Decimal,
}

/// Line item extractor.
#[derive(Debug, Clone)]
pub struct ItemExtractor {
    pattern: Regex,
    policy: CategoryPolicy,
}

impl ItemExtractor {
    /// Extractor for `€` amounts with exact category matching.
    pub fn new() -> Self {
        Self {
            pattern: ITEM_LINE.clone(),
            policy: CategoryPolicy::Exact,
        }
    }

    /// Use a different currency symbol.
    pub fn with_currency_symbol(mut self, symbol: &str) -> Result<Self, regex::Error> {
        self.pattern = item_line_pattern(symbol)?;
        Ok(self)
    }

    /// Set the category matching policy.
    pub fn with_category_policy(mut self, policy: CategoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Classify a single line. Returns `None` for lines that are not item
    /// candidates (anything not starting with `-`).
    pub fn parse_line(&self, line: &str) -> Option<ItemOutcome> {
        let line = line.trim();
        if !line.starts_with('-') {
            return None;
        }

        let Some(caps) = self.pattern.captures(line) else {
            return Some(ItemOutcome::Rejected(RejectReason::Malformed));
        };

        let description = caps["description"].trim();
        if description.is_empty() {
            return Some(ItemOutcome::Rejected(RejectReason::EmptyDescription));
        }

        let amount_text = caps["amount"].trim();
        let Some(amount) = parse_amount(amount_text) else {
            return Some(ItemOutcome::Rejected(RejectReason::InvalidAmount(
                amount_text.to_string(),
            )));
        };

        let category_text = caps["category"].trim();
        let Some(category) = resolve_category(category_text, self.policy) else {
            return Some(ItemOutcome::Rejected(RejectReason::UnknownCategory(
                category_text.to_lowercase(),
            )));
        };

        Some(match LineItem::new(description, amount, category) {
            Ok(item) => ItemOutcome::Accepted(item),
            Err(err) => ItemOutcome::Rejected(err.into()),
        })
    }

    /// Walk every line, keeping accepted items and recording rejections.
    ///
    /// An item whose amount would push the running total past the largest
    /// representable decimal is rejected as an invalid amount.
    pub fn scan(&self, text: &str) -> ItemScan {
        let mut scan = ItemScan::default();

        for (index, line) in text.lines().enumerate() {
            let reason = match self.parse_line(line) {
                Some(ItemOutcome::Accepted(item)) => match scan.total.checked_add(item.amount) {
                    Some(total) => {
                        scan.total = total;
                        scan.items.push(item);
                        continue;
                    }
                    None => RejectReason::InvalidAmount(item.amount.to_string()),
                },
                Some(ItemOutcome::Rejected(reason)) => reason,
                None => continue,
            };

            scan.rejected.push(RejectedLine {
                line_number: index + 1,
                line: line.trim().to_string(),
                reason,
            });
        }

        scan
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ItemExtractor {
    type Output = LineItem;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        text.lines().find_map(|line| match self.parse_line(line) {
            Some(ItemOutcome::Accepted(item)) => Some(item),
            _ => None,
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.scan(text).items
    }
}
