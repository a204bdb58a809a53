//! Bill data models: categories, line items, parsed bills and saved records.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Expense category applied to every line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Food and drink.
    Grocery,
    /// Household items and tools.
    Utensil,
    /// Anything wearable.
    Clothing,
    /// Everything else.
    Miscellaneous,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Category; 4] = [
        Category::Grocery,
        Category::Utensil,
        Category::Clothing,
        Category::Miscellaneous,
    ];

    /// Canonical lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Grocery => "grocery",
            Category::Utensil => "utensil",
            Category::Clothing => "clothing",
            Category::Miscellaneous => "miscellaneous",
        }
    }

    /// Short description used when prompting the vision model.
    pub fn description(&self) -> &'static str {
        match self {
            Category::Grocery => "for food and drink items",
            Category::Utensil => "for household items and tools",
            Category::Clothing => "for all wearable items",
            Category::Miscellaneous => "for everything else",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ExtractionError;

    /// Exact match after trimming and lower-casing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ExtractionError::UnknownCategory(s.trim().to_string()))
    }
}

/// A single purchased item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LineItemWire")]
pub struct LineItem {
    /// Item description, trimmed and non-empty.
    #[serde(rename = "item")]
    pub description: String,

    /// Price, always positive.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// Expense category.
    pub category: Category,
}

impl LineItem {
    /// Create a line item, enforcing a non-empty description and a positive amount.
    pub fn new(
        description: impl AsRef<str>,
        amount: Decimal,
        category: Category,
    ) -> Result<Self, ExtractionError> {
        let description = description.as_ref().trim();
        if description.is_empty() {
            return Err(ExtractionError::EmptyDescription);
        }
        if amount <= Decimal::ZERO {
            return Err(ExtractionError::NonPositiveAmount(amount));
        }

        Ok(Self {
            description: description.to_string(),
            amount,
            category,
        })
    }
}

/// Serialized shape of a line item, validated through [`LineItem::new`] when read back.
#[derive(Deserialize)]
struct LineItemWire {
    item: String,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    category: Category,
}

impl TryFrom<LineItemWire> for LineItem {
    type Error = ExtractionError;

    fn try_from(wire: LineItemWire) -> Result<Self, Self::Error> {
        LineItem::new(wire.item, wire.amount, wire.category)
    }
}

/// A structured bill extracted from one receipt.
///
/// `total_amount` is always the sum of the item amounts. It is computed on
/// construction and again on deserialization, so it can never drift from
/// the itemization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BillWire")]
pub struct ParsedBill {
    items: Vec<LineItem>,

    #[serde(with = "rust_decimal::serde::float")]
    total_amount: Decimal,

    date: Option<NaiveDate>,
}

/// Serialized shape accepted when reading a bill back; any stated total is ignored.
#[derive(Deserialize)]
struct BillWire {
    #[serde(default)]
    items: Vec<LineItem>,
    #[serde(default)]
    date: Option<NaiveDate>,
}

impl TryFrom<BillWire> for ParsedBill {
    type Error = ExtractionError;

    fn try_from(wire: BillWire) -> Result<Self, Self::Error> {
        ParsedBill::from_items(wire.items, wire.date)
    }
}

impl ParsedBill {
    /// Build a bill from accepted items, deriving the total.
    ///
    /// Fails with [`ExtractionError::AmountOverflow`] when the amounts add up
    /// to more than a [`Decimal`] can hold.
    pub fn from_items(
        items: Vec<LineItem>,
        date: Option<NaiveDate>,
    ) -> Result<Self, ExtractionError> {
        let total_amount = items
            .iter()
            .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.amount))
            .ok_or(ExtractionError::AmountOverflow)?;
        Ok(Self::from_parts(items, total_amount, date))
    }

    /// Assemble a bill whose total was already summed while scanning.
    pub(crate) fn from_parts(
        items: Vec<LineItem>,
        total_amount: Decimal,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            items,
            total_amount,
            date,
        }
    }

    /// A bill with no items, zero total and no date.
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), Decimal::ZERO, None)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// True when extraction produced no items and the caller should fall back to manual entry.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The bill date, or `today` when the receipt had none.
    pub fn date_or(&self, today: NaiveDate) -> NaiveDate {
        self.date.unwrap_or(today)
    }

    /// Fill in `today` when the receipt had no date. A found date is kept.
    pub fn with_date_fallback(mut self, today: NaiveDate) -> Self {
        self.date.get_or_insert(today);
        self
    }

    /// Split the bill into one saved record per item.
    pub fn to_records(&self, fallback_date: NaiveDate) -> Vec<BillRecord> {
        let date = self.date_or(fallback_date);
        self.items
            .iter()
            .map(|item| BillRecord::from_item(item, date))
            .collect()
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }
}

impl Default for ParsedBill {
    fn default() -> Self {
        Self::empty()
    }
}

/// One saved expense, as stored per line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRecord {
    /// Purchase date.
    pub date: NaiveDate,

    /// Expense category.
    pub category: Category,

    /// Amount spent.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// What was bought.
    #[serde(default)]
    pub description: String,
}

impl BillRecord {
    pub fn from_item(item: &LineItem, date: NaiveDate) -> Self {
        Self {
            date,
            category: item.category,
            amount: item.amount,
            description: item.description.clone(),
        }
    }

    /// Month key in `YYYY-MM` form.
    pub fn month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}
