//! Summaries and filters over saved bill records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, Result};
use crate::models::bill::{BillRecord, Category};

/// Spending in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub month: String,

    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Spending in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,

    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

fn add(total: &mut Decimal, amount: Decimal) -> Result<()> {
    *total = total
        .checked_add(amount)
        .ok_or(ExtractionError::AmountOverflow)?;
    Ok(())
}

/// Sum of all record amounts.
pub fn total_spent(records: &[BillRecord]) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    for record in records {
        add(&mut total, record.amount)?;
    }
    Ok(total)
}

/// Totals per month, oldest month first.
pub fn monthly_summary(records: &[BillRecord]) -> Result<Vec<MonthlyTotal>> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for record in records {
        add(totals.entry(record.month()).or_default(), record.amount)?;
    }

    Ok(totals
        .into_iter()
        .map(|(month, total)| MonthlyTotal { month, total })
        .collect())
}

/// Totals per category in canonical order. Categories without records are left out.
pub fn category_summary(records: &[BillRecord]) -> Result<Vec<CategoryTotal>> {
    let mut totals: BTreeMap<Category, Decimal> = BTreeMap::new();
    for record in records {
        add(totals.entry(record.category).or_default(), record.amount)?;
    }

    Ok(Category::ALL
        .into_iter()
        .filter_map(|category| {
            totals
                .get(&category)
                .map(|total| CategoryTotal { category, total: *total })
        })
        .collect())
}

/// Date window relative to today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRange {
    #[default]
    AllTime,
    /// From the first of the current month.
    ThisMonth,
    /// The last 90 days.
    LastThreeMonths,
    /// From January 1st of the current year.
    ThisYear,
}

impl DateRange {
    /// First date inside the window, or `None` when unbounded.
    pub fn start(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateRange::AllTime => None,
            DateRange::ThisMonth => NaiveDate::from_ymd_opt(today.year(), today.month(), 1),
            DateRange::LastThreeMonths => today.checked_sub_days(Days::new(90)),
            DateRange::ThisYear => NaiveDate::from_ymd_opt(today.year(), 1, 1),
        }
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        self.start(today).is_none_or(|start| date >= start)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::AllTime => "all-time",
            DateRange::ThisMonth => "this-month",
            DateRange::LastThreeMonths => "last-three-months",
            DateRange::ThisYear => "this-year",
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "all" | "all-time" => Ok(DateRange::AllTime),
            "this-month" | "month" => Ok(DateRange::ThisMonth),
            "last-three-months" | "last-3-months" | "90d" => Ok(DateRange::LastThreeMonths),
            "this-year" | "year" => Ok(DateRange::ThisYear),
            other => Err(format!(
                "unknown date range '{other}' (expected all-time, this-month, last-three-months or this-year)"
            )),
        }
    }
}

/// Record filter used by the expense views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillFilter {
    pub category: Option<Category>,
    pub range: DateRange,
    /// Case-insensitive substring of the description.
    pub search: Option<String>,
}

impl BillFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() { None } else { Some(search) };
        self
    }

    pub fn matches(&self, record: &BillRecord, today: NaiveDate) -> bool {
        if self.category.is_some_and(|category| category != record.category) {
            return false;
        }
        if !self.range.contains(record.date, today) {
            return false;
        }
        match &self.search {
            Some(needle) => record
                .description
                .to_lowercase()
                .contains(&needle.trim().to_lowercase()),
            None => true,
        }
    }

    /// Matching records, newest first. Records on the same date keep their input order.
    pub fn apply(&self, records: &[BillRecord], today: NaiveDate) -> Vec<BillRecord> {
        let mut matched: Vec<BillRecord> = records
            .iter()
            .filter(|record| self.matches(record, today))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.date.cmp(&a.date));
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BillerError;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(d: NaiveDate, category: Category, amount: Decimal, description: &str) -> BillRecord {
        BillRecord {
            date: d,
            category,
            amount,
            description: description.to_string(),
        }
    }

    fn sample() -> Vec<BillRecord> {
        vec![
            record(date(2024, 1, 15), Category::Grocery, dec("2.50"), "Milk"),
            record(date(2024, 3, 2), Category::Clothing, dec("15.00"), "T-Shirt"),
            record(date(2024, 1, 20), Category::Grocery, dec("3.25"), "Oat milk"),
            record(date(2023, 12, 31), Category::Utensil, dec("8.00"), "Pan"),
            record(date(2024, 3, 2), Category::Grocery, dec("1.10"), "Bread"),
        ]
    }

    #[test]
    fn test_monthly_summary() {
        let summary = monthly_summary(&sample()).unwrap();
        assert_eq!(
            summary,
            vec![
                MonthlyTotal { month: "2023-12".to_string(), total: dec("8.00") },
                MonthlyTotal { month: "2024-01".to_string(), total: dec("5.75") },
                MonthlyTotal { month: "2024-03".to_string(), total: dec("16.10") },
            ]
        );
    }

    #[test]
    fn test_category_summary_omits_empty_categories() {
        let summary = category_summary(&sample()).unwrap();
        assert_eq!(
            summary,
            vec![
                CategoryTotal { category: Category::Grocery, total: dec("6.85") },
                CategoryTotal { category: Category::Utensil, total: dec("8.00") },
                CategoryTotal { category: Category::Clothing, total: dec("15.00") },
            ]
        );
        assert!(category_summary(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_totals_report_overflow() {
        assert_eq!(total_spent(&sample()).unwrap(), dec("29.85"));

        let big = dec("50000000000000000000000000000");
        let records = vec![
            record(date(2024, 1, 1), Category::Grocery, big, "A"),
            record(date(2024, 1, 2), Category::Grocery, big, "B"),
        ];
        assert!(matches!(
            total_spent(&records),
            Err(BillerError::Extraction(ExtractionError::AmountOverflow))
        ));
        assert!(monthly_summary(&records).is_err());
        assert!(category_summary(&records).is_err());
    }

    #[test]
    fn test_date_range_start() {
        let today = date(2024, 3, 15);
        assert_eq!(DateRange::AllTime.start(today), None);
        assert_eq!(DateRange::ThisMonth.start(today), Some(date(2024, 3, 1)));
        assert_eq!(DateRange::LastThreeMonths.start(today), Some(date(2023, 12, 16)));
        assert_eq!(DateRange::ThisYear.start(today), Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_date_range_from_str() {
        assert_eq!("this-month".parse::<DateRange>().unwrap(), DateRange::ThisMonth);
        assert_eq!("Last 3 Months".parse::<DateRange>().unwrap(), DateRange::LastThreeMonths);
        assert_eq!("this_year".parse::<DateRange>().unwrap(), DateRange::ThisYear);
        assert_eq!("all".parse::<DateRange>().unwrap(), DateRange::AllTime);
        assert!("fortnight".parse::<DateRange>().is_err());
    }

    #[test]
    fn test_filter_sorts_newest_first_and_is_stable() {
        let records = BillFilter::new().apply(&sample(), date(2024, 3, 15));
        let names: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(names, vec!["T-Shirt", "Bread", "Oat milk", "Milk", "Pan"]);
    }

    #[test]
    fn test_filter_by_category_and_range() {
        let filter = BillFilter::new()
            .with_category(Category::Grocery)
            .with_range(DateRange::ThisMonth);
        let records = filter.apply(&sample(), date(2024, 3, 15));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "Bread");

        let records = BillFilter::new()
            .with_range(DateRange::ThisYear)
            .apply(&sample(), date(2024, 3, 15));
        assert!(records.iter().all(|r| r.date.year() == 2024));
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let records = BillFilter::new()
            .with_search("MILK")
            .apply(&sample(), date(2024, 3, 15));
        let names: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(names, vec!["Oat milk", "Milk"]);

        let filter = BillFilter::new().with_search("   ");
        assert_eq!(filter.search, None);
    }
}
