//! Summary command - monthly and per-category totals for saved records.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::{Deserialize, Serialize};
use tracing::debug;

use biller_core::ledger::{
    category_summary, monthly_summary, total_spent, BillFilter, CategoryTotal, DateRange,
    MonthlyTotal,
};
use biller_core::models::bill::{BillRecord, Category, ParsedBill};
use biller_core::receipt::rules::format_amount;

use super::load_config;

/// Arguments for the summary command.
#[derive(Args)]
pub struct SummaryArgs {
    /// JSON files holding a list of records or a parsed bill
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Only include this category
    #[arg(long)]
    category: Option<Category>,

    /// Date window (all-time, this-month, last-three-months, this-year)
    #[arg(long, default_value = "all-time")]
    range: DateRange,

    /// Only include records whose description contains this text
    #[arg(short, long)]
    search: Option<String>,

    /// List the matching records, newest first
    #[arg(long)]
    list: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Currency symbol used for display (overrides config)
    #[arg(long)]
    currency: Option<String>,
}

/// Either a saved record list or a bill straight from `biller parse`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Records(Vec<BillRecord>),
    Bill(ParsedBill),
}

#[derive(Serialize)]
struct SummaryReport {
    records: usize,
    #[serde(with = "rust_decimal::serde::float")]
    total: rust_decimal::Decimal,
    monthly: Vec<MonthlyTotal>,
    categories: Vec<CategoryTotal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    matching: Vec<BillRecord>,
}

pub async fn run(args: SummaryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let today = chrono::Local::now().date_naive();

    let mut records = Vec::new();
    for path in &args.inputs {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let file: RecordFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;

        let loaded = match file {
            RecordFile::Records(records) => records,
            RecordFile::Bill(bill) => bill.to_records(today),
        };
        debug!("Loaded {} records from {}", loaded.len(), path.display());
        records.extend(loaded);
    }

    let mut filter = BillFilter::new().with_range(args.range);
    if let Some(category) = args.category {
        filter = filter.with_category(category);
    }
    if let Some(search) = &args.search {
        filter = filter.with_search(search.as_str());
    }

    let matching = filter.apply(&records, today);
    let report = SummaryReport {
        records: matching.len(),
        total: total_spent(&matching)?,
        monthly: monthly_summary(&matching)?,
        categories: category_summary(&matching)?,
        matching: if args.list { matching } else { Vec::new() },
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let symbol = args.currency.unwrap_or(config.extraction.currency_symbol);
        print!("{}", format_report(&report, symbol.trim()));
    }

    Ok(())
}

fn format_report(report: &SummaryReport, symbol: &str) -> String {
    let mut output = String::new();

    if report.records == 0 {
        output.push_str(&format!("{} No matching records\n", style("ℹ").blue()));
        return output;
    }

    output.push_str(&format!(
        "{} records, total {}\n\n",
        report.records,
        format_amount(report.total, symbol)
    ));

    output.push_str("By month:\n");
    for month in &report.monthly {
        output.push_str(&format!("  {}  {:>12}\n", month.month, format_amount(month.total, symbol)));
    }
    output.push('\n');

    output.push_str("By category:\n");
    for category in &report.categories {
        output.push_str(&format!(
            "  {:<13}  {:>12}\n",
            category.category,
            format_amount(category.total, symbol)
        ));
    }

    if !report.matching.is_empty() {
        output.push('\n');
        output.push_str("Records:\n");
        for record in &report.matching {
            output.push_str(&format!(
                "  {}  {:<13}  {:>12}  {}\n",
                record.date,
                record.category,
                format_amount(record.amount, symbol),
                record.description
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn record(day: u32, category: Category, cents: i64, description: &str) -> BillRecord {
        BillRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            category,
            amount: Decimal::new(cents, 2),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_format_report() {
        let records = vec![
            record(20, Category::Utensil, 1500, "Hammer"),
            record(15, Category::Grocery, 250, "Milk"),
        ];
        let report = SummaryReport {
            records: records.len(),
            total: total_spent(&records).unwrap(),
            monthly: monthly_summary(&records).unwrap(),
            categories: category_summary(&records).unwrap(),
            matching: records,
        };

        assert_eq!(
            format_report(&report, "$"),
            "2 records, total $17.50\n\
             \n\
             By month:\n\
             \x20 2024-01        $17.50\n\
             \n\
             By category:\n\
             \x20 grocery               $2.50\n\
             \x20 utensil              $15.00\n\
             \n\
             Records:\n\
             \x20 2024-01-20  utensil              $15.00  Hammer\n\
             \x20 2024-01-15  grocery               $2.50  Milk\n"
        );
    }

    #[test]
    fn test_format_report_without_records() {
        let report = SummaryReport {
            records: 0,
            total: Decimal::ZERO,
            monthly: Vec::new(),
            categories: Vec::new(),
            matching: Vec::new(),
        };
        assert!(format_report(&report, "€").ends_with("No matching records\n"));
    }
}
