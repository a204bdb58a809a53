//! Parse command - extract a bill from the model text for one receipt.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use biller_core::models::bill::ParsedBill;
use biller_core::models::config::{BillerConfig, CategoryPolicy};
use biller_core::receipt::rules::format_amount;
use biller_core::receipt::{BillParser, ReceiptExtractor};

use super::load_config;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file with the model output ("-" reads stdin)
    #[arg(default_value = "-")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    extraction: ExtractionArgs,

    /// Use today's date when the receipt has none
    #[arg(long)]
    date_fallback: bool,

    /// Fail when no line items could be extracted
    #[arg(long)]
    strict: bool,

    /// List dropped item lines on stderr
    #[arg(long)]
    show_rejected: bool,

    /// Include rejected lines, warnings and the raw date text in JSON output
    #[arg(long)]
    with_metadata: bool,
}

/// Extraction overrides shared by parse and batch.
#[derive(Args, Clone)]
pub struct ExtractionArgs {
    /// Currency symbol that prefixes amounts (overrides config)
    #[arg(long)]
    currency: Option<String>,

    /// Accept category names that contain, or are contained in, a known category
    #[arg(long)]
    fuzzy_categories: bool,
}

impl ExtractionArgs {
    /// Build an extractor from config with command line overrides applied.
    pub fn extractor(&self, config: &BillerConfig) -> anyhow::Result<ReceiptExtractor> {
        let mut extraction = config.extraction.clone();
        if let Some(symbol) = &self.currency {
            extraction.currency_symbol = symbol.clone();
        }
        if self.fuzzy_categories {
            extraction.category_policy = CategoryPolicy::Fuzzy;
        }
        Ok(ReceiptExtractor::from_config(&extraction)?)
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let extractor = args.extraction.extractor(&config)?;

    let text = read_input(&args.input).await?;
    info!("Parsing {} ({} bytes)", input_name(&args.input), text.len());

    let mut result = extractor.parse(&text);

    if args.show_rejected {
        for rejected in &result.rejected {
            eprintln!(
                "{} line {}: {} ({})",
                style("✗").red(),
                rejected.line_number,
                rejected.line.trim(),
                rejected.reason
            );
        }
    }
    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    if args.strict && result.bill.is_empty() {
        anyhow::bail!("No line items could be extracted from {}", input_name(&args.input));
    }

    if args.date_fallback {
        result.bill = result.bill.with_date_fallback(chrono::Local::now().date_naive());
    }

    let output = if args.with_metadata && matches!(args.format, OutputFormat::Json) {
        to_json(&result, config.output.pretty)?
    } else {
        format_bill(&result.bill, args.format, extractor.currency_symbol(), config.output.pretty)?
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

async fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(tokio::fs::read_to_string(&path).await?)
}

fn input_name(input: &str) -> &str {
    if input == "-" { "stdin" } else { input }
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

/// Render a bill in the requested format.
pub fn format_bill(
    bill: &ParsedBill,
    format: OutputFormat,
    symbol: &str,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => to_json(bill, pretty),
        OutputFormat::Csv => format_csv(bill),
        OutputFormat::Text => Ok(format_text(bill, symbol)),
    }
}

fn format_csv(bill: &ParsedBill) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["date", "item", "amount", "category"])?;

    let date = bill.date().map(|d| d.to_string()).unwrap_or_default();
    for item in bill.items() {
        wtr.write_record([
            date.as_str(),
            item.description.as_str(),
            &item.amount.to_string(),
            item.category.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(bill: &ParsedBill, symbol: &str) -> String {
    let mut output = String::new();

    match bill.date() {
        Some(date) => output.push_str(&format!("Date: {}\n", date)),
        None => output.push_str("Date: unknown\n"),
    }
    output.push('\n');

    if bill.is_empty() {
        output.push_str("No items extracted. Enter the bill manually.\n");
    } else {
        let width = bill
            .items()
            .iter()
            .map(|i| i.description.chars().count())
            .max()
            .unwrap_or(0);

        output.push_str("Items:\n");
        for item in bill.items() {
            output.push_str(&format!(
                "  {:<width$}  {:>10}  {}\n",
                item.description,
                format_amount(item.amount, symbol),
                item.category,
            ));
        }
    }
    output.push('\n');

    output.push_str(&format!("Total: {}\n", format_amount(bill.total_amount(), symbol)));

    output
}
