//! Batch processing command for multiple receipt text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use biller_core::models::bill::ParsedBill;
use biller_core::receipt::{BillParser, ReceiptExtractor};

use super::load_config;
use super::parse::{format_bill, ExtractionArgs, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for receipt text files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    extraction: ExtractionArgs,

    /// Also write summary.csv to the output directory
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    bill: Option<ParsedBill>,
    rejected: usize,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let extractor = Arc::new(args.extraction.extractor(&config)?);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let extractor = Arc::clone(&extractor);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (index, process_single_file(path, &extractor).await)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        pb.inc(1);

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                tasks.abort_all();
                pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), error_msg);
            }
        }

        results.push((index, result));
    }

    pb.finish_and_clear();

    results.sort_by_key(|(index, _)| *index);
    let results: Vec<ProcessResult> = results.into_iter().map(|(_, r)| r).collect();

    for result in &results {
        let Some(bill) = &result.bill else { continue };
        let output = format_bill(bill, args.format, extractor.currency_symbol(), config.output.pretty)?;

        match &args.output_dir {
            Some(output_dir) => {
                let output_path = output_dir.join(output_file_name(&result.path, args.format));
                fs::write(&output_path, &output)?;
                debug!("Wrote {}", output_path.display());
            }
            None => {
                println!("{}", output.trim_end());
            }
        }
    }

    if args.summary {
        let summary_dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let summary_path = summary_dir.join("summary.csv");
        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let empty = results
        .iter()
        .filter(|r| r.bill.as_ref().is_some_and(|b| b.is_empty()))
        .count();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:.1}s",
        style("✓").green(),
        results.len(),
        start.elapsed().as_secs_f64()
    );
    if empty > 0 {
        eprintln!(
            "{} {} files had no extractable items",
            style("⚠").yellow(),
            empty
        );
    }
    if failed > 0 {
        eprintln!("{} {} files failed", style("✗").red(), failed);
    }

    Ok(())
}

async fn process_single_file(path: PathBuf, extractor: &ReceiptExtractor) -> ProcessResult {
    let file_start = Instant::now();

    match tokio::fs::read_to_string(&path).await {
        Ok(text) => {
            let result = extractor.parse(&text);
            ProcessResult {
                path,
                rejected: result.rejected.len(),
                bill: Some(result.bill),
                error: None,
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            }
        }
        Err(e) => ProcessResult {
            path,
            bill: None,
            rejected: 0,
            error: Some(e.to_string()),
            processing_time_ms: file_start.elapsed().as_millis() as u64,
        },
    }
}

fn output_file_name(path: &Path, format: OutputFormat) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("bill");
    format!("{}.{}", stem, format.extension())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "date",
        "items",
        "rejected",
        "total_amount",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(bill) = &result.bill {
            let status = if bill.is_empty() { "empty" } else { "success" };
            wtr.write_record([
                filename,
                status,
                &bill.date().map(|d| d.to_string()).unwrap_or_default(),
                &bill.items().len().to_string(),
                &result.rejected.to_string(),
                &bill.total_amount().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(Path::new("receipts/2024-01-15.txt"), OutputFormat::Json),
            "2024-01-15.json"
        );
        assert_eq!(output_file_name(Path::new("shop"), OutputFormat::Csv), "shop.csv");
    }
}
