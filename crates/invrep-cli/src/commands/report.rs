//! Report command - build a unified report from extraction files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, info, warn};

use invrep_core::error::NormalizeError;
use invrep_core::export::{file_rows, items_csv, platform_rows, to_csv, to_json, with_bom};
use invrep_core::models::config::DuplicatePolicy;
use invrep_core::{
    Aggregator, FileExtraction, FileFailure, FileRepository, InvoiceFile, InvoiceReport,
    Normalizer, ReportConfig, ReportRepository,
};

use super::{load_config, write_output};

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Extraction JSON files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output file for the report JSON (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for CSV exports
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Also write every item as CSV
    #[arg(long)]
    items_csv: bool,

    /// Also write platform and file summary CSVs
    #[arg(long)]
    summary: bool,

    /// Store the report in this directory
    #[arg(long)]
    store: Option<PathBuf>,

    /// Identifier for the stored report (default: generation timestamp)
    #[arg(long)]
    id: Option<String>,

    /// Fail when two extractions share a filename instead of keeping the last
    #[arg(long)]
    reject_duplicates: bool,
}

/// Files that normalized, and the problems met along the way.
#[derive(Default)]
struct Collected {
    files: Vec<(String, InvoiceFile)>,
    failures: Vec<FileFailure>,
    line_errors: Vec<NormalizeError>,
}

pub async fn run(args: ReportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let paths: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();

    if paths.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} extraction files",
        style("ℹ").blue(),
        paths.len()
    );

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let normalizer = Normalizer::new().with_config(config.normalize.clone());
    let mut collected = Collected::default();

    for path in &paths {
        match read_extractions(path) {
            Ok(extractions) => {
                for extraction in extractions {
                    collect(&normalizer, extraction, &mut collected);
                }
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                collected.failures.push(FileFailure {
                    filename: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    let mut policy = config.aggregate.duplicate_policy;
    if args.reject_duplicates {
        policy = DuplicatePolicy::Reject;
    }
    let report = Aggregator::new()
        .with_duplicate_policy(policy)
        .try_aggregate(collected.files)?;

    write_output(args.output.as_deref(), &to_json(&report)?)?;
    write_exports(&args, &config, &report)?;

    if let Some(dir) = &args.store {
        let repo = FileRepository::open(dir)?;
        let id = args
            .id
            .clone()
            .unwrap_or_else(|| report.generated_at().format("%Y%m%d_%H%M%S").to_string());
        repo.store(&id, &report)?;
        eprintln!(
            "{} Stored report as {} in {}",
            style("✓").green(),
            id,
            dir.display()
        );
    }

    let overall = &report.summary().overall;
    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        overall.files_processed,
        start.elapsed()
    );
    eprintln!(
        "   {} items, {} failed files, {} rejected lines",
        style(overall.total_items).green(),
        style(collected.failures.len()).red(),
        style(collected.line_errors.len()).yellow()
    );

    if !collected.failures.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for failure in &collected.failures {
            eprintln!("  - {}: {}", failure.filename, failure.message);
        }
    }

    if !collected.line_errors.is_empty() {
        eprintln!();
        eprintln!("{}", style("Rejected lines:").yellow());
        for error in &collected.line_errors {
            eprintln!("  - {}", error);
        }
    }

    Ok(())
}

/// Read one extraction file, holding either a single extraction or an array.
fn read_extractions(path: &Path) -> anyhow::Result<Vec<FileExtraction>> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;

    let extractions: Vec<FileExtraction> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };

    debug!("Read extractions from {}", path.display());
    Ok(extractions)
}

fn collect(normalizer: &Normalizer, extraction: FileExtraction, collected: &mut Collected) {
    if let Some(message) = &extraction.error {
        warn!("Extraction failed for {}: {}", extraction.filename, message);
        collected.failures.push(FileFailure {
            filename: extraction.filename.clone(),
            message: message.clone(),
        });
        return;
    }

    let normalized = normalizer.normalize_file(&extraction);
    info!(
        "{}: {} items on {}",
        normalized.filename,
        normalized.file.items_count(),
        normalized.file.platform()
    );

    collected.line_errors.extend(normalized.errors);
    collected.files.push((normalized.filename, normalized.file));
}

fn write_exports(
    args: &ReportArgs,
    config: &ReportConfig,
    report: &InvoiceReport,
) -> anyhow::Result<()> {
    if !args.items_csv && !args.summary {
        return Ok(());
    }

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.export.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let finish = |csv: String| if config.export.csv_bom { with_bom(&csv) } else { csv };

    if args.items_csv {
        write_output(
            Some(output_dir.join("invoice_report.csv").as_path()),
            &finish(items_csv(report)?),
        )?;
    }

    if args.summary {
        write_output(
            Some(output_dir.join("invoice_summary.csv").as_path()),
            &finish(to_csv(&platform_rows(report))?),
        )?;
        write_output(
            Some(output_dir.join("invoice_file_summary.csv").as_path()),
            &finish(to_csv(&file_rows(report))?),
        )?;
    }

    Ok(())
}
