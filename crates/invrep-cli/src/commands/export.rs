//! Export command - convert a report into CSV or JSON.

use std::path::PathBuf;

use clap::Args;

use invrep_core::export::{file_rows, items_csv, platform_rows, to_csv, to_json, with_bom};

use super::{load_config, read_report, write_output};

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Report JSON file
    #[arg(required = true)]
    report: PathBuf,

    /// Export format
    #[arg(short, long, value_enum, default_value = "items-csv")]
    format: ExportFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prefix CSV output with a UTF-8 byte order mark
    #[arg(long)]
    bom: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// The full report as pretty-printed JSON
    Json,
    /// Every item, one row each
    ItemsCsv,
    /// One row per platform
    PlatformsCsv,
    /// One row per file
    FilesCsv,
}

pub async fn run(args: ExportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let report = read_report(&args.report)?;

    let content = match args.format {
        ExportFormat::Json => to_json(&report)?,
        ExportFormat::ItemsCsv => items_csv(&report)?,
        ExportFormat::PlatformsCsv => to_csv(&platform_rows(&report))?,
        ExportFormat::FilesCsv => to_csv(&file_rows(&report))?,
    };

    let bom = args.bom || config.export.csv_bom;
    let content = if bom && args.format != ExportFormat::Json {
        with_bom(&content)
    } else {
        content
    };

    write_output(args.output.as_deref(), &content)
}
