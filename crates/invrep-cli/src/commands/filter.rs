//! Filter command - search the items of a report.

use std::path::PathBuf;

use clap::Args;
use console::style;

use invrep_core::export::to_csv_with_schema;
use invrep_core::filter::ALL_PLATFORMS;
use invrep_core::normalize::format_amount;
use invrep_core::{InvoiceItem, ItemFilter, PlatformFilter};

use super::{read_report, write_output};

/// Arguments for the filter command.
#[derive(Args)]
pub struct FilterArgs {
    /// Report JSON file
    #[arg(required = true)]
    report: PathBuf,

    /// Platform to show ("all" for every platform)
    #[arg(short, long, default_value = ALL_PLATFORMS)]
    platform: String,

    /// Search text
    #[arg(short, long, default_value = "")]
    query: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of items
    Json,
    /// CSV with one row per item
    Csv,
    /// Plain text table
    Text,
}

pub async fn run(args: FilterArgs) -> anyhow::Result<()> {
    let report = read_report(&args.report)?;

    let platform = PlatformFilter::parse(&args.platform);
    if let PlatformFilter::Only(name) = &platform {
        if !report.platforms().iter().any(|p| p.as_str() == name) {
            eprintln!(
                "{} Platform {} does not appear in this report",
                style("ℹ").blue(),
                name
            );
        }
    }

    let filter = ItemFilter::new(platform, args.query.as_str());
    let items = filter.apply(report.items());

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&items)?,
        OutputFormat::Csv => to_csv_with_schema(&InvoiceItem::FIELDS, &items)?,
        OutputFormat::Text => format_items_text(&items),
    };

    write_output(args.output.as_deref(), &output)?;

    eprintln!(
        "{} {} of {} items match",
        style("ℹ").blue(),
        items.len(),
        report.summary().overall.total_items
    );

    Ok(())
}

fn format_items_text(items: &[&InvoiceItem]) -> String {
    if items.is_empty() {
        return "No invoices found matching your criteria".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<10} {:<24} {:<16} {:<32} {:<10} {:<16} {:>14}\n",
        "Platform", "File", "Invoice #", "Description", "Agency", "Campaign ID", "Amount"
    ));

    for item in items {
        output.push_str(&format!(
            "{:<10} {:<24} {:<16} {:<32} {:<10} {:<16} {:>14}\n",
            item.platform.as_str(),
            truncate(&item.source_filename, 24),
            truncate(&item.invoice_number, 16),
            truncate(&item.description, 32),
            item.agency
                .as_deref()
                .map(|a| truncate(a, 10))
                .unwrap_or_else(|| "-".to_string()),
            item.campaign_id.as_deref().map(|c| truncate(c, 16)).unwrap_or_else(|| "-".to_string()),
            item.amount.map(format_amount).unwrap_or_default(),
        ));
    }

    let total = items.iter().map(|i| i.amount_or_zero()).sum();
    output.push_str(&format!("\nTotal: {}", format_amount(total)));

    output
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}
