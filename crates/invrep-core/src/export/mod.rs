//! Report export: CSV and JSON writers plus summary row views.

mod csv;
mod json;

pub use self::csv::{to_csv, to_csv_with_schema, with_bom};
pub use self::json::{from_json, to_json};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ExportError;
use crate::models::item::{InvoiceItem, Platform};
use crate::models::report::InvoiceReport;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// One row of the per-platform summary export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformRow {
    pub platform: Platform,
    pub files: usize,
    pub total_items: usize,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub total_amount: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub average_items_per_file: Decimal,
}

/// One row of the per-file summary export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRow {
    pub filename: String,
    pub platform: Platform,
    pub invoice_type: String,
    pub items_count: usize,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub total_amount: Decimal,
}

/// Platform rollups of a report, one row per platform.
pub fn platform_rows(report: &InvoiceReport) -> Vec<PlatformRow> {
    report
        .summary()
        .by_platform
        .iter()
        .map(|(platform, summary)| PlatformRow {
            platform: *platform,
            files: summary.files,
            total_items: summary.total_items,
            total_amount: summary.total_amount,
            average_items_per_file: summary.average_items_per_file,
        })
        .collect()
}

/// File summaries of a report, one row per file.
pub fn file_rows(report: &InvoiceReport) -> Vec<FileRow> {
    report
        .files()
        .iter()
        .map(|(name, file)| FileRow {
            filename: name.clone(),
            platform: file.platform(),
            invoice_type: file.invoice_type().to_string(),
            items_count: file.items_count(),
            total_amount: file.total_amount(),
        })
        .collect()
}

/// Every item of a report as CSV, columns in canonical order.
pub fn items_csv(report: &InvoiceReport) -> Result<String> {
    let items: Vec<&InvoiceItem> = report.items().collect();
    to_csv_with_schema(&InvoiceItem::FIELDS, &items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::models::item::InvoiceFile;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn report() -> InvoiceReport {
        let mut facebook = InvoiceItem::empty(Platform::Facebook);
        facebook.amount = Some(Decimal::from_str("100.00").unwrap());
        let mut google = InvoiceItem::empty(Platform::Google);
        google.amount = Some(Decimal::from_str("50.50").unwrap());

        aggregate(vec![
            (
                "246546622.pdf".to_string(),
                InvoiceFile::new(Platform::Facebook, "Non-AP", vec![facebook]),
            ),
            (
                "5297692778.pdf".to_string(),
                InvoiceFile::new(Platform::Google, "Non-AP", vec![google]),
            ),
        ])
    }

    #[test]
    fn test_platform_rows_csv() {
        let csv = to_csv(&platform_rows(&report())).unwrap();
        assert_eq!(
            csv,
            "\"platform\",\"files\",\"total_items\",\"total_amount\",\"average_items_per_file\"\n\
             \"Facebook\",\"1\",\"1\",\"100.00\",\"1\"\n\
             \"Google\",\"1\",\"1\",\"50.50\",\"1\"\n"
        );
    }

    #[test]
    fn test_file_rows() {
        let rows = file_rows(&report());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].filename, "246546622.pdf");
        assert_eq!(rows[1].platform, Platform::Google);
        assert_eq!(rows[1].total_amount, Decimal::from_str("50.50").unwrap());
    }

    #[test]
    fn test_items_csv() {
        let csv = items_csv(&report()).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.starts_with("\"platform\",\"source_filename\""));
    }
}
