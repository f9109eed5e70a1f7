//! Aggregated invoice report and its summary rollups.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::item::{amount_tolerance, checked_sum, InvoiceFile, InvoiceItem, Platform};

/// Rollup of all files issued by one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSummary {
    /// Sum of the files' total amounts.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,

    /// Sum of the files' item counts.
    pub total_items: usize,

    /// Number of files.
    pub files: usize,

    /// `total_items / files`, rounded to two decimal places.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub average_items_per_file: Decimal,
}

impl PlatformSummary {
    pub(crate) fn add_file(&mut self, file: &InvoiceFile) {
        self.total_amount = self.total_amount.saturating_add(file.total_amount());
        self.total_items += file.items_count();
        self.files += 1;
        self.average_items_per_file = average(self.total_items, self.files);
    }
}

/// Rollup over every file regardless of platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallSummary {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
    pub total_items: usize,
    pub files_processed: usize,
}

impl OverallSummary {
    pub(crate) fn add_file(&mut self, file: &InvoiceFile) {
        self.total_amount = self.total_amount.saturating_add(file.total_amount());
        self.total_items += file.items_count();
        self.files_processed += 1;
    }

    /// Average number of items per processed file.
    pub fn average_items_per_file(&self) -> Decimal {
        average(self.total_items, self.files_processed)
    }
}

fn average(items: usize, files: usize) -> Decimal {
    if files == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(items) / Decimal::from(files)).round_dp(2)
}

/// Summary section of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Rollups keyed by the platforms observed in the report.
    pub by_platform: BTreeMap<Platform, PlatformSummary>,

    /// Rollup over all files.
    pub overall: OverallSummary,
}

/// The unified invoice report.
///
/// Produced once by the aggregator and read-only afterwards; its JSON form is
/// the transfer format consumed by presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceReport {
    generated_at: DateTime<Utc>,
    total_files: usize,
    summary: ReportSummary,
    files: BTreeMap<String, InvoiceFile>,
}

impl InvoiceReport {
    pub(crate) fn from_parts(
        generated_at: DateTime<Utc>,
        total_files: usize,
        summary: ReportSummary,
        files: BTreeMap<String, InvoiceFile>,
    ) -> Self {
        Self {
            generated_at,
            total_files,
            summary,
            files,
        }
    }

    /// Time the report was aggregated.
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Number of file entries submitted to aggregation, duplicates included.
    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    /// Files keyed by filename.
    pub fn files(&self) -> &BTreeMap<String, InvoiceFile> {
        &self.files
    }

    pub fn file(&self, filename: &str) -> Option<&InvoiceFile> {
        self.files.get(filename)
    }

    /// All items of all files, file by file in key order.
    pub fn items(&self) -> impl Iterator<Item = &InvoiceItem> {
        self.files.values().flat_map(|file| file.items().iter())
    }

    /// Platforms present in the report.
    pub fn platforms(&self) -> Vec<Platform> {
        self.summary.by_platform.keys().copied().collect()
    }

    /// Check the report's rollups against its files and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (name, file) in &self.files {
            for issue in file.validate() {
                issues.push(format!("{}: {}", name, issue));
            }
        }

        let overall = &self.summary.overall;
        match checked_sum(self.files.values().map(InvoiceFile::total_amount)) {
            Some(files_total) => {
                let differs = files_total
                    .checked_sub(overall.total_amount)
                    .is_none_or(|diff| diff.abs() > amount_tolerance());
                if differs {
                    issues.push(format!(
                        "Overall total ({}) differs from sum of file totals ({})",
                        overall.total_amount, files_total
                    ));
                }
            }
            None => issues.push("Sum of file totals is out of range".to_string()),
        }

        let platform_items: usize = self
            .summary
            .by_platform
            .values()
            .map(|p| p.total_items)
            .sum();
        if platform_items != overall.total_items {
            issues.push(format!(
                "Platform item total ({}) differs from overall ({})",
                platform_items, overall.total_items
            ));
        }

        if overall.files_processed != self.files.len() {
            issues.push(format!(
                "files_processed ({}) differs from number of files ({})",
                overall.files_processed,
                self.files.len()
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rounding() {
        assert_eq!(average(0, 0), Decimal::ZERO);
        assert_eq!(average(10, 4), Decimal::new(250, 2));
        assert_eq!(average(10, 3), Decimal::new(333, 2));
    }

    #[test]
    fn test_platform_summary_accumulates() {
        let file = InvoiceFile::new(Platform::TikTok, "AP", vec![InvoiceItem::empty(Platform::TikTok)]);
        let mut summary = PlatformSummary::default();
        summary.add_file(&file);
        summary.add_file(&file);
        assert_eq!(summary.files, 2);
        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.average_items_per_file, Decimal::ONE);
    }

    #[test]
    fn test_rollups_saturate_on_huge_totals() {
        let mut item = InvoiceItem::empty(Platform::Google);
        item.amount = Some(Decimal::MAX);
        let file = InvoiceFile::new(Platform::Google, "Non-AP", vec![item]);

        let report = crate::aggregate::aggregate(vec![
            ("a.pdf".to_string(), file.clone()),
            ("b.pdf".to_string(), file),
        ]);

        assert_eq!(report.summary().overall.total_amount, Decimal::MAX);
        assert_eq!(report.summary().by_platform[&Platform::Google].total_amount, Decimal::MAX);
        assert!(report
            .validate()
            .contains(&"Sum of file totals is out of range".to_string()));
    }

    #[test]
    fn test_platform_keys_serialize_as_names() {
        let mut summary = ReportSummary::default();
        summary
            .by_platform
            .insert(Platform::Unknown, PlatformSummary::default());
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"unknown\":{"));
    }
}
