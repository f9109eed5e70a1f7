//! Aggregation of normalized files into an [`InvoiceReport`].

mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::error::AggregateError;
use crate::models::config::{AggregateConfig, DuplicatePolicy};
use crate::models::item::InvoiceFile;
use crate::models::report::{InvoiceReport, ReportSummary};

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, AggregateError>;

/// Folds normalized files into a report.
pub struct Aggregator<C = SystemClock> {
    clock: C,
    duplicate_policy: DuplicatePolicy,
}

impl Aggregator<SystemClock> {
    /// Create an aggregator stamping reports with the system clock.
    pub fn new() -> Self {
        Self {
            clock: SystemClock,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl Default for Aggregator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Aggregator<C> {
    /// Stamp reports with the given clock.
    pub fn with_clock<D: Clock>(self, clock: D) -> Aggregator<D> {
        Aggregator {
            clock,
            duplicate_policy: self.duplicate_policy,
        }
    }

    /// Set how files sharing a name are handled.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Apply aggregation settings.
    pub fn with_config(self, config: &AggregateConfig) -> Self {
        self.with_duplicate_policy(config.duplicate_policy)
    }

    /// Aggregate files, letting a later file replace an earlier one with the
    /// same name.
    ///
    /// This ignores the configured duplicate policy and never fails.
    pub fn aggregate<I>(&self, files: I) -> InvoiceReport
    where
        I: IntoIterator<Item = (String, InvoiceFile)>,
    {
        let generated_at = self.clock.now();
        let mut total_files = 0;
        let mut by_name = BTreeMap::new();

        for (name, file) in files {
            total_files += 1;
            if by_name.insert(name.clone(), file).is_some() {
                warn!("Duplicate filename {}, replacing earlier entry", name);
            }
        }

        build(generated_at, total_files, by_name)
    }

    /// Aggregate files under the configured duplicate policy.
    pub fn try_aggregate<I>(&self, files: I) -> Result<InvoiceReport>
    where
        I: IntoIterator<Item = (String, InvoiceFile)>,
    {
        let files: Vec<_> = files.into_iter().collect();

        if self.duplicate_policy == DuplicatePolicy::Reject {
            let mut seen = HashSet::new();
            for (name, _) in &files {
                if !seen.insert(name.as_str()) {
                    return Err(AggregateError::DuplicateFilename(name.clone()));
                }
            }
        }

        Ok(self.aggregate(files))
    }
}

fn build(
    generated_at: chrono::DateTime<chrono::Utc>,
    total_files: usize,
    files: BTreeMap<String, InvoiceFile>,
) -> InvoiceReport {
    let mut summary = ReportSummary::default();

    for file in files.values() {
        summary
            .by_platform
            .entry(file.platform())
            .or_default()
            .add_file(file);
        summary.overall.add_file(file);
    }

    debug!(
        "Aggregated {} files ({} submitted) across {} platforms, {} items",
        files.len(),
        total_files,
        summary.by_platform.len(),
        summary.overall.total_items
    );

    InvoiceReport::from_parts(generated_at, total_files, summary, files)
}

/// Aggregate files with the system clock and last-write-wins duplicates.
pub fn aggregate<I>(files: I) -> InvoiceReport
where
    I: IntoIterator<Item = (String, InvoiceFile)>,
{
    Aggregator::new().aggregate(files)
}
