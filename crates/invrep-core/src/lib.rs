//! Core library for unified ad-platform invoice reports.
//!
//! This crate provides:
//! - A unified record model for invoice lines from Facebook, Google and TikTok
//! - Normalization of vendor-shaped extraction records into that model
//! - Aggregation into per-platform and overall summaries
//! - Platform and free-text filtering of report items
//! - Schema-checked CSV export and lossless JSON export
//! - A repository interface for persisting reports

pub mod error;
pub mod models;
pub mod normalize;
pub mod aggregate;
pub mod filter;
pub mod export;
pub mod storage;

pub use error::{ReportError, Result};
pub use models::config::ReportConfig;
pub use models::item::{InvoiceFile, InvoiceItem, Platform};
pub use models::report::{InvoiceReport, OverallSummary, PlatformSummary, ReportSummary};
pub use normalize::{normalize, FileExtraction, FileFailure, NormalizedFile, Normalizer, RawRecord};
pub use aggregate::{aggregate, Aggregator, Clock, FixedClock, SystemClock};
pub use filter::{filter, ItemFilter, PlatformFilter};
pub use export::{to_csv, to_json};
pub use storage::{FileRepository, InMemoryRepository, ReportRepository};
