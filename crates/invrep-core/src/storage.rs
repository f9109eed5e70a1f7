//! Report persistence behind a repository interface.
//!
//! The aggregation pipeline never stores anything itself; callers that want to
//! keep reports inject one of these repositories.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::error::StorageError;
use crate::export::{from_json, to_json};
use crate::models::report::InvoiceReport;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Store and retrieve reports by identifier.
pub trait ReportRepository {
    /// Store a report, replacing any report with the same id.
    fn store(&self, id: &str, report: &InvoiceReport) -> Result<()>;

    /// Retrieve a report, or `None` if no report has that id.
    fn retrieve(&self, id: &str) -> Result<Option<InvoiceReport>>;

    /// Identifiers of all stored reports, sorted.
    fn list(&self) -> Result<Vec<String>>;
}

/// Keeps reports in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    reports: RwLock<BTreeMap<String, InvoiceReport>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportRepository for InMemoryRepository {
    fn store(&self, id: &str, report: &InvoiceReport) -> Result<()> {
        let mut reports = self.reports.write().unwrap_or_else(|e| e.into_inner());
        reports.insert(id.to_string(), report.clone());
        Ok(())
    }

    fn retrieve(&self, id: &str) -> Result<Option<InvoiceReport>> {
        let reports = self.reports.read().unwrap_or_else(|e| e.into_inner());
        Ok(reports.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<String>> {
        let reports = self.reports.read().unwrap_or_else(|e| e.into_inner());
        Ok(reports.keys().cloned().collect())
    }
}

/// Keeps each report as `<id>.json` in a directory.
#[derive(Debug, Clone)]
pub struct FileRepository {
    dir: PathBuf,
}

impl FileRepository {
    /// Use `dir` for storage, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !id.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

impl ReportRepository for FileRepository {
    fn store(&self, id: &str, report: &InvoiceReport) -> Result<()> {
        let path = self.path_for(id)?;
        let content = to_json(report).map_err(|e| StorageError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&path, content)?;
        debug!("Stored report {} at {}", id, path.display());
        Ok(())
    }

    fn retrieve(&self, id: &str) -> Result<Option<InvoiceReport>> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let report = from_json(&content).map_err(|e| StorageError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(report))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
