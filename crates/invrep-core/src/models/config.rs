//! Configuration structures for the report pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Main configuration for the invrep pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Record normalization configuration.
    pub normalize: NormalizeConfig,

    /// Aggregation configuration.
    pub aggregate: AggregateConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// Record normalization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Agency value that marks a line as agency-placed (AP).
    pub ap_agency_marker: String,

    /// Invoice type assigned to files with at least one AP line.
    pub ap_invoice_type: String,

    /// Invoice type assigned to files without AP lines.
    pub non_ap_invoice_type: String,

    /// Invoice type assigned to files without any lines.
    pub unknown_invoice_type: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            ap_agency_marker: "pk".to_string(),
            ap_invoice_type: "AP".to_string(),
            non_ap_invoice_type: "Non-AP".to_string(),
            unknown_invoice_type: "Unknown".to_string(),
        }
    }
}

/// How the aggregator treats two files with the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later file replaces the earlier one.
    #[default]
    LastWriteWins,
    /// Aggregation fails.
    Reject,
}

/// Aggregation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub duplicate_policy: DuplicatePolicy,
}

/// Export configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Prefix CSV output with a UTF-8 byte order mark (for spreadsheet tools).
    pub csv_bom: bool,

    /// Default directory for exported files.
    pub output_dir: Option<PathBuf>,
}

impl ReportConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ReportError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
