//! CLI subcommands.

pub mod config;
pub mod export;
pub mod filter;
pub mod report;

use std::fs;
use std::path::{Path, PathBuf};

use console::style;
use tracing::debug;

use invrep_core::export::from_json;
use invrep_core::{InvoiceReport, ReportConfig};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invrep")
        .join("config.json")
}

/// Load configuration from an explicit path, the default path, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<ReportConfig> {
    if let Some(path) = config_path {
        return Ok(ReportConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(ReportConfig::from_file(&default_path)?)
    } else {
        Ok(ReportConfig::default())
    }
}

/// Read a report JSON file.
pub fn read_report(path: &Path) -> anyhow::Result<InvoiceReport> {
    if !path.exists() {
        anyhow::bail!("Report file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)?;
    let report = from_json(&content)
        .map_err(|e| anyhow::anyhow!("Failed to read report {}: {}", path.display(), e))?;

    let issues = report.validate();
    if !issues.is_empty() {
        eprintln!("{}", style("Report consistency issues:").yellow());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
    }

    Ok(report)
}

/// Write content to a file, or to stdout when no file is given.
pub fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}
