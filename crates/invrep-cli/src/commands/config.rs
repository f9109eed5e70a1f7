//! Config command - inspect and edit the report configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use invrep_core::ReportConfig;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value by dotted key (e.g. "export.csv_bom")
    Get { key: String },

    /// Change one value by dotted key
    Set {
        key: String,
        /// New value, parsed as JSON when possible (e.g. true, "reject")
        value: String,
    },

    /// Show the configuration file location
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => {
            let config = read_or_default(&path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init { force } => init(&path, force)?,
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(read_or_default(&path)?)?;
            let value = lookup(&json, &key)
                .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => set(&path, &key, &value)?,
        ConfigCommand::Path => {
            println!("Configuration file: {}", path.display());
            if path.exists() {
                println!("Status: {}", style("exists").green());
            } else {
                println!("Status: {}", style("not created").yellow());
                println!();
                println!("Run 'invrep config init' to create a configuration file.");
            }
        }
    }

    Ok(())
}

fn read_or_default(path: &Path) -> anyhow::Result<ReportConfig> {
    if path.exists() {
        Ok(ReportConfig::from_file(path)?)
    } else {
        Ok(ReportConfig::default())
    }
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    ReportConfig::default().save(path)?;
    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn set(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let mut json = serde_json::to_value(read_or_default(path)?)?;
    let value = parse_value(raw);

    assign(&mut json, key, value.clone())?;
    let config: ReportConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&value)?
    );
    Ok(())
}

/// Interpret a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |node, part| node.get(part))
}

/// Set an existing leaf or a new key inside an existing section.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (section, leaf) = match key.rsplit_once('.') {
        Some((section, leaf)) => (Some(section), leaf),
        None => (None, key),
    };

    let mut node = json;
    for part in section.into_iter().flat_map(|s| s.split('.')) {
        node = node
            .get_mut(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
    }

    match node.as_object_mut() {
        Some(object) => {
            object.insert(leaf.to_string(), value);
            Ok(())
        }
        None => anyhow::bail!("Cannot set value at non-object path: {}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup() {
        let json = json!({"export": {"csv_bom": false}});
        assert_eq!(lookup(&json, "export.csv_bom"), Some(&json!(false)));
        assert_eq!(lookup(&json, "export.missing"), None);
        assert!(lookup(&json, "export").unwrap().is_object());
    }

    #[test]
    fn test_assign() {
        let mut json = json!({"aggregate": {"duplicate_policy": "last_write_wins"}});
        assign(&mut json, "aggregate.duplicate_policy", json!("reject")).unwrap();
        assert_eq!(json["aggregate"]["duplicate_policy"], "reject");

        assert!(assign(&mut json, "nope.value", json!(1)).is_err());
        assert!(assign(&mut json, "aggregate.duplicate_policy.deeper", json!(1)).is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("reject"), json!("reject"));
        assert_eq!(parse_value("\"pk\""), json!("pk"));
    }

    #[test]
    fn test_set_rejects_invalid_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        set(&path, "export.csv_bom", "true").unwrap();
        assert!(ReportConfig::from_file(&path).unwrap().export.csv_bom);

        assert!(set(&path, "aggregate.duplicate_policy", "sometimes").is_err());
    }
}
