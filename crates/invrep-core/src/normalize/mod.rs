//! Normalization of vendor-specific extracted records into the unified model.

pub mod amounts;
pub mod patterns;

pub use amounts::{format_amount, parse_amount, read_amount, RawAmount};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::NormalizeError;
use crate::models::config::NormalizeConfig;
use crate::models::item::{max_line_amount, InvoiceFile, InvoiceItem, Platform};

use patterns::LINE_NUMBER;

/// Result type for normalization operations.
pub type Result<T> = std::result::Result<T, NormalizeError>;

/// A raw key-value record as delivered by the extraction service.
pub type RawRecord = Map<String, Value>;

/// Extraction output for one uploaded file.
///
/// A file the extractor could not parse at all carries an `error` and no
/// records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileExtraction {
    /// Uploaded file name.
    pub filename: String,

    /// Platform detected by the extractor, if any.
    #[serde(default)]
    pub platform: Option<String>,

    /// Extracted line records.
    #[serde(default)]
    pub records: Vec<Value>,

    /// File-level failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A file the extractor could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub filename: String,
    pub message: String,
}

/// Normalized file together with the lines that could not be normalized.
#[derive(Debug, Clone)]
pub struct NormalizedFile {
    /// File name used as the report key.
    pub filename: String,
    /// The file built from every line that normalized cleanly.
    pub file: InvoiceFile,
    /// Errors for lines left out of `file`.
    pub errors: Vec<NormalizeError>,
}

/// Maps raw extraction records into [`InvoiceItem`]s and [`InvoiceFile`]s.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    /// Create a normalizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given normalization settings.
    pub fn with_config(mut self, config: NormalizeConfig) -> Self {
        self.config = config;
        self
    }

    /// Normalize a single raw record.
    ///
    /// Absent string fields become empty strings, absent optional attributes
    /// and amounts become `None`. A missing line number is recorded as 0.
    pub fn normalize(&self, raw: &RawRecord, platform_hint: Option<&str>) -> Result<InvoiceItem> {
        convert(raw, platform_hint, None, 0)
    }

    /// Normalize every record of one extracted file.
    ///
    /// Lines that fail are reported in [`NormalizedFile::errors`] and left out
    /// of the file; the remaining lines keep their extraction order.
    pub fn normalize_file(&self, extraction: &FileExtraction) -> NormalizedFile {
        let hint = extraction.platform.as_deref();
        let mut items = Vec::with_capacity(extraction.records.len());
        let mut errors = Vec::new();

        for (index, value) in extraction.records.iter().enumerate() {
            let result = match value.as_object() {
                Some(raw) => convert(raw, hint, Some(&extraction.filename), index as u32 + 1),
                None => Err(NormalizeError::NotAnObject {
                    file: extraction.filename.clone(),
                    index,
                }),
            };

            match result {
                Ok(item) => items.push(item),
                Err(e) => {
                    warn!("Skipping line of {}: {}", extraction.filename, e);
                    errors.push(e);
                }
            }
        }

        let platform = items
            .first()
            .map(|item| item.platform)
            .or_else(|| hint.and_then(Platform::from_name))
            .unwrap_or_default();
        let invoice_type = self.classify(&items);

        debug!(
            "Normalized {} lines of {} ({}, {}), {} rejected",
            items.len(),
            extraction.filename,
            platform,
            invoice_type,
            errors.len()
        );

        NormalizedFile {
            filename: extraction.filename.clone(),
            file: InvoiceFile::new(platform, invoice_type, items),
            errors,
        }
    }

    /// Determine a file's invoice type from its items.
    ///
    /// Items that all declare the same type decide it; otherwise a file with
    /// any agency-placed line is AP and the rest are Non-AP.
    pub fn classify(&self, items: &[InvoiceItem]) -> String {
        let Some(first) = items.first() else {
            return self.config.unknown_invoice_type.clone();
        };

        if !first.invoice_type.is_empty()
            && items.iter().all(|i| i.invoice_type == first.invoice_type)
        {
            return first.invoice_type.clone();
        }

        let marker = self.config.ap_agency_marker.as_str();
        if items.iter().any(|i| i.agency.as_deref() == Some(marker)) {
            self.config.ap_invoice_type.clone()
        } else {
            self.config.non_ap_invoice_type.clone()
        }
    }
}

/// Normalize a single raw record with default settings.
pub fn normalize(raw: &RawRecord, platform_hint: Option<&str>) -> Result<InvoiceItem> {
    Normalizer::new().normalize(raw, platform_hint)
}

fn convert(
    raw: &RawRecord,
    platform_hint: Option<&str>,
    filename: Option<&str>,
    position: u32,
) -> Result<InvoiceItem> {
    let mut item = InvoiceItem::empty(resolve_platform(raw, platform_hint));

    item.source_filename = text(raw, "source_filename")
        .or_else(|| text(raw, "filename"))
        .filter(|name| !name.is_empty())
        .or_else(|| filename.map(str::to_string))
        .unwrap_or_default();

    item.line_number = match raw.get("line_number") {
        None | Some(Value::Null) => position,
        Some(value) => read_line_number(value).ok_or_else(|| NormalizeError::MalformedField {
            file: item.source_filename.clone(),
            field: "line_number".to_string(),
            value: display(value),
        })?,
    };

    item.invoice_number = text(raw, "invoice_number").unwrap_or_default();
    item.invoice_id = text(raw, "invoice_id").unwrap_or_default();
    item.invoice_type = text(raw, "invoice_type").unwrap_or_default();
    item.description = text(raw, "description").unwrap_or_default();

    let amount = decimal(raw, "amount", &item)?;
    let total = decimal(raw, "total", &item)?;
    item.amount = amount.or(total);
    item.total = total.or(amount);

    item.agency = text(raw, "agency");
    item.project_id = text(raw, "project_id");
    item.project_name = text(raw, "project_name");
    item.objective = text(raw, "objective");
    item.period = text(raw, "period");
    item.campaign_id = text(raw, "campaign_id");

    Ok(item)
}

fn resolve_platform(raw: &RawRecord, hint: Option<&str>) -> Platform {
    if let Some(platform) = hint.and_then(Platform::from_name) {
        return platform;
    }
    if let Some(name) = hint {
        debug!("Ignoring unrecognized platform hint {:?}", name);
    }

    raw.get("platform")
        .and_then(Value::as_str)
        .and_then(Platform::from_name)
        .unwrap_or_default()
}

fn text(raw: &RawRecord, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_line_number(value: &Value) -> Option<u32> {
    let text = display(value);
    let caps = LINE_NUMBER.captures(&text)?;
    caps[1].parse().ok()
}

fn decimal(
    raw: &RawRecord,
    field: &str,
    item: &InvoiceItem,
) -> Result<Option<rust_decimal::Decimal>> {
    match read_amount(raw.get(field)) {
        RawAmount::Absent => Ok(None),
        RawAmount::Present(amount) if amount.abs() > max_line_amount() => {
            Err(NormalizeError::AmountOutOfRange {
                file: item.source_filename.clone(),
                line: item.line_number,
                field: field.to_string(),
                value: amount.to_string(),
            })
        }
        RawAmount::Present(amount) => Ok(Some(amount)),
        RawAmount::Malformed(value) => Err(NormalizeError::MalformedAmount {
            file: item.source_filename.clone(),
            line: item.line_number,
            field: field.to_string(),
            value,
        }),
    }
}
