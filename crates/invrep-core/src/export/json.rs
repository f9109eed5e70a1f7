//! JSON serialization of whole reports.

use super::Result;
use crate::models::report::InvoiceReport;

/// Serialize a report as pretty-printed JSON.
///
/// Every field is written, including `null` attributes, and amounts are
/// emitted as JSON numbers at their full precision.
pub fn to_json(report: &InvoiceReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Parse a report written by [`to_json`].
pub fn from_json(text: &str) -> Result<InvoiceReport> {
    Ok(serde_json::from_str(text)?)
}
