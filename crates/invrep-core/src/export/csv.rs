//! Schema-checked CSV serialization.

use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use serde_json::{Map, Value};

use super::Result;
use crate::error::ExportError;

const BOM: &str = "\u{feff}";

/// Serialize records to CSV, taking the header from the first record.
///
/// Every record must serialize to an object with the same keys in the same
/// order as the first one; a differing record fails with
/// [`ExportError::HeterogeneousSchema`]. Every field is quoted, embedded quotes
/// are doubled and rows end with `\n`. An empty slice yields an empty string.
pub fn to_csv<R: Serialize>(records: &[R]) -> Result<String> {
    let rows = to_objects(records)?;
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };
    let header: Vec<String> = first.keys().cloned().collect();
    write_rows(&header, &rows)
}

/// Serialize records to CSV against an explicit, ordered schema.
pub fn to_csv_with_schema<R: Serialize>(schema: &[&str], records: &[R]) -> Result<String> {
    let rows = to_objects(records)?;
    let header: Vec<String> = schema.iter().map(|s| s.to_string()).collect();
    write_rows(&header, &rows)
}

/// Prefix CSV text with a UTF-8 byte order mark.
pub fn with_bom(csv: &str) -> String {
    format!("{}{}", BOM, csv)
}

fn to_objects<R: Serialize>(records: &[R]) -> Result<Vec<Map<String, Value>>> {
    records
        .iter()
        .enumerate()
        .map(|(row, record)| match serde_json::to_value(record)? {
            Value::Object(map) => Ok(map),
            _ => Err(ExportError::NotARecord(row)),
        })
        .collect()
}

fn write_rows(header: &[String], rows: &[Map<String, Value>]) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);

    wtr.write_record(header)?;

    for (row, record) in rows.iter().enumerate() {
        if !record.keys().eq(header.iter()) {
            return Err(ExportError::HeterogeneousSchema {
                row,
                expected: header.to_vec(),
                found: record.keys().cloned().collect(),
            });
        }
        wtr.write_record(record.values().map(cell))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        nested => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::{InvoiceItem, Platform};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;

    fn item(platform: Platform, amount: &str, description: &str) -> InvoiceItem {
        let mut item = InvoiceItem::empty(platform);
        item.source_filename = "a.pdf".to_string();
        item.amount = Some(Decimal::from_str(amount).unwrap());
        item.total = item.amount;
        item.description = description.to_string();
        item
    }

    #[test]
    fn test_single_item_has_header_and_row() {
        let csv = to_csv(&[item(Platform::Facebook, "100.00", "Ads")]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        let header: Vec<String> = lines[0]
            .split(',')
            .map(|h| h.trim_matches('"').to_string())
            .collect();
        assert_eq!(header, InvoiceItem::FIELDS);
    }

    #[test]
    fn test_quotes_escaped_and_amounts_verbatim() {
        let items = vec![
            item(Platform::Facebook, "100.00", "Ads \"Q1\""),
            item(Platform::Google, "50.50", "Search"),
        ];

        let csv = to_csv(&items).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            r#""Facebook","a.pdf","","","","0","Ads ""Q1""","100.00","100.00","","","","","","""#
        );
        assert!(lines[2].contains(r#""50.50""#));
    }

    #[test]
    fn test_null_and_empty_both_blank() {
        let mut with_agency = item(Platform::TikTok, "1", "x");
        with_agency.agency = Some(String::new());
        let csv = to_csv(&[with_agency, item(Platform::TikTok, "1", "x")]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], lines[2]);
    }

    #[test]
    fn test_embedded_separators() {
        let csv = to_csv(&[json!({"note": "a,b\nc"})]).unwrap();
        assert_eq!(csv, "\"note\"\n\"a,b\nc\"\n");
    }

    #[test]
    fn test_heterogeneous_records_rejected() {
        let records = vec![json!({"a": 1, "b": 2}), json!({"a": 1, "c": 2})];
        match to_csv(&records) {
            Err(ExportError::HeterogeneousSchema { row, expected, found }) => {
                assert_eq!(row, 1);
                assert_eq!(expected, vec!["a", "b"]);
                assert_eq!(found, vec!["a", "c"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_key_order_matters() {
        let records = vec![json!({"a": 1, "b": 2}), json!({"b": 2, "a": 1})];
        assert!(matches!(
            to_csv(&records),
            Err(ExportError::HeterogeneousSchema { row: 1, .. })
        ));
    }

    #[test]
    fn test_explicit_schema() {
        let items = vec![item(Platform::Google, "2.5", "Clicks")];
        assert_eq!(
            to_csv_with_schema(&InvoiceItem::FIELDS, &items).unwrap(),
            to_csv(&items).unwrap()
        );
        assert!(to_csv_with_schema(&["platform"], &items).is_err());
    }

    #[test]
    fn test_empty_and_non_records() {
        assert_eq!(to_csv::<InvoiceItem>(&[]).unwrap(), "");
        assert!(matches!(to_csv(&[1, 2]), Err(ExportError::NotARecord(0))));
    }

    #[test]
    fn test_bom() {
        assert!(with_bom("\"a\"").starts_with('\u{feff}'));
    }
}
