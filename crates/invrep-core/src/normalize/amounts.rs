//! Amount parsing for vendor invoice values.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use super::patterns::{AMOUNT_BODY, CURRENCY_TOKEN};

/// Outcome of reading an amount from a raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAmount {
    /// No value, `null`, or a blank string.
    Absent,
    /// A parsed amount.
    Present(Decimal),
    /// A value that is not an amount, kept as text for error reporting.
    Malformed(String),
}

/// Read an amount from a JSON value.
///
/// Numbers keep the precision they were written with (`100.00` stays at two
/// decimal places). Strings go through [`parse_amount`].
pub fn read_amount(value: Option<&Value>) -> RawAmount {
    match value {
        None | Some(Value::Null) => RawAmount::Absent,
        Some(Value::Number(n)) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map(RawAmount::Present)
                .unwrap_or(RawAmount::Malformed(text))
        }
        Some(Value::String(s)) if s.trim().is_empty() => RawAmount::Absent,
        Some(Value::String(s)) => match parse_amount(s) {
            Some(amount) => RawAmount::Present(amount),
            None => RawAmount::Malformed(s.clone()),
        },
        Some(other) => RawAmount::Malformed(other.to_string()),
    }
}

/// Parse an amount as printed on an invoice (e.g. "฿17,991.76", "1 234,56",
/// "(250.00)", "-12.5 THB").
///
/// Parentheses mark a negative amount. When both separators appear the last
/// one is the decimal separator; a lone comma followed by exactly three digits
/// is a thousands separator.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let stripped = CURRENCY_TOKEN.replace_all(s, "");
    let mut text = stripped.trim();
    let mut negative = false;

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        negative = true;
        text = inner.trim();
    }
    if let Some(rest) = text.strip_prefix('-') {
        negative = !negative;
        text = rest.trim();
    } else if let Some(rest) = text.strip_prefix('+') {
        text = rest.trim();
    }

    if !AMOUNT_BODY.is_match(text) {
        return None;
    }

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(c), None) => {
            let single = cleaned.matches(',').count() == 1;
            if single && cleaned.len() - c - 1 != 3 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (None, Some(_)) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    let amount = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -amount } else { amount })
}

/// Format an amount with thousands separators and two decimals (1,234.56).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let parts: Vec<&str> = s.split('.').collect();

    if parts.len() != 2 {
        return s;
    }

    let integer_part = parts[0];
    let decimal_part = parts[1];

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    if amount.is_sign_negative() && !amount.is_zero() {
        formatted.push('-');
    }

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{}.{}", formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("17,991.76"), Some(dec("17991.76")));
        assert_eq!(parse_amount("฿17,991.76"), Some(dec("17991.76")));
        assert_eq!(parse_amount("1 234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1.234.567,89"), Some(dec("1234567.89")));
        assert_eq!(parse_amount("1,234"), Some(dec("1234")));
        assert_eq!(parse_amount("12,5"), Some(dec("12.5")));
        assert_eq!(parse_amount("100.00 THB"), Some(dec("100.00")));
        assert_eq!(parse_amount("(250.00)"), Some(dec("-250.00")));
        assert_eq!(parse_amount("-12.5"), Some(dec("-12.5")));
    }

    #[test]
    fn test_parse_amount_keeps_scale() {
        assert_eq!(parse_amount("100.00").unwrap().to_string(), "100.00");
    }

    #[test]
    fn test_parse_amount_rejects_text() {
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount("12abc"), None);
        assert_eq!(parse_amount("-"), None);
    }

    #[test]
    fn test_read_amount() {
        assert_eq!(read_amount(None), RawAmount::Absent);
        assert_eq!(read_amount(Some(&json!(null))), RawAmount::Absent);
        assert_eq!(read_amount(Some(&json!("  "))), RawAmount::Absent);
        assert_eq!(read_amount(Some(&json!(50.5))), RawAmount::Present(dec("50.5")));
        assert_eq!(read_amount(Some(&json!(18000))), RawAmount::Present(dec("18000")));
        assert_eq!(
            read_amount(Some(&json!("oops"))),
            RawAmount::Malformed("oops".to_string())
        );
        assert!(matches!(read_amount(Some(&json!([1]))), RawAmount::Malformed(_)));
    }

    #[test]
    fn test_read_amount_preserves_literal_precision() {
        let value: Value = serde_json::from_str("100.00").unwrap();
        match read_amount(Some(&value)) {
            RawAmount::Present(amount) => assert_eq!(amount.to_string(), "100.00"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("1234.56")), "1,234.56");
        assert_eq!(format_amount(dec("12345678.9")), "12,345,678.90");
        assert_eq!(format_amount(dec("-1000")), "-1,000.00");
        assert_eq!(format_amount(dec("0")), "0.00");
    }
}
