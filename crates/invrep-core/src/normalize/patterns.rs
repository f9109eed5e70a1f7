//! Common regex patterns for vendor amount formats.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Currency symbols and codes printed next to amounts
    pub static ref CURRENCY_TOKEN: Regex = Regex::new(
        r"(?i)฿|\$|€|£|บาท|\b(?:THB|USD|EUR|GBP)\b"
    ).unwrap();

    // Digits with optional grouping and decimal separators
    pub static ref AMOUNT_BODY: Regex = Regex::new(
        r"^\d[\d\s\u{00a0},.']*$"
    ).unwrap();

    // Non-negative integer, optionally written with a trailing ".0"
    pub static ref LINE_NUMBER: Regex = Regex::new(
        r"^\s*(\d+)(?:\.0+)?\s*$"
    ).unwrap();
}
