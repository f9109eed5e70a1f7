//! Unified record model: line items and the files that group them.

use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum difference tolerated between a stated total and the sum it should equal.
pub fn amount_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Largest absolute amount accepted for a single line.
///
/// Sums of up to 10^13 lines at this size stay within `Decimal` range.
pub fn max_line_amount() -> Decimal {
    Decimal::new(1_000_000_000_000_000, 0)
}

/// Sum amounts, or `None` if the sum leaves `Decimal` range.
pub fn checked_sum<I: IntoIterator<Item = Decimal>>(amounts: I) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

/// Advertising platform an invoice was issued by.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Platform {
    /// Meta / Facebook Ads.
    Facebook,
    /// Google Ads.
    Google,
    /// TikTok For Business.
    TikTok,
    /// Platform could not be determined.
    #[default]
    #[serde(rename = "unknown", alias = "Unknown")]
    Unknown,
}

impl Platform {
    /// All platforms, known vendors first.
    pub const ALL: [Platform; 4] = [
        Platform::Facebook,
        Platform::Google,
        Platform::TikTok,
        Platform::Unknown,
    ];

    /// Wire name of the platform, as used in reports and filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Google => "Google",
            Platform::TikTok => "TikTok",
            Platform::Unknown => "unknown",
        }
    }

    /// Resolve a vendor name as written by an extractor.
    ///
    /// Matching ignores case and surrounding whitespace. Returns `None` for
    /// names outside the known set.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "facebook" | "meta" => Some(Platform::Facebook),
            "google" => Some(Platform::Google),
            "tiktok" => Some(Platform::TikTok),
            "unknown" => Some(Platform::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One billable line from one source file.
///
/// Field order is the canonical column order of item exports and must stay in
/// sync with [`InvoiceItem::FIELDS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Platform the invoice was issued by.
    pub platform: Platform,

    /// Name of the file this line was extracted from.
    #[serde(alias = "filename")]
    pub source_filename: String,

    /// Invoice number as printed on the document.
    pub invoice_number: String,

    /// Vendor-side invoice identifier.
    pub invoice_id: String,

    /// Invoice classification (e.g. "AP", "Non-AP").
    pub invoice_type: String,

    /// Position of the line within its file.
    pub line_number: u32,

    /// Line description.
    pub description: String,

    /// Charge for this line.
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub amount: Option<Decimal>,

    /// Invoice-level total this line belongs to.
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub total: Option<Decimal>,

    pub agency: Option<String>,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub objective: Option<String>,
    pub period: Option<String>,
    pub campaign_id: Option<String>,
}

impl InvoiceItem {
    /// Canonical field names, in export order.
    pub const FIELDS: [&'static str; 15] = [
        "platform",
        "source_filename",
        "invoice_number",
        "invoice_id",
        "invoice_type",
        "line_number",
        "description",
        "amount",
        "total",
        "agency",
        "project_id",
        "project_name",
        "objective",
        "period",
        "campaign_id",
    ];

    /// Create an item with every field set to its absence marker.
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            source_filename: String::new(),
            invoice_number: String::new(),
            invoice_id: String::new(),
            invoice_type: String::new(),
            line_number: 0,
            description: String::new(),
            amount: None,
            total: None,
            agency: None,
            project_id: None,
            project_name: None,
            objective: None,
            period: None,
            campaign_id: None,
        }
    }

    /// Line charge, counting an absent amount as zero.
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

/// All items extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFile {
    platform: Platform,
    invoice_type: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    total_amount: Decimal,
    items_count: usize,
    items: Vec<InvoiceItem>,
}

impl InvoiceFile {
    /// Build a file from its items, deriving the total and the count.
    ///
    /// Items keep the order they were given in. A total beyond `Decimal` range
    /// saturates; [`InvoiceFile::validate`] reports it.
    pub fn new(platform: Platform, invoice_type: impl Into<String>, items: Vec<InvoiceItem>) -> Self {
        let total_amount = items
            .iter()
            .map(InvoiceItem::amount_or_zero)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        Self {
            platform,
            invoice_type: invoice_type.into(),
            total_amount,
            items_count: items.len(),
            items,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn invoice_type(&self) -> &str {
        &self.invoice_type
    }

    /// Sum of the items' amounts.
    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn items_count(&self) -> usize {
        self.items_count
    }

    /// Items in extraction order.
    pub fn items(&self) -> &[InvoiceItem] {
        &self.items
    }

    /// Check the file's derived fields and return any issues found.
    ///
    /// Files built with [`InvoiceFile::new`] are always consistent; this is
    /// meant for files read back from JSON.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.items_count != self.items.len() {
            issues.push(format!(
                "items_count ({}) differs from number of items ({})",
                self.items_count,
                self.items.len()
            ));
        }

        match checked_sum(self.items.iter().map(InvoiceItem::amount_or_zero)) {
            Some(calculated) => {
                let differs = calculated
                    .checked_sub(self.total_amount)
                    .is_none_or(|diff| diff.abs() > amount_tolerance());
                if differs {
                    issues.push(format!(
                        "Item amount total ({}) differs from file total ({})",
                        calculated, self.total_amount
                    ));
                }
            }
            None => issues.push("Item amount total is out of range".to_string()),
        }

        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.line_number) {
                issues.push(format!("Duplicate line number {}", item.line_number));
            }
        }

        issues
    }
}
