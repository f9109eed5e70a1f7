//! Platform and free-text filtering over invoice items.

use crate::models::item::InvoiceItem;

/// Platform selector value matching every platform.
pub const ALL_PLATFORMS: &str = "all";

/// Which platforms an [`ItemFilter`] accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformFilter {
    /// Every platform.
    All,
    /// Only the platform with this wire name (case-sensitive).
    Only(String),
}

impl PlatformFilter {
    /// Parse a selector value; `"all"` selects every platform.
    pub fn parse(value: &str) -> Self {
        if value == ALL_PLATFORMS {
            PlatformFilter::All
        } else {
            PlatformFilter::Only(value.to_string())
        }
    }

    fn matches(&self, item: &InvoiceItem) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Only(name) => item.platform.as_str() == name,
        }
    }
}

/// Combined platform and search predicate.
///
/// The query matches an item when it is empty, when it appears in the
/// description, source file name, agency or campaign id ignoring case, or when
/// it appears in the invoice number with exact case.
#[derive(Debug, Clone)]
pub struct ItemFilter {
    platform: PlatformFilter,
    query: String,
    query_lower: String,
}

impl ItemFilter {
    pub fn new(platform: PlatformFilter, query: impl Into<String>) -> Self {
        let query = query.into();
        let query_lower = query.to_lowercase();
        Self {
            platform,
            query,
            query_lower,
        }
    }

    /// Check a single item.
    pub fn matches(&self, item: &InvoiceItem) -> bool {
        self.platform.matches(item) && self.matches_query(item)
    }

    /// Items that match, in their original order.
    pub fn apply<'a, I>(&self, items: I) -> Vec<&'a InvoiceItem>
    where
        I: IntoIterator<Item = &'a InvoiceItem>,
    {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }

    fn matches_query(&self, item: &InvoiceItem) -> bool {
        if self.query.is_empty() {
            return true;
        }

        let contains = |field: &str| field.to_lowercase().contains(&self.query_lower);

        contains(&item.description)
            || contains(&item.source_filename)
            || item.invoice_number.contains(&self.query)
            || item.agency.as_deref().is_some_and(contains)
            || item.campaign_id.as_deref().is_some_and(contains)
    }
}

/// Select the items on `platform` (or `"all"`) that match `query`.
pub fn filter<'a>(items: &'a [InvoiceItem], platform: &str, query: &str) -> Vec<&'a InvoiceItem> {
    ItemFilter::new(PlatformFilter::parse(platform), query).apply(items)
}
