use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate};
use regex::Regex;

/// Rating text used by the catalog for "no rating"; normalised to `None`.
pub const NO_RATING_SENTINEL: &str = "No rating available";

/// Captures the first segment of a `["A >> B >> C"]` category path.
static MAIN_CATEGORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\["([^>]+)"#).expect("valid category regex"));

// ---------------------------------------------------------------------------
// ProductRecord – one row of the catalog
// ---------------------------------------------------------------------------

/// A single product (one row of the source table) with derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    /// Raw category path, e.g. `["Clothing >> Women >> Dresses"]`.
    pub category_tree: Option<String>,
    pub retail_price: f64,
    pub discounted_price: f64,
    pub brand: String,
    pub crawl_timestamp: Option<DateTime<FixedOffset>>,
    pub rating: Option<String>,

    /// `retail_price - discounted_price`; negative when the "discount" is a markup.
    pub discount: f64,
    /// Top-level label extracted from `category_tree`.
    pub main_category: Option<String>,
}

impl ProductRecord {
    /// Build a record from its source fields, computing the derived columns.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Option<String>,
        name: Option<String>,
        url: Option<String>,
        category_tree: Option<String>,
        retail_price: f64,
        discounted_price: f64,
        brand: String,
        crawl_timestamp: Option<DateTime<FixedOffset>>,
        rating: Option<String>,
    ) -> Self {
        let main_category = category_tree.as_deref().and_then(extract_main_category);
        let rating = rating.filter(|r| r != NO_RATING_SENTINEL);
        Self {
            id,
            name,
            url,
            category_tree,
            retail_price,
            discounted_price,
            brand,
            crawl_timestamp,
            rating,
            discount: retail_price - discounted_price,
            main_category,
        }
    }

    /// Calendar date of the crawl, in the timestamp's own offset.
    pub fn crawl_date(&self) -> Option<NaiveDate> {
        self.crawl_timestamp.map(|ts| ts.date_naive())
    }
}

/// Text after the leading `["` up to (not including) the first `>`.
///
/// `'["Clothing >> Women >> Dresses"]'` → `"Clothing "`.
pub fn extract_main_category(path: &str) -> Option<String> {
    MAIN_CATEGORY_RE
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// ---------------------------------------------------------------------------
// ProductCatalog – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed catalog with pre-computed option lists for the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCatalog {
    /// All products (rows), in source order.
    pub records: Vec<ProductRecord>,
    /// Sorted distinct brands.
    pub brands: BTreeSet<String>,
    /// Sorted distinct non-null main categories.
    pub categories: BTreeSet<String>,
    /// Rows discarded at load time for missing required fields.
    pub dropped_rows: usize,
}

impl ProductCatalog {
    /// Build the option indices from the loaded records.
    pub fn from_records(records: Vec<ProductRecord>, dropped_rows: usize) -> Self {
        let brands = records.iter().map(|r| r.brand.clone()).collect();
        let categories = records
            .iter()
            .filter_map(|r| r.main_category.clone())
            .collect();
        ProductCatalog {
            records,
            brands,
            categories,
            dropped_rows,
        }
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(retail: f64, discounted: f64, tree: Option<&str>) -> ProductRecord {
        ProductRecord::new(
            Some("id-1".into()),
            Some("Shirt".into()),
            None,
            tree.map(str::to_string),
            retail,
            discounted,
            "Acme".into(),
            None,
            Some(NO_RATING_SENTINEL.into()),
        )
    }

    #[test]
    fn extracts_text_before_first_nesting_marker() {
        assert_eq!(
            extract_main_category(r#"["Clothing >> Women >> Dresses"]"#).as_deref(),
            Some("Clothing ")
        );
    }

    #[test]
    fn category_is_none_without_bracket_quote_prefix() {
        assert_eq!(extract_main_category("Clothing >> Women"), None);
        assert_eq!(extract_main_category(""), None);
    }

    #[test]
    fn single_segment_path_runs_to_end_of_string() {
        assert_eq!(
            extract_main_category(r#"["Books"]"#).as_deref(),
            Some(r#"Books"]"#)
        );
    }

    #[test]
    fn discount_may_be_negative() {
        let r = record(100.0, 120.0, None);
        assert_eq!(r.discount, -20.0);
    }

    #[test]
    fn sentinel_rating_becomes_none() {
        let r = record(10.0, 5.0, Some(r#"["Toys >> Cars"]"#));
        assert_eq!(r.rating, None);
        assert_eq!(r.main_category.as_deref(), Some("Toys "));
    }

    #[test]
    fn catalog_indexes_brands_and_categories() {
        let mut other = record(5.0, 4.0, None);
        other.brand = "Zeta".into();
        let catalog = ProductCatalog::from_records(
            vec![record(10.0, 5.0, Some(r#"["Toys >> Cars"]"#)), other],
            3,
        );
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.dropped_rows, 3);
        assert_eq!(
            catalog.brands.iter().cloned().collect::<Vec<_>>(),
            vec!["Acme", "Zeta"]
        );
        assert_eq!(catalog.categories.len(), 1);
    }
}
