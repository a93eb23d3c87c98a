use std::collections::BTreeSet;

use super::model::{ProductCatalog, ProductRecord};

// ---------------------------------------------------------------------------
// Filter predicate: brand, category set, and name search
// ---------------------------------------------------------------------------

/// Brand dropdown state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BrandSelection {
    #[default]
    All,
    Brand(String),
}

impl BrandSelection {
    pub fn matches(&self, brand: &str) -> bool {
        match self {
            BrandSelection::All => true,
            BrandSelection::Brand(b) => b == brand,
        }
    }
}

/// All active predicates. A row must pass every one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub brand: BrandSelection,
    /// `None` selects every category present, so rows without a main
    /// category are hidden. `Some` restricts to the set; an empty set hides
    /// all. Catalogs with no main categories at all have no category filter.
    pub categories: Option<BTreeSet<String>>,
    /// Case-insensitive substring of the product name. Empty = no constraint.
    pub search: String,
}

impl ProductFilter {
    /// Whether `record` passes every predicate. `needle` is the lowercased
    /// search term, computed once per pass.
    fn accepts(&self, record: &ProductRecord, by_category: bool, needle: Option<&str>) -> bool {
        if !self.brand.matches(&record.brand) {
            return false;
        }
        if by_category {
            match (&record.main_category, &self.categories) {
                (Some(_), None) => {}
                (Some(cat), Some(selected)) if selected.contains(cat) => {}
                _ => return false,
            }
        }
        if let Some(needle) = needle {
            match &record.name {
                Some(name) if name.to_lowercase().contains(needle) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Return indices of products that pass all active filters, in source order.
pub fn filtered_indices(catalog: &ProductCatalog, filter: &ProductFilter) -> Vec<usize> {
    let needle = (!filter.search.is_empty()).then(|| filter.search.to_lowercase());
    let by_category = !catalog.categories.is_empty();
    catalog
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| filter.accepts(r, by_category, needle.as_deref()))
        .map(|(i, _)| i)
        .collect()
}

/// Sorted distinct brands, for the brand dropdown.
pub fn brand_options(catalog: &ProductCatalog) -> Vec<String> {
    catalog.brands.iter().cloned().collect()
}

/// Sorted distinct main categories among rows of the selected brand.
pub fn category_options(catalog: &ProductCatalog, brand: &BrandSelection) -> Vec<String> {
    if *brand == BrandSelection::All {
        return catalog.categories.iter().cloned().collect();
    }
    catalog
        .records
        .iter()
        .filter(|r| brand.matches(&r.brand))
        .filter_map(|r| r.main_category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
