use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::analysis::charts::TopDiscountRow;
use crate::analysis::{evaluate, DashboardView};
use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::CatalogCache;
use crate::data::filter::{category_options, BrandSelection, ProductFilter};
use crate::data::loader::CatalogSchema;
use crate::data::model::ProductCatalog;

// ---------------------------------------------------------------------------
// Top-discount table ordering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableColumn {
    Name,
    Brand,
    RetailPrice,
    DiscountedPrice,
    Discount,
}

impl TableColumn {
    pub const ALL: [TableColumn; 5] = [
        TableColumn::Name,
        TableColumn::Brand,
        TableColumn::RetailPrice,
        TableColumn::DiscountedPrice,
        TableColumn::Discount,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TableColumn::Name => "product_name",
            TableColumn::Brand => "brand",
            TableColumn::RetailPrice => "retail_price",
            TableColumn::DiscountedPrice => "discounted_price",
            TableColumn::Discount => "Discount",
        }
    }

    fn compare(self, a: &TopDiscountRow, b: &TopDiscountRow) -> Ordering {
        let num = |x: f64, y: f64| x.partial_cmp(&y).unwrap_or(Ordering::Equal);
        match self {
            TableColumn::Name => a.name.cmp(&b.name),
            TableColumn::Brand => a.brand.cmp(&b.brand),
            TableColumn::RetailPrice => num(a.retail_price, b.retail_price),
            TableColumn::DiscountedPrice => num(a.discounted_price, b.discounted_price),
            TableColumn::Discount => num(a.discount, b.discount),
        }
    }
}

/// Display order of the top-discount rows. Only reorders what is shown;
/// which rows make the table is decided by discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSort {
    pub column: TableColumn,
    pub descending: bool,
}

impl Default for TableSort {
    fn default() -> Self {
        Self {
            column: TableColumn::Discount,
            descending: true,
        }
    }
}

impl TableSort {
    /// Clicking the active column flips direction; another column sorts descending.
    pub fn click(&mut self, column: TableColumn) {
        if self.column == column {
            self.descending = !self.descending;
        } else {
            self.column = column;
            self.descending = true;
        }
    }

    pub fn apply<'a>(&self, rows: &'a [TopDiscountRow]) -> Vec<&'a TopDiscountRow> {
        let mut out: Vec<&TopDiscountRow> = rows.iter().collect();
        out.sort_by(|a, b| {
            let ord = self.column.compare(a, b);
            if self.descending {
                ord.reverse()
            } else {
                ord
            }
        });
        out
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Parsed catalogs by source identity.
    cache: CatalogCache,

    /// Loaded catalog (None until a file is loaded).
    pub catalog: Option<Arc<ProductCatalog>>,

    /// Where `catalog` came from.
    pub source: Option<PathBuf>,

    /// Active brand / category / search predicates.
    pub filter: ProductFilter,

    /// Metrics and chart series for the current filter (cached).
    pub view: Option<DashboardView>,

    /// Scatter-plot hue per main category.
    pub color_map: Option<ColorMap>,

    pub table_sort: TableSort,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: CatalogCache::new(),
            catalog: None,
            source: None,
            filter: ProductFilter::default(),
            view: None,
            color_map: None,
            table_sort: TableSort::default(),
            status_message: None,
        }
    }

    /// Open the bundled catalog if it sits next to the binary's working dir.
    pub fn load_bundled(&mut self) {
        let path = self.config.bundled_path.clone();
        if !path.exists() {
            log::warn!("bundled catalog {} not found; waiting for upload", path.display());
            return;
        }
        self.load_or_report(&path, CatalogSchema::Full);
    }

    /// Load `path`, recording any failure in `status_message`.
    pub fn load_or_report(&mut self, path: &Path, schema: CatalogSchema) {
        if let Err(e) = self.open_source(path, schema) {
            log::error!("Failed to load file: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    pub fn open_source(&mut self, path: &Path, schema: CatalogSchema) -> Result<()> {
        let catalog = self
            .cache
            .get_or_load(path, schema)
            .with_context(|| format!("loading {}", path.display()))?;
        log::info!(
            "Loaded {} products, {} brands, {} categories from {}",
            catalog.len(),
            catalog.brands.len(),
            catalog.categories.len(),
            path.display()
        );
        self.set_catalog(catalog, path.to_path_buf());
        Ok(())
    }

    /// Ingest a newly loaded catalog, reset filters and colours.
    pub fn set_catalog(&mut self, catalog: Arc<ProductCatalog>, source: PathBuf) {
        self.color_map = Some(ColorMap::new(&catalog.categories));
        self.filter = ProductFilter::default();
        self.catalog = Some(catalog);
        self.source = Some(source);
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the dashboard after a filter or catalog change.
    pub fn refresh(&mut self) {
        self.view = self
            .catalog
            .as_deref()
            .map(|c| evaluate(c, &self.filter, &self.config));
    }

    /// Changing brand resets the category selection to "all".
    pub fn set_brand(&mut self, brand: BrandSelection) {
        if self.filter.brand == brand {
            return;
        }
        self.filter.brand = brand;
        self.filter.categories = None;
        self.refresh();
    }

    pub fn set_search(&mut self, search: String) {
        if self.filter.search == search {
            return;
        }
        self.filter.search = search;
        self.refresh();
    }

    /// Category choices for the current brand.
    pub fn category_choices(&self) -> Vec<String> {
        self.catalog
            .as_deref()
            .map(|c| category_options(c, &self.filter.brand))
            .unwrap_or_default()
    }

    pub fn is_category_selected(&self, category: &str) -> bool {
        self.filter
            .categories
            .as_ref()
            .map_or(true, |set| set.contains(category))
    }

    /// Toggle one category. The first toggle materialises "all" as an explicit set.
    pub fn toggle_category(&mut self, category: &str) {
        let choices = self.category_choices();
        let selected = self
            .filter
            .categories
            .get_or_insert_with(|| choices.into_iter().collect());
        if !selected.remove(category) {
            selected.insert(category.to_string());
        }
        self.refresh();
    }

    pub fn select_all_categories(&mut self) {
        self.filter.categories = None;
        self.refresh();
    }

    pub fn select_no_categories(&mut self) {
        self.filter.categories = Some(BTreeSet::new());
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ProductRecord;

    fn state_with_catalog() -> AppState {
        let record = |name: &str, brand: &str, tree: &str, retail: f64| {
            ProductRecord::new(
                None,
                Some(name.to_string()),
                None,
                Some(tree.to_string()),
                retail,
                retail / 2.0,
                brand.to_string(),
                None,
                None,
            )
        };
        let catalog = ProductCatalog::from_records(
            vec![
                record("Kurta", "Biba", r#"["Clothing >> Women"]"#, 1000.0),
                record("Mug", "Prestige", r#"["Kitchen >> Mugs"]"#, 300.0),
                record("Cooker", "Prestige", r#"["Kitchen >> Cookers"]"#, 2000.0),
                record("Apron", "Prestige", r#"["Clothing >> Aprons"]"#, 150.0),
            ],
            0,
        );
        let mut state = AppState::new(DashboardConfig::default());
        state.set_catalog(Arc::new(catalog), PathBuf::from("memory.csv"));
        state
    }

    fn visible(state: &AppState) -> Vec<usize> {
        state.view.as_ref().unwrap().visible.clone()
    }

    #[test]
    fn new_catalog_shows_everything() {
        let state = state_with_catalog();
        assert_eq!(visible(&state), vec![0, 1, 2, 3]);
        assert!(state.is_category_selected("Kitchen "));
    }

    #[test]
    fn toggling_a_category_narrows_the_view() {
        let mut state = state_with_catalog();
        state.toggle_category("Clothing ");
        assert_eq!(visible(&state), vec![1, 2]);
        assert!(!state.is_category_selected("Clothing "));
        state.toggle_category("Clothing ");
        assert_eq!(visible(&state), vec![0, 1, 2, 3]);
    }

    #[test]
    fn toggling_back_restores_the_start_up_view() {
        let mut state = state_with_catalog();
        let uncategorised = ProductRecord::new(
            None,
            Some("Loose".into()),
            None,
            Some("Clothing >> Loose".into()),
            5000.0,
            4000.0,
            "Biba".into(),
            None,
            None,
        );
        let mut records = state.catalog.as_ref().unwrap().records.clone();
        records.push(uncategorised);
        state.set_catalog(
            Arc::new(ProductCatalog::from_records(records, 0)),
            PathBuf::from("memory.csv"),
        );

        let start = visible(&state);
        assert_eq!(start, vec![0, 1, 2, 3]);
        state.toggle_category("Kitchen ");
        state.toggle_category("Kitchen ");
        assert_eq!(visible(&state), start);
        state.select_all_categories();
        assert_eq!(visible(&state), start);
    }

    #[test]
    fn brand_change_resets_categories() {
        let mut state = state_with_catalog();
        state.select_no_categories();
        assert!(visible(&state).is_empty());
        state.set_brand(BrandSelection::Brand("Prestige".into()));
        assert_eq!(visible(&state), vec![1, 2, 3]);
        assert_eq!(state.category_choices(), vec!["Clothing ", "Kitchen "]);
    }

    #[test]
    fn search_refreshes_view() {
        let mut state = state_with_catalog();
        state.set_search("MUG".into());
        assert_eq!(visible(&state), vec![1]);
        state.set_search(String::new());
        assert_eq!(visible(&state).len(), 4);
    }

    #[test]
    fn missing_file_is_reported_not_loaded() {
        let mut state = AppState::new(DashboardConfig::default());
        state.load_or_report(Path::new("/no/such/catalog.csv"), CatalogSchema::Minimal);
        assert!(state.catalog.is_none());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
    }

    #[test]
    fn table_sort_reorders_rows() {
        let row = |name: &str, discount: f64| TopDiscountRow {
            name: Some(name.to_string()),
            brand: "Acme".into(),
            retail_price: 100.0,
            discounted_price: 100.0 - discount,
            discount,
        };
        let rows = vec![row("b", 30.0), row("a", 10.0), row("c", 20.0)];

        let mut sort = TableSort::default();
        let names = |s: &TableSort| {
            s.apply(&rows)
                .iter()
                .map(|r| r.name.clone().unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&sort), vec!["b", "c", "a"]);

        sort.click(TableColumn::Discount);
        assert_eq!(names(&sort), vec!["a", "c", "b"]);

        sort.click(TableColumn::Name);
        assert!(sort.descending);
        assert_eq!(names(&sort), vec!["c", "b", "a"]);
    }
}
