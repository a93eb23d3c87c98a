//! Read-only aggregations over the filtered catalog.
//!
//! [`evaluate`] is the whole pipeline: filter, then every metric and chart
//! series the dashboard draws. It keeps no state; the UI decides when to
//! call it again.

pub mod charts;
pub mod metrics;

use chrono::NaiveDate;

use crate::config::DashboardConfig;
use crate::data::filter::{filtered_indices, ProductFilter};
use crate::data::model::{ProductCatalog, ProductRecord};

use charts::{ScatterData, TopDiscountRow};
use metrics::Metrics;

/// Everything the central panel renders for one filter state.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Indices into the catalog of the filtered set.
    pub visible: Vec<usize>,
    pub metrics: Metrics,
    pub timeline: Vec<(NaiveDate, usize)>,
    pub ratings: Vec<(String, usize)>,
    pub category_discounts: Vec<(String, f64)>,
    pub scatter: ScatterData,
    pub top_brands: Vec<(String, usize)>,
    pub top_discounts: Vec<TopDiscountRow>,
}

pub fn evaluate(
    catalog: &ProductCatalog,
    filter: &ProductFilter,
    config: &DashboardConfig,
) -> DashboardView {
    let visible = filtered_indices(catalog, filter);
    let rows: Vec<&ProductRecord> = visible.iter().map(|&i| &catalog.records[i]).collect();
    log::debug!("evaluating dashboard over {} of {} products", rows.len(), catalog.len());

    DashboardView {
        metrics: metrics::compute(rows.iter().copied()),
        timeline: charts::timeline(&rows),
        ratings: charts::rating_distribution(&rows),
        category_discounts: charts::discount_by_category(&rows),
        scatter: charts::price_discount_scatter(&rows, config.clip_quantile),
        top_brands: charts::top_brands(&rows, config.top_n),
        top_discounts: charts::top_discounts(&rows, config.top_n),
        visible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::BrandSelection;
    use crate::data::loader::{load_csv_reader, CatalogSchema};

    const CSV: &str = "\
uniq_id,crawl_timestamp,product_name,product_category_tree,retail_price,discounted_price,product_rating,brand
1,2016-03-25 10:00:00 +0000,Cotton Kurta,\"[\"\"Clothing >> Women\"\"]\",1000,600,4,Biba
2,2016-03-25 11:00:00 +0000,Silk Saree,\"[\"\"Clothing >> Women\"\"]\",3000,2000,No rating available,Biba
3,2016-03-26 09:00:00 +0000,Steel Mug,\"[\"\"Kitchen >> Mugs\"\"]\",300,250,5,Prestige
4,,Pressure Cooker,\"[\"\"Kitchen >> Cookers\"\"]\",2000,1500,5,Prestige
";

    fn catalog() -> ProductCatalog {
        load_csv_reader(CSV.as_bytes(), CatalogSchema::Full).unwrap()
    }

    #[test]
    fn unfiltered_view_covers_every_product() {
        let c = catalog();
        let view = evaluate(&c, &ProductFilter::default(), &DashboardConfig::default());
        assert_eq!(view.metrics.count, 4);
        assert_eq!(view.metrics.mean_price, 1575.0);
        assert_eq!(view.metrics.mean_discount, 487.5);
        assert_eq!(view.timeline.len(), 2);
        assert_eq!(view.ratings[0], ("5".to_string(), 2));
        assert_eq!(
            view.category_discounts,
            vec![("Clothing ".to_string(), 700.0), ("Kitchen ".to_string(), 275.0)]
        );
        assert_eq!(view.top_discounts[0].discount, 1000.0);
        assert_eq!(view.scatter.points.len(), 4);
    }

    #[test]
    fn rows_with_unmatched_category_path_are_hidden_by_default() {
        let csv = "\
uniq_id,crawl_timestamp,product_name,product_category_tree,retail_price,discounted_price,product_rating,brand
1,,Kurta,\"[\"\"Clothing >> Women\"\"]\",1000,600,4,Biba
2,,Loose Kurta,Clothing >> Loose,5000,4000,4,Biba
";
        let c = load_csv_reader(csv.as_bytes(), CatalogSchema::Full).unwrap();
        assert_eq!(c.len(), 2);
        let view = evaluate(&c, &ProductFilter::default(), &DashboardConfig::default());
        assert_eq!(view.metrics.count, 1);
        assert_eq!(view.metrics.mean_price, 1000.0);
        assert_eq!(view.scatter.points.len(), 1);
    }

    #[test]
    fn brand_view_only_counts_that_brand() {
        let c = catalog();
        let filter = ProductFilter {
            brand: BrandSelection::Brand("Prestige".into()),
            ..Default::default()
        };
        let view = evaluate(&c, &filter, &DashboardConfig::default());
        assert_eq!(view.visible, vec![2, 3]);
        assert_eq!(view.top_brands, vec![("Prestige".to_string(), 2)]);
        assert!(view.top_discounts.iter().all(|r| r.brand == "Prestige"));
    }

    #[test]
    fn empty_filtered_set_degrades_gracefully() {
        let c = catalog();
        let filter = ProductFilter {
            search: "no such product".into(),
            ..Default::default()
        };
        let view = evaluate(&c, &filter, &DashboardConfig::default());
        assert_eq!(view.metrics.count, 0);
        assert!(view.metrics.mean_price.is_nan());
        assert!(view.timeline.is_empty());
        assert!(view.ratings.is_empty());
        assert!(view.category_discounts.is_empty());
        assert!(view.top_brands.is_empty());
        assert!(view.top_discounts.is_empty());
    }
}
