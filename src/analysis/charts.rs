use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::data::model::ProductRecord;

// ---------------------------------------------------------------------------
// Frequency helpers
// ---------------------------------------------------------------------------

/// Count occurrences keeping first-appearance order, then order by
/// descending count (stable, so ties keep first-appearance order).
fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for v in values {
        match slots.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slots.insert(v, counts.len());
                counts.push((v.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Linear-interpolation quantile (`q` in `[0, 1]`). NaN for no values.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Chart aggregations
// ---------------------------------------------------------------------------

/// Products per crawl date, chronological. Rows without a timestamp are skipped.
pub fn timeline(rows: &[&ProductRecord]) -> Vec<(NaiveDate, usize)> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in rows.iter().filter_map(|r| r.crawl_date()) {
        *per_day.entry(date).or_default() += 1;
    }
    per_day.into_iter().collect()
}

/// Frequency per rating value, most frequent first.
pub fn rating_distribution(rows: &[&ProductRecord]) -> Vec<(String, usize)> {
    value_counts(rows.iter().filter_map(|r| r.rating.as_deref()))
}

/// Mean discount per main category, in first-encountered order.
pub fn discount_by_category(rows: &[&ProductRecord]) -> Vec<(String, f64)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(&str, f64, usize)> = Vec::new();
    for r in rows {
        let Some(cat) = r.main_category.as_deref() else {
            continue;
        };
        match slots.get(cat) {
            Some(&i) => {
                sums[i].1 += r.discount;
                sums[i].2 += 1;
            }
            None => {
                slots.insert(cat, sums.len());
                sums.push((cat, r.discount, 1));
            }
        }
    }
    sums.into_iter()
        .map(|(cat, sum, n)| (cat.to_string(), sum / n as f64))
        .collect()
}

/// Most frequent brands, at most `n`.
pub fn top_brands(rows: &[&ProductRecord], n: usize) -> Vec<(String, usize)> {
    let mut counts = value_counts(rows.iter().map(|r| r.brand.as_str()));
    counts.truncate(n);
    counts
}

// ---------------------------------------------------------------------------
// Price vs. discount scatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub price: f64,
    pub discount: f64,
    pub category: Option<String>,
}

/// Every filtered row as a point, plus the axis limits that keep outliers
/// out of view.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterData {
    pub points: Vec<ScatterPoint>,
    /// Upper bound of the price axis (NaN when there are no points).
    pub x_limit: f64,
    /// Upper bound of the discount axis (NaN when there are no points).
    pub y_limit: f64,
}

impl ScatterData {
    /// Points visible inside `[0, x_limit] × [0, y_limit]`.
    pub fn in_view(&self) -> impl Iterator<Item = &ScatterPoint> + '_ {
        self.points.iter().filter(move |p| {
            (0.0..=self.x_limit).contains(&p.price) && (0.0..=self.y_limit).contains(&p.discount)
        })
    }
}

pub fn price_discount_scatter(rows: &[&ProductRecord], clip_quantile: f64) -> ScatterData {
    let prices: Vec<f64> = rows.iter().map(|r| r.retail_price).collect();
    let discounts: Vec<f64> = rows.iter().map(|r| r.discount).collect();
    ScatterData {
        points: rows
            .iter()
            .map(|r| ScatterPoint {
                price: r.retail_price,
                discount: r.discount,
                category: r.main_category.clone(),
            })
            .collect(),
        x_limit: quantile(&prices, clip_quantile),
        y_limit: quantile(&discounts, clip_quantile),
    }
}

// ---------------------------------------------------------------------------
// Top discounts table
// ---------------------------------------------------------------------------

/// Projection of a product shown in the top-discounts table.
#[derive(Debug, Clone, PartialEq)]
pub struct TopDiscountRow {
    pub name: Option<String>,
    pub brand: String,
    pub retail_price: f64,
    pub discounted_price: f64,
    pub discount: f64,
}

/// The `n` rows with the largest discount, largest first.
pub fn top_discounts(rows: &[&ProductRecord], n: usize) -> Vec<TopDiscountRow> {
    let mut sorted: Vec<&ProductRecord> = rows.to_vec();
    sorted.sort_by(|a, b| b.discount.partial_cmp(&a.discount).unwrap_or(Ordering::Equal));
    sorted
        .into_iter()
        .take(n)
        .map(|r| TopDiscountRow {
            name: r.name.clone(),
            brand: r.brand.clone(),
            retail_price: r.retail_price,
            discounted_price: r.discounted_price,
            discount: r.discount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_timestamp;

    fn product(
        brand: &str,
        retail: f64,
        discounted: f64,
        tree: Option<&str>,
        stamp: Option<&str>,
        rating: Option<&str>,
    ) -> ProductRecord {
        ProductRecord::new(
            None,
            Some(format!("{brand} item")),
            None,
            tree.map(str::to_string),
            retail,
            discounted,
            brand.to_string(),
            stamp.and_then(parse_timestamp),
            rating.map(str::to_string),
        )
    }

    #[test]
    fn timeline_groups_by_day_in_order() {
        let rows = [
            product("A", 1.0, 1.0, None, Some("2016-03-26 10:00:00 +0000"), None),
            product("A", 1.0, 1.0, None, Some("2016-03-25 22:00:00 +0000"), None),
            product("A", 1.0, 1.0, None, Some("2016-03-26 23:59:59 +0000"), None),
            product("A", 1.0, 1.0, None, None, None),
        ];
        let refs: Vec<&ProductRecord> = rows.iter().collect();
        let t = timeline(&refs);
        let d = |day| NaiveDate::from_ymd_opt(2016, 3, day).unwrap();
        assert_eq!(t, vec![(d(25), 1), (d(26), 2)]);
    }

    #[test]
    fn ratings_ordered_by_frequency() {
        let rows = [
            product("A", 1.0, 1.0, None, None, Some("4")),
            product("A", 1.0, 1.0, None, None, Some("5")),
            product("A", 1.0, 1.0, None, None, Some("No rating available")),
            product("A", 1.0, 1.0, None, None, Some("5")),
            product("A", 1.0, 1.0, None, None, Some("3")),
        ];
        let refs: Vec<&ProductRecord> = rows.iter().collect();
        assert_eq!(
            rating_distribution(&refs),
            vec![("5".to_string(), 2), ("4".to_string(), 1), ("3".to_string(), 1)]
        );
    }

    #[test]
    fn category_means_in_encounter_order() {
        let rows = [
            product("A", 100.0, 50.0, Some(r#"["Toys >> Cars"]"#), None, None),
            product("A", 100.0, 90.0, Some(r#"["Books >> Fiction"]"#), None, None),
            product("A", 100.0, 70.0, Some(r#"["Toys >> Dolls"]"#), None, None),
            product("A", 100.0, 0.0, None, None, None),
        ];
        let refs: Vec<&ProductRecord> = rows.iter().collect();
        assert_eq!(
            discount_by_category(&refs),
            vec![("Toys ".to_string(), 40.0), ("Books ".to_string(), 10.0)]
        );
    }

    #[test]
    fn top_brands_truncates_to_n() {
        let rows: Vec<ProductRecord> = (0..15)
            .map(|i| product(&format!("B{}", i % 12), 1.0, 1.0, None, None, None))
            .collect();
        let refs: Vec<&ProductRecord> = rows.iter().collect();
        let top = top_brands(&refs, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0], ("B0".to_string(), 2));
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn top_discounts_sorted_descending_and_capped() {
        let rows: Vec<ProductRecord> = (0..25)
            .map(|i| product("A", 100.0 + i as f64, 100.0 - (i * 7 % 11) as f64, None, None, None))
            .collect();
        let refs: Vec<&ProductRecord> = rows.iter().collect();
        let top = top_discounts(&refs, 10);
        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].discount >= w[1].discount));
        let max = rows.iter().map(|r| r.discount).fold(f64::MIN, f64::max);
        assert_eq!(top[0].discount, max);
    }

    #[test]
    fn top_discounts_on_short_input() {
        let rows = [product("A", 10.0, 5.0, None, None, None)];
        let refs: Vec<&ProductRecord> = rows.iter().collect();
        assert_eq!(top_discounts(&refs, 10).len(), 1);
        assert!(top_discounts(&[], 10).is_empty());
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&values, 0.5), 3.0);
        assert!((quantile(&values, 0.95) - 4.8).abs() < 1e-12);
        assert_eq!(quantile(&[7.0], 0.95), 7.0);
        assert!(quantile(&[], 0.95).is_nan());
    }

    #[test]
    fn scatter_keeps_all_points_but_clips_view() {
        let mut rows: Vec<ProductRecord> = (1..=20)
            .map(|i| product("A", i as f64 * 10.0, i as f64 * 8.0, None, None, None))
            .collect();
        rows.push(product("A", 100_000.0, 1_000.0, None, None, None));
        let refs: Vec<&ProductRecord> = rows.iter().collect();

        let scatter = price_discount_scatter(&refs, 0.95);
        assert_eq!(scatter.points.len(), rows.len());
        assert!(scatter.x_limit < 100_000.0);
        let visible: Vec<_> = scatter.in_view().collect();
        assert!(!visible.is_empty());
        assert!(visible
            .iter()
            .all(|p| p.price <= scatter.x_limit && p.discount <= scatter.y_limit));
    }

    #[test]
    fn scatter_on_empty_input_has_no_view() {
        let scatter = price_discount_scatter(&[], 0.95);
        assert!(scatter.points.is_empty());
        assert!(scatter.x_limit.is_nan());
        assert_eq!(scatter.in_view().count(), 0);
    }
}
