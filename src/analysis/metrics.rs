use crate::data::model::ProductRecord;

/// Headline numbers for the metric tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub count: usize,
    /// Mean retail price; NaN when there are no rows.
    pub mean_price: f64,
    /// Mean discount; NaN when there are no rows.
    pub mean_discount: f64,
}

pub fn compute<'a>(rows: impl IntoIterator<Item = &'a ProductRecord>) -> Metrics {
    let (count, price_sum, discount_sum) = rows
        .into_iter()
        .fold((0usize, 0.0, 0.0), |(n, p, d), r| {
            (n + 1, p + r.retail_price, d + r.discount)
        });
    Metrics {
        count,
        mean_price: mean(price_sum, count),
        mean_discount: mean(discount_sum, count),
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
