use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotBounds, PlotPoints, Points};

use crate::analysis::charts::ScatterData;
use crate::color::ColorMap;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn no_data(ui: &mut Ui, message: &str) {
    ui.add_space(8.0);
    ui.label(message);
    ui.add_space(8.0);
}

/// Bar chart over categorical labels: bar `i` sits at x = i.
fn categorical_bars(
    ui: &mut Ui,
    id: &str,
    labels: Vec<String>,
    values: Vec<f64>,
    y_label: &str,
    color: Color32,
) {
    let bars: Vec<Bar> = labels
        .iter()
        .zip(&values)
        .enumerate()
        .map(|(i, (label, &v))| Bar::new(i as f64, v).name(label).width(0.7))
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(y_label)
        .allow_drag(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color));
        });
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

/// Products crawled per day.
pub fn timeline_chart(ui: &mut Ui, timeline: &[(NaiveDate, usize)]) {
    if timeline.is_empty() {
        no_data(ui, "No crawl timestamps in the current selection.");
        return;
    }
    let points: PlotPoints = timeline
        .iter()
        .map(|(date, n)| [date.num_days_from_ce() as f64, *n as f64])
        .collect();

    Plot::new("timeline")
        .height(CHART_HEIGHT)
        .y_axis_label("Products")
        .x_axis_formatter(|mark, _range| {
            NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("crawl_timestamp")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
        });
}

pub fn rating_chart(ui: &mut Ui, ratings: &[(String, usize)]) {
    if ratings.is_empty() {
        no_data(ui, "No valid product ratings available.");
        return;
    }
    let (labels, counts): (Vec<String>, Vec<f64>) =
        ratings.iter().map(|(r, n)| (r.clone(), *n as f64)).unzip();
    categorical_bars(ui, "ratings", labels, counts, "Count", Color32::GOLD);
}

pub fn category_discount_chart(ui: &mut Ui, means: &[(String, f64)]) {
    if means.is_empty() {
        no_data(ui, "No categorised products in the current selection.");
        return;
    }
    let (labels, values): (Vec<String>, Vec<f64>) =
        means.iter().map(|(c, d)| (c.clone(), *d)).unzip();
    categorical_bars(
        ui,
        "category_discount",
        labels,
        values,
        "Mean Discount",
        Color32::LIGHT_RED,
    );
}

pub fn top_brands_chart(ui: &mut Ui, brands: &[(String, usize)]) {
    if brands.is_empty() {
        no_data(ui, "No products in the current selection.");
        return;
    }
    let (labels, counts): (Vec<String>, Vec<f64>) =
        brands.iter().map(|(b, n)| (b.clone(), *n as f64)).unzip();
    categorical_bars(ui, "top_brands", labels, counts, "Products", Color32::LIGHT_GREEN);
}

/// Price vs. discount, one series per main category. The view is pinned to
/// the clip limits and only points inside it are drawn.
pub fn scatter_chart(ui: &mut Ui, scatter: &ScatterData, colors: Option<&ColorMap>) {
    if scatter.points.is_empty() {
        no_data(ui, "No products in the current selection.");
        return;
    }

    let mut series: BTreeMap<Option<&str>, Vec<[f64; 2]>> = BTreeMap::new();
    for p in scatter.in_view() {
        series
            .entry(p.category.as_deref())
            .or_default()
            .push([p.price, p.discount]);
    }

    let x_max = positive_or(scatter.x_limit, 1.0);
    let y_max = positive_or(scatter.y_limit, 1.0);

    Plot::new("price_vs_discount")
        .height(CHART_HEIGHT * 1.4)
        .legend(Legend::default())
        .x_axis_label("retail_price")
        .y_axis_label("Discount")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for (category, pts) in series {
                let color = colors
                    .map(|cm| cm.color_for(category))
                    .unwrap_or(Color32::LIGHT_BLUE);
                let points: PlotPoints = pts.into_iter().collect();
                plot_ui.points(
                    Points::new(points)
                        .name(category.unwrap_or("(uncategorised)"))
                        .color(color.gamma_multiply(0.6))
                        .radius(2.5),
                );
            }
            plot_ui.set_plot_bounds(PlotBounds::from_min_max([0.0, 0.0], [x_max, y_max]));
        });
}

fn positive_or(limit: f64, fallback: f64) -> f64 {
    if limit.is_finite() && limit > 0.0 {
        limit
    } else {
        fallback
    }
}
