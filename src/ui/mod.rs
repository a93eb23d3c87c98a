pub mod panels;
pub mod plot;
pub mod table;

use eframe::egui::{ScrollArea, Ui};

use crate::state::AppState;

/// Central panel: search, metric tiles, charts, then the top-discount table.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let Some(catalog) = state.catalog.as_deref() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("📂 Upload a CSV file to begin  (File → Open…)");
        });
        return;
    };
    if catalog.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(format!(
                "No complete product rows in this file ({} dropped)",
                catalog.dropped_rows
            ));
        });
        return;
    }

    ui.heading("🛍️ E-Commerce Product Dashboard");
    panels::search_bar(ui, state);
    ui.separator();

    let AppState {
        view,
        color_map,
        table_sort,
        ..
    } = state;
    let Some(view) = view.as_ref() else {
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            panels::metric_tiles(ui, &view.metrics);
            ui.add_space(8.0);

            ui.columns(2, |cols| {
                cols[0].strong("🕒 Product Crawl Timeline");
                plot::timeline_chart(&mut cols[0], &view.timeline);
                cols[1].strong("⭐ Product Rating Distribution");
                plot::rating_chart(&mut cols[1], &view.ratings);
            });
            ui.separator();

            ui.columns(2, |cols| {
                cols[0].strong("📉 Average Discount by Category");
                plot::category_discount_chart(&mut cols[0], &view.category_discounts);
                cols[1].strong("🏷️ Top Brands by Product Count");
                plot::top_brands_chart(&mut cols[1], &view.top_brands);
            });
            ui.separator();

            ui.strong("📌 Price vs Discount Scatter Plot");
            plot::scatter_chart(ui, &view.scatter, color_map.as_ref());
            ui.separator();

            ui.strong("🔥 Highest Discount Products");
            table::top_discounts_table(ui, &view.top_discounts, table_sort);
        });
}
