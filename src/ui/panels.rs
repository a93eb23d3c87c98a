use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::analysis::metrics::Metrics;
use crate::data::filter::{brand_options, BrandSelection};
use crate::data::loader::CatalogSchema;
use crate::state::AppState;

const ALL_BRANDS: &str = "All Brands";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filter Products");
    ui.separator();

    let Some(catalog) = state.catalog.clone() else {
        ui.label("No catalog loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Brand selector ----
            ui.strong("Select Brand");
            let current = match &state.filter.brand {
                BrandSelection::All => ALL_BRANDS.to_string(),
                BrandSelection::Brand(b) => b.clone(),
            };
            let mut picked: Option<BrandSelection> = None;
            egui::ComboBox::from_id_salt("brand")
                .selected_text(&current)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.filter.brand == BrandSelection::All, ALL_BRANDS)
                        .clicked()
                    {
                        picked = Some(BrandSelection::All);
                    }
                    for brand in brand_options(&catalog) {
                        let selected = current == brand;
                        if ui.selectable_label(selected, &brand).clicked() {
                            picked = Some(BrandSelection::Brand(brand));
                        }
                    }
                });
            if let Some(brand) = picked {
                state.set_brand(brand);
            }
            ui.separator();

            // ---- Category multiselect ----
            let choices = state.category_choices();
            let n_selected = choices
                .iter()
                .filter(|c| state.is_category_selected(c))
                .count();
            let header_text = format!("Select Categories  ({n_selected}/{})", choices.len());

            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("categories")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_categories();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_categories();
                        }
                    });

                    if choices.is_empty() {
                        ui.weak("No categories in this selection.");
                    }
                    for category in &choices {
                        let mut checked = state.is_category_selected(category);
                        if ui.checkbox(&mut checked, category.as_str()).changed() {
                            state.toggle_category(category);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(catalog), Some(view)) = (&state.catalog, &state.view) {
            ui.label(format!(
                "{} products loaded, {} visible",
                catalog.len(),
                view.visible.len()
            ));
            if catalog.dropped_rows > 0 {
                ui.weak(format!("({} incomplete rows dropped)", catalog.dropped_rows));
            }
        }

        if let Some(source) = &state.source {
            ui.separator();
            ui.weak(source.display().to_string());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Search box and metric tiles (top of the central panel)
// ---------------------------------------------------------------------------

pub fn search_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("🔎 Search Product Name");
        let mut text = state.filter.search.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut text)
                .hint_text("e.g. shirt")
                .desired_width(320.0),
        );
        if response.changed() {
            state.set_search(text);
        }
    });
}

pub fn metric_tiles(ui: &mut Ui, metrics: &Metrics) {
    ui.horizontal(|ui: &mut Ui| {
        tile(ui, "📦 Total Products", metrics.count.to_string());
        tile(ui, "💲 Average Retail Price", format!("₹{:.2}", metrics.mean_price));
        tile(ui, "🧾 Average Discount", format!("₹{:.2}", metrics.mean_discount));
    });
}

fn tile(ui: &mut Ui, title: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(180.0);
        ui.vertical(|ui: &mut Ui| {
            ui.label(title);
            ui.heading(value);
        });
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open product catalog")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_or_report(&path, CatalogSchema::Minimal);
    }
}
