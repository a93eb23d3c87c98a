use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::analysis::charts::TopDiscountRow;
use crate::state::{TableColumn, TableSort};

const ROW_HEIGHT: f32 = 20.0;

/// Top-discount table. Header clicks change `sort`, taking effect next frame.
pub fn top_discounts_table(ui: &mut Ui, rows: &[TopDiscountRow], sort: &mut TableSort) {
    if rows.is_empty() {
        ui.label("No products in the current selection.");
        return;
    }

    let ordered = sort.apply(rows);
    let current = *sort;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(false)
        .column(Column::remainder().at_least(200.0))
        .columns(Column::auto().at_least(90.0), 4)
        .header(ROW_HEIGHT, |mut header| {
            for column in TableColumn::ALL {
                header.col(|ui| {
                    let arrow = match (current.column == column, current.descending) {
                        (true, true) => " ⏷",
                        (true, false) => " ⏶",
                        (false, _) => "",
                    };
                    if ui.button(format!("{}{arrow}", column.label())).clicked() {
                        sort.click(column);
                    }
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, ordered.len(), |mut row| {
                let r = ordered[row.index()];
                row.col(|ui| {
                    ui.label(r.name.as_deref().unwrap_or(""));
                });
                row.col(|ui| {
                    ui.label(&r.brand);
                });
                row.col(|ui| {
                    ui.monospace(format!("{:.2}", r.retail_price));
                });
                row.col(|ui| {
                    ui.monospace(format!("{:.2}", r.discounted_price));
                });
                row.col(|ui| {
                    ui.monospace(format!("{:.2}", r.discount));
                });
            });
        });
}
