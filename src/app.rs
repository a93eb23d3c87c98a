use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{self, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CatalogDashApp {
    pub state: AppState,
}

impl CatalogDashApp {
    /// Start with the bundled catalog when it is present.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.load_bundled();
        Self { state }
    }
}

impl eframe::App for CatalogDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui::dashboard(ui, &mut self.state);
        });
    }
}
