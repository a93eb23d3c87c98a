use std::path::PathBuf;

/// Fixed dashboard settings. There are no CLI flags or env overrides.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Catalog opened at start-up when present in the working directory.
    pub bundled_path: PathBuf,
    /// Length of the top-brands chart and the top-discounts table.
    pub top_n: usize,
    /// Quantile at which the scatter-plot axes are clipped.
    pub clip_quantile: f64,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bundled_path: PathBuf::from("flipkart_com-ecommerce_sample.csv"),
            top_n: 10,
            clip_quantile: 0.95,
            window_size: [1400.0, 900.0],
            min_window_size: [800.0, 500.0],
        }
    }
}
