use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Category hue: main category → Color32
// ---------------------------------------------------------------------------

/// Maps each main category to a distinct colour for the scatter plot.
/// Products without a category use the default colour.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(categories: &BTreeSet<String>) -> Self {
        let palette = generate_palette(categories.len());
        ColorMap {
            mapping: categories.iter().cloned().zip(palette).collect(),
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, category: Option<&str>) -> Color32 {
        category
            .and_then(|c| self.mapping.get(c))
            .copied()
            .unwrap_or(self.default_color)
    }
}
