use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

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
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Diverging scale for the correlation heatmap
// ---------------------------------------------------------------------------

const NEGATIVE: (f32, f32, f32) = (0.23, 0.30, 0.75);
const NEUTRAL: (f32, f32, f32) = (0.87, 0.87, 0.87);
const POSITIVE: (f32, f32, f32) = (0.71, 0.02, 0.15);

/// Blue → grey → red for `r` in `[-1, 1]`, mixed in linear RGB.
pub fn diverging(r: f64) -> Color32 {
    let t = r.clamp(-1.0, 1.0) as f32;
    let linear = |(red, green, blue): (f32, f32, f32)| -> LinSrgb {
        Srgb::new(red, green, blue).into_linear()
    };
    let (end, amount) = if t < 0.0 {
        (linear(NEGATIVE), -t)
    } else {
        (linear(POSITIVE), t)
    };
    let mixed = linear(NEUTRAL).mix(end, amount);
    to_color32(Srgb::from_linear(mixed))
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a category to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the category's distinct values.
    pub fn new(values: &[String]) -> Self {
        let palette = generate_palette(values.len());
        let mapping = values.iter().cloned().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given category value.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}
