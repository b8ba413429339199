use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use rusty_slope::data::CellValue;

/// Sky blue, the precipitation series colour.
pub const PRECIPITATION_COLOR: Color32 = Color32::from_rgb(135, 206, 235);
/// Displacement colour when a figure has a single measurement point.
pub const DISPLACEMENT_COLOR: Color32 = Color32::from_rgb(31, 119, 180);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` distinguishable blues and violets, so displacement lines stay
/// apart from the sky-blue precipitation line.
pub fn displacement_palette(n: usize) -> Vec<Color32> {
    match n {
        0 => Vec::new(),
        1 => vec![DISPLACEMENT_COLOR],
        _ => (0..n)
            .map(|i| {
                let t = i as f32 / (n - 1) as f32;
                let hue = 215.0 + t * 75.0;
                let lightness = if i % 2 == 0 { 0.42 } else { 0.58 };
                let hsl = Hsl::new(hue, 0.8, lightness);
                let rgb: Srgb = hsl.into_color();
                Color32::from_rgb(
                    (rgb.red * 255.0) as u8,
                    (rgb.green * 255.0) as u8,
                    (rgb.blue * 255.0) as u8,
                )
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Point colours: DP_Number → Color32
// ---------------------------------------------------------------------------

/// Maps the measurement points of the current figure to line colours.
#[derive(Debug, Clone, Default)]
pub struct PointColors {
    mapping: BTreeMap<CellValue, Color32>,
}

impl PointColors {
    pub fn new(points: &[CellValue]) -> Self {
        let palette = displacement_palette(points.len());
        PointColors {
            mapping: points.iter().cloned().zip(palette).collect(),
        }
    }

    /// Colour for a point; unknown points (or no `DP_Number` column) use the default blue.
    pub fn color_for(&self, point: &CellValue) -> Color32 {
        self.mapping
            .get(point)
            .copied()
            .unwrap_or(DISPLACEMENT_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_sizes() {
        assert!(displacement_palette(0).is_empty());
        assert_eq!(displacement_palette(1), vec![DISPLACEMENT_COLOR]);

        let many = displacement_palette(6);
        assert_eq!(many.len(), 6);
        assert!(many.iter().all(|c| *c != PRECIPITATION_COLOR));
    }

    #[test]
    fn test_point_colors_fallback() {
        let colors = PointColors::new(&[CellValue::Integer(1), CellValue::Integer(2)]);
        assert_ne!(
            colors.color_for(&CellValue::Integer(1)),
            colors.color_for(&CellValue::Integer(2))
        );
        assert_eq!(colors.color_for(&CellValue::Missing), DISPLACEMENT_COLOR);
    }
}
