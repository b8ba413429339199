use std::ops::RangeInclusive;

use chrono::DateTime;
use eframe::egui::{RichText, Ui};
use egui_plot::{
    AxisHints, GridMark, HPlacement, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoints,
    Points,
};

use crate::color::PRECIPITATION_COLOR;
use crate::state::AppState;

const SECONDS_PER_DAY: f64 = 86_400.0;

// ---------------------------------------------------------------------------
// Secondary axis mapping
// ---------------------------------------------------------------------------

/// Linear map from precipitation values onto the displacement axis.
///
/// egui_plot has a single y coordinate system, so the right-hand axis is drawn
/// by scaling precipitation into displacement units and labelling the axis
/// through the inverse map.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisScale {
    from_min: f64,
    from_span: f64,
    to_min: f64,
    to_span: f64,
}

impl AxisScale {
    fn new(from: (f64, f64), to: (f64, f64)) -> Self {
        let span = |(lo, hi): (f64, f64)| {
            let s = hi - lo;
            if s.abs() < f64::EPSILON { 1.0 } else { s }
        };
        AxisScale {
            from_min: from.0,
            from_span: span(from),
            to_min: to.0,
            to_span: span(to),
        }
    }

    fn forward(&self, v: f64) -> f64 {
        self.to_min + (v - self.from_min) / self.from_span * self.to_span
    }

    fn inverse(&self, v: f64) -> f64 {
        self.from_min + (v - self.to_min) / self.to_span * self.from_span
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Axis label for an x value in days since the epoch.
fn format_day(x: f64) -> String {
    DateTime::from_timestamp((x * SECONDS_PER_DAY).round() as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Displacement / precipitation chart (central panel)
// ---------------------------------------------------------------------------

/// Render the dual-axis time-series chart for the selected figure.
pub fn figure_plot(ui: &mut Ui, state: &AppState, height: f32) {
    let Some(view) = &state.view else {
        return;
    };

    ui.heading(view.title());
    let series = view.series();
    if series.is_empty() {
        ui.label(RichText::new("Nothing to plot in the selected date range.").italics());
        return;
    }

    let disp_range = min_max(
        series
            .displacement
            .iter()
            .flat_map(|s| s.values.iter().map(|p| p[1])),
    );
    let precip_range = min_max(series.precipitation.iter().map(|p| p[1]));
    let scale = match (precip_range, disp_range) {
        (Some(p), Some(d)) => AxisScale::new(p, d),
        (Some(p), None) => AxisScale::new(p, p),
        _ => AxisScale::new((0.0, 1.0), (0.0, 1.0)),
    };

    let left = AxisHints::new_y().label("Displacement (cm)");
    let right = AxisHints::new_y()
        .label("Precipitation (mm)")
        .placement(HPlacement::Right)
        .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            format!("{:.1}", scale.inverse(mark.value))
        });

    Plot::new("figure_plot")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Date")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| format_day(mark.value))
        .custom_y_axes(vec![left, right])
        .label_formatter(move |name, value| {
            if name.starts_with("Precipitation") {
                format!("{name}\n{}\n{:.2} mm", format_day(value.x), scale.inverse(value.y))
            } else if name.is_empty() {
                format_day(value.x)
            } else {
                format!("{name}\n{}\n{:.2} cm", format_day(value.x), value.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for s in &series.displacement {
                let name = s.label();
                let color = state.point_colors.color_for(&s.point);
                let line_points: PlotPoints = s.values.iter().copied().collect();
                let markers: PlotPoints = s.values.iter().copied().collect();

                plot_ui.line(Line::new(line_points).name(&name).color(color).width(1.5));
                plot_ui.points(
                    Points::new(markers)
                        .name(&name)
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .radius(3.0),
                );
            }

            if !series.precipitation.is_empty() {
                let scaled: Vec<[f64; 2]> = series
                    .precipitation
                    .iter()
                    .map(|p| [p[0], scale.forward(p[1])])
                    .collect();
                let line_points: PlotPoints = scaled.iter().copied().collect();
                let markers: PlotPoints = scaled.iter().copied().collect();

                plot_ui.line(
                    Line::new(line_points)
                        .name("Precipitation")
                        .color(PRECIPITATION_COLOR)
                        .style(LineStyle::dashed_loose())
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(markers)
                        .name("Precipitation")
                        .color(PRECIPITATION_COLOR)
                        .shape(MarkerShape::Square)
                        .radius(3.0),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_scale_round_trip() {
        let scale = AxisScale::new((0.0, 20.0), (1.0, 2.0));
        assert_eq!(scale.forward(0.0), 1.0);
        assert_eq!(scale.forward(20.0), 2.0);
        assert!((scale.inverse(scale.forward(7.5)) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_axis_scale_flat_series() {
        let scale = AxisScale::new((5.0, 5.0), (1.0, 1.0));
        assert_eq!(scale.forward(5.0), 1.0);
        assert!(scale.forward(6.0).is_finite());
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min_max([3.0, -1.0, 2.0].into_iter()), Some((-1.0, 3.0)));
        assert_eq!(min_max(std::iter::empty()), None);
    }

    #[test]
    fn test_format_day() {
        assert_eq!(format_day(0.0), "1970-01-01");
        assert_eq!(format_day(19358.0), "2023-01-01");
    }
}
