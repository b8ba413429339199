use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – figure and date-range selection
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Figure");
    ui.separator();

    if state.table.is_none() {
        ui.label("No file loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            category_selector(ui, state);
            ui.separator();
            point_list(ui, state);
            ui.separator();
            date_range_controls(ui, state);
            ui.separator();
            detected_columns(ui, state);
        });
}

fn category_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Graph_ID");
    let current = state
        .selected_category
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_default();

    let mut picked = None;
    egui::ComboBox::from_id_salt("graph_id")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for value in &state.categories {
                let is_selected = state.selected_category.as_ref() == Some(value);
                if ui.selectable_label(is_selected, value.to_string()).clicked() {
                    picked = Some(value.clone());
                }
            }
        });

    if let Some(value) = picked {
        state.select_category(value);
    }
}

fn point_list(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        return;
    };
    ui.strong(format!("Displacement points ({})", view.points.len()));
    if view.points.is_empty() {
        ui.label("No DP_Number column.");
        return;
    }
    for point in &view.points {
        let color = state.point_colors.color_for(point);
        ui.label(RichText::new(format!("● DP {point}")).color(color));
    }
}

fn date_range_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Date range");
    let Some(view) = &state.view else {
        ui.label("No valid dates for this figure.");
        return;
    };

    let bounds = view.bounds;
    let mut start = view.range.start();
    let mut end = view.range.end();
    ui.label(format!("Available: {bounds}"));

    let mut changed = false;
    egui::Grid::new("date_range_grid")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("From");
            changed |= ui
                .add(DatePickerButton::new(&mut start).id_salt("range_start").calendar_week(false))
                .changed();
            ui.end_row();

            ui.label("To");
            changed |= ui
                .add(DatePickerButton::new(&mut end).id_salt("range_end").calendar_week(false))
                .changed();
            ui.end_row();
        });

    if changed {
        state.set_date_range(start, end);
    }

    if ui
        .add_enabled(state.requested_range.is_some(), egui::Button::new("Full range"))
        .clicked()
    {
        state.reset_date_range();
    }
}

fn detected_columns(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };
    egui::CollapsingHeader::new(RichText::new(format!("Columns ({})", table.columns.len())).strong())
        .id_salt("detected_columns")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for col in &table.columns {
                ui.label(col);
            }
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

        if let Some(table) = &state.table {
            let name = state
                .source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}: {} rows, {} columns, {} figures",
                table.len(),
                table.columns.len(),
                state.categories.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Warning") {
                Color32::YELLOW
            } else {
                Color32::RED
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open measurement data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
