use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use rusty_slope::data::Table;

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Data tables (central panel, below the chart)
// ---------------------------------------------------------------------------

/// Render the preview, the figure rows, and the rows in the selected range.
pub fn data_tables(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };

    section(ui, "preview", "Data preview", table, true);

    let Some(view) = &state.view else {
        return;
    };

    section(
        ui,
        "figure_rows",
        &format!("Data for figure '{}'", view.graph_id),
        &view.figure_rows,
        false,
    );

    if view.invalid_dates > 0 {
        ui.label(
            RichText::new(format!(
                "{} row(s) of this figure have no valid date and are left out below.",
                view.invalid_dates
            ))
            .color(Color32::YELLOW),
        );
    }

    if view.is_empty() {
        ui.label(RichText::new("⚠ No data in the selected date range.").color(Color32::YELLOW));
    } else {
        section(
            ui,
            "in_range",
            &format!("Data for figure '{}' between {}", view.graph_id, view.range),
            &view.in_range,
            true,
        );
    }
}

fn section(ui: &mut Ui, id: &str, title: &str, table: &Table, open: bool) {
    egui::CollapsingHeader::new(RichText::new(format!("{title}  ({} rows)", table.len())).strong())
        .id_salt(id)
        .default_open(open)
        .show(ui, |ui: &mut Ui| {
            ui.push_id(id, |ui: &mut Ui| data_grid(ui, table));
        });
}

/// A scrollable grid of every column, with a leading row-number column.
fn data_grid(ui: &mut Ui, table: &Table) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto())
        .columns(Column::auto().at_least(60.0).clip(true), table.columns.len())
        .min_scrolled_height(0.0)
        .max_scroll_height(300.0)
        .header(HEADER_HEIGHT, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("#");
            });
            for col in &table.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(col);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, table.len(), |mut row| {
                let idx = row.index();
                let record = &table.rows[idx];
                row.col(|ui: &mut Ui| {
                    ui.label(idx.to_string());
                });
                for c in 0..table.columns.len() {
                    let value = record.get(c);
                    row.col(|ui: &mut Ui| {
                        ui.label(value.to_string());
                    });
                }
            });
        });
}
