use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use rusty_slope::data::filter::{distinct_values, validate_schema};
use rusty_slope::data::loader::load_file;
use rusty_slope::data::model::GRAPH_ID;
use rusty_slope::data::pipeline::missing_series_columns;
use rusty_slope::data::{CellValue, DateRange, GraphView, Table};

use crate::color::PointColors;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
///
/// Owns the raw table for as long as it is loaded; every selection change
/// rebuilds `view` from it.
#[derive(Default)]
pub struct AppState {
    /// Loaded table (None until the user opens a file).
    pub table: Option<Table>,

    /// File the table came from.
    pub source: Option<PathBuf>,

    /// Distinct `Graph_ID` values, in file order.
    pub categories: Vec<CellValue>,

    /// Currently selected `Graph_ID`.
    pub selected_category: Option<CellValue>,

    /// Date range chosen by the user; `None` means the figure's full bounds.
    pub requested_range: Option<DateRange>,

    /// Pipeline output for the current selection.
    pub view: Option<GraphView>,

    /// Line colours for the current figure's points.
    pub point_colors: PointColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Warning about the loaded table itself; outlives figure-level errors.
    pub schema_warning: Option<String>,
}

impl AppState {
    /// Load `path` and install it, replacing any previous table.
    pub fn open_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows with columns {:?} from {}",
                    table.len(),
                    table.columns,
                    path.display()
                );
                self.set_table(table, Some(path.to_path_buf()));
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded table: validate it, list figures, select the first.
    ///
    /// A table missing a required column is rejected and the previous one is kept.
    pub fn set_table(&mut self, table: Table, source: Option<PathBuf>) {
        let categories = match validate_schema(&table).and_then(|_| distinct_values(&table, GRAPH_ID)) {
            Ok(categories) => categories,
            Err(e) => {
                log::error!("Rejected table: {e}");
                self.status_message = Some(format!("Error: {e}"));
                return;
            }
        };

        let missing = missing_series_columns(&table);
        self.schema_warning = if missing.is_empty() {
            None
        } else {
            log::warn!("Table has no {missing:?} column(s); the chart will be incomplete");
            Some(format!("Warning: no {} column in this file", missing.join(" / ")))
        };

        self.selected_category = categories.first().cloned();
        self.categories = categories;
        self.requested_range = None;
        self.table = Some(table);
        self.source = source;
        self.rebuild_view();
    }

    /// Select a figure; the date range resets to its full bounds.
    pub fn select_category(&mut self, value: CellValue) {
        if self.selected_category.as_ref() == Some(&value) {
            return;
        }
        self.selected_category = Some(value);
        self.requested_range = None;
        self.rebuild_view();
    }

    /// Set the date range from two picker values.
    ///
    /// Reversed input is swapped and both ends are pinned inside the figure's bounds.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let Ok(range) = DateRange::new(start, end) else {
            return;
        };
        let range = match &self.view {
            Some(view) => range.clamped_to(&view.bounds),
            None => range,
        };
        self.requested_range = Some(range);
        self.rebuild_view();
    }

    /// Go back to the figure's full date range.
    pub fn reset_date_range(&mut self) {
        self.requested_range = None;
        self.rebuild_view();
    }

    /// Recompute `view` from the owned table and the current selections.
    ///
    /// A successful rebuild replaces any earlier error with the table's warning, if any.
    pub fn rebuild_view(&mut self) {
        let (Some(table), Some(category)) = (&self.table, &self.selected_category) else {
            self.view = None;
            self.point_colors = PointColors::default();
            return;
        };

        match GraphView::build(table, category, self.requested_range) {
            Ok(view) => {
                self.point_colors = PointColors::new(&view.points);
                self.view = Some(view);
                self.status_message = self.schema_warning.clone();
            }
            Err(e) => {
                log::error!("Cannot build figure {category}: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.view = None;
                self.point_colors = PointColors::default();
            }
        }
    }
}
