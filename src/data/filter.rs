use std::collections::HashSet;

use super::dates::parse_date;
use super::error::PipelineError;
use super::model::{CellValue, DateRange, REQUIRED_COLUMNS, Table};

// ---------------------------------------------------------------------------
// Schema validation
// ---------------------------------------------------------------------------

/// Fail fast when a column the pipeline cannot work without is absent.
pub fn validate_schema(table: &Table) -> Result<(), PipelineError> {
    for column in REQUIRED_COLUMNS {
        table.require_column(column)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Date normalization
// ---------------------------------------------------------------------------

/// Parse every value of `column` as a date.
///
/// Values that do not parse become [`CellValue::Missing`]; the operation as a
/// whole never fails. An absent column passes the table through unchanged.
pub fn normalize_date_column(table: &Table, column: &str) -> Table {
    let Some(idx) = table.column_index(column) else {
        return table.clone();
    };

    let mut coerced = 0usize;
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            let before = row.get(idx);
            let after = normalize_cell(before);
            if after.is_missing() && !before.is_missing() {
                coerced += 1;
            }
            if idx < row.cells.len() {
                row.cells[idx] = after;
            }
            row
        })
        .collect();

    if coerced > 0 {
        log::warn!("{coerced} value(s) in column '{column}' are not dates; treating them as missing");
    }
    table.with_rows(rows)
}

fn normalize_cell(value: &CellValue) -> CellValue {
    match value {
        CellValue::Date(dt) => CellValue::Date(*dt),
        CellValue::String(s) => parse_date(s).map_or(CellValue::Missing, CellValue::Date),
        _ => CellValue::Missing,
    }
}

/// Remove rows whose `column` is not a valid date after normalization.
pub fn drop_invalid_dates(table: &Table, column: &str) -> Result<Table, PipelineError> {
    let idx = table.require_column(column)?;
    let rows: Vec<_> = table
        .rows
        .iter()
        .filter(|row| row.get(idx).as_datetime().is_some())
        .cloned()
        .collect();

    log::debug!(
        "dropped {} row(s) without a valid '{column}'",
        table.len() - rows.len()
    );
    Ok(table.with_rows(rows))
}

// ---------------------------------------------------------------------------
// Category selection
// ---------------------------------------------------------------------------

/// Rows where `row[column] == value`, in their original order.
///
/// The column must exist and the table must have rows; both are data-shape
/// errors rather than a silent empty result. A value with no matches yields
/// an empty table.
pub fn select_by_category(
    table: &Table,
    column: &str,
    value: &CellValue,
) -> Result<Table, PipelineError> {
    let idx = table.require_column(column)?;
    if table.is_empty() {
        return Err(PipelineError::EmptyTable {
            column: column.to_string(),
        });
    }

    let rows: Vec<_> = table
        .rows
        .iter()
        .filter(|row| row.get(idx) == value)
        .cloned()
        .collect();

    log::debug!("{column} = {value}: {} of {} rows", rows.len(), table.len());
    Ok(table.with_rows(rows))
}

/// Distinct non-missing values of `column` in order of first appearance.
pub fn distinct_values(table: &Table, column: &str) -> Result<Vec<CellValue>, PipelineError> {
    let idx = table.require_column(column)?;
    let mut seen: HashSet<&CellValue> = HashSet::new();
    Ok(table
        .column_values(idx)
        .filter(|v| !v.is_missing() && seen.insert(*v))
        .cloned()
        .collect())
}

// ---------------------------------------------------------------------------
// Date bounds and range filtering
// ---------------------------------------------------------------------------

/// Calendar (min, max) of the valid dates in `column`.
pub fn compute_date_bounds(table: &Table, column: &str) -> Result<DateRange, PipelineError> {
    let idx = table.require_column(column)?;
    let mut dates = table.column_values(idx).filter_map(CellValue::as_date);

    let first = dates.next().ok_or_else(|| PipelineError::EmptyRange {
        column: column.to_string(),
    })?;
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    DateRange::new(min, max)
}

/// Rows whose date in `column` falls inside `range`, both ends included.
///
/// Comparison is by calendar day, so a timestamped row on the last day of the
/// range is kept. An empty result is a normal outcome.
pub fn filter_by_date_range(
    table: &Table,
    column: &str,
    range: &DateRange,
) -> Result<Table, PipelineError> {
    let idx = table.require_column(column)?;
    let rows: Vec<_> = table
        .rows
        .iter()
        .filter(|row| row.get(idx).as_date().is_some_and(|d| range.contains(d)))
        .cloned()
        .collect();

    log::debug!("{range}: {} of {} rows", rows.len(), table.len());
    Ok(table.with_rows(rows))
}
