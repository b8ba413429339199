use chrono::NaiveDate;
use thiserror::Error;

/// Structural failures of the filtering pipeline.
///
/// Malformed individual cells never show up here: an unparseable date is
/// coerced to [`CellValue::Missing`](super::model::CellValue::Missing) and the
/// row is dropped later. Likewise an empty filter result is a normal outcome,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("required column '{column}' not found in the table")]
    MissingColumn { column: String },

    #[error("cannot select by '{column}': the table has no rows")]
    EmptyTable { column: String },

    #[error("no valid dates in column '{column}', the date range is undefined")]
    EmptyRange { column: String },

    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}
