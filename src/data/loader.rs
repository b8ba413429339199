use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::filter::normalize_date_column;
use super::model::{CellValue, FECHA, Row, Table};

/// Strings read as a missing cell, besides the empty string.
const NA_VALUES: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a measurement table from a file.  Only `.csv` is accepted.
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other} (expected a .csv file)"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    load_csv_reader(file)
}

/// CSV layout: header row with column names, one measurement per record.
///
/// Every cell is typed independently with [`guess_cell_type`]. Short records
/// are padded with missing cells; a record wider than the header is an error.
/// A `Fecha` column, when present, is normalized to dates right away.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("reading CSV headers")?;
    let columns = dedupe_headers(headers.iter());
    if columns.is_empty() {
        bail!("CSV has no header row");
    }

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV record {}", row_no + 1))?;

        if record.len() > columns.len() {
            // Header is line 1, so the first record sits on line 2.
            let line = record.position().map_or(row_no as u64 + 2, |p| p.line());
            bail!(
                "CSV line {line}: {} fields but the header has {} columns",
                record.len(),
                columns.len()
            );
        }

        let mut cells: Vec<CellValue> = record.iter().map(guess_cell_type).collect();
        cells.resize(columns.len(), CellValue::Missing);
        rows.push(Row::new(cells));
    }

    let table = Table::new(columns, rows);
    Ok(normalize_date_column(&table, FECHA))
}

/// Repeated header names get a `.1`, `.2`… suffix so every column stays addressable.
fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .map(|h| {
            let count = seen.entry(h.to_string()).or_insert(0);
            let name = if *count == 0 {
                h.to_string()
            } else {
                format!("{h}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

/// Infer the type of a raw CSV field.
pub fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() || NA_VALUES.contains(&s) {
        return CellValue::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_nan() {
            return CellValue::Missing;
        }
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_guess_cell_type() {
        assert_eq!(guess_cell_type(""), CellValue::Missing);
        assert_eq!(guess_cell_type("NaN"), CellValue::Missing);
        assert_eq!(guess_cell_type("42"), CellValue::Integer(42));
        assert_eq!(guess_cell_type("-1.25"), CellValue::Float(-1.25));
        assert_eq!(guess_cell_type("True"), CellValue::Bool(true));
        assert_eq!(guess_cell_type("A"), CellValue::String("A".into()));
        assert_eq!(
            guess_cell_type("2023-01-01"),
            CellValue::String("2023-01-01".into())
        );
    }

    #[test]
    fn test_load_csv_reader_types_cells() {
        let csv = "Graph_ID,DP_Number,Date,Displacement_cm,Precipitation_mm\n\
                   A, 7 ,2023-01-01,1.5,0\n";
        let table = load_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(
            table.columns,
            vec!["Graph_ID", "DP_Number", "Date", "Displacement_cm", "Precipitation_mm"]
        );
        assert_eq!(table.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.get(0), &CellValue::String("A".into()));
        assert_eq!(row.get(1), &CellValue::Integer(7));
        // `Date` is left as text until a figure is selected.
        assert_eq!(row.get(2), &CellValue::String("2023-01-01".into()));
        assert_eq!(row.get(3), &CellValue::Float(1.5));
        assert_eq!(row.get(4), &CellValue::Integer(0));
    }

    #[test]
    fn test_fecha_is_normalized_on_load() {
        let csv = "Fecha,Graph_ID\n2023-03-04,A\nbogus,B\n";
        let table = load_csv_reader(csv.as_bytes()).unwrap();

        let expected = NaiveDate::from_ymd_opt(2023, 3, 4)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(table.rows[0].get(0), &CellValue::Date(expected));
        assert_eq!(table.rows[1].get(0), &CellValue::Missing);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = "Graph_ID,Date,Displacement_cm\nA,2023-01-01\n";
        let table = load_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0].cells.len(), 3);
        assert!(table.rows[0].get(2).is_missing());
    }

    #[test]
    fn test_wide_rows_are_rejected() {
        let csv = "Graph_ID,Date\nA,2023-01-01\nB,2023-01-02,extra\n";
        let err = load_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("CSV line 3:"), "{err:#}");
    }

    #[test]
    fn test_duplicate_headers_get_suffix() {
        let csv = "Date,Date,Date\n1,2,3\n";
        let table = load_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["Date", "Date.1", "Date.2"]);
    }

    #[test]
    fn test_rejects_non_csv_extension() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
