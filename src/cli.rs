use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::Serialize;

use rusty_slope::data::filter::{distinct_values, validate_schema};
use rusty_slope::data::loader::{guess_cell_type, load_file};
use rusty_slope::data::model::GRAPH_ID;
use rusty_slope::data::{CellValue, DateRange, GraphView, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary and rows
    Text,
    /// Single JSON document
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "rusty-slope")]
#[command(about = "Displacement and precipitation viewer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// CSV file to open on startup
    pub file: Option<PathBuf>,

    /// Graph_ID to select (defaults to the first one in the file)
    #[arg(short, long)]
    pub graph: Option<String>,

    /// First day of the date range (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day of the date range (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Print the filtered figure instead of opening the window
    #[arg(long, requires = "file")]
    pub summary: bool,

    /// Output format for --summary
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl Cli {
    /// `--graph` typed the same way the loader types the `Graph_ID` column.
    pub fn graph_value(&self) -> Option<CellValue> {
        self.graph.as_deref().map(guess_cell_type)
    }
}

// ---------------------------------------------------------------------------
// Headless summary
// ---------------------------------------------------------------------------

/// Everything the window would show for one figure, in printable form.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub file: String,
    pub columns: Vec<String>,
    pub graph_ids: Vec<CellValue>,
    pub graph_id: CellValue,
    pub points: Vec<CellValue>,
    pub bounds: DateRange,
    pub range: DateRange,
    pub figure_rows: usize,
    pub invalid_dates: usize,
    pub rows_in_range: usize,
    /// No rows in the selected range; not an error.
    pub empty: bool,
    #[serde(skip)]
    pub in_range: Table,
}

/// Run the pipeline once for the figure and range given on the command line.
pub fn build_summary(
    table: &Table,
    file: &Path,
    graph: Option<CellValue>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Summary> {
    validate_schema(table)?;
    let graph_ids = distinct_values(table, GRAPH_ID)?;

    let graph_id = match graph {
        Some(g) if graph_ids.contains(&g) => g,
        Some(g) => bail!("Graph_ID '{g}' not found; available: {}", join(&graph_ids)),
        None => graph_ids
            .first()
            .cloned()
            .context("the file has no Graph_ID values")?,
    };

    let mut view = GraphView::build(table, &graph_id, None)?;
    if from.is_some() || to.is_some() {
        let range = DateRange::new(
            from.unwrap_or(view.bounds.start()),
            to.unwrap_or(view.bounds.end()),
        )?;
        view = GraphView::build(table, &graph_id, Some(range))?;
    }

    Ok(Summary {
        file: file.display().to_string(),
        columns: table.columns.clone(),
        graph_ids,
        graph_id,
        points: view.points.clone(),
        bounds: view.bounds,
        range: view.range,
        figure_rows: view.figure_rows.len(),
        invalid_dates: view.invalid_dates,
        rows_in_range: view.in_range.len(),
        empty: view.is_empty(),
        in_range: view.in_range,
    })
}

/// `--summary` entry point.
pub fn run_summary(cli: &Cli) -> Result<()> {
    let file = cli.file.as_deref().context("--summary needs a CSV file")?;
    let table = load_file(file)?;
    log::info!("Loaded {} rows from {}", table.len(), file.display());

    let summary = build_summary(&table, file, cli.graph_value(), cli.from, cli.to)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &summary).context("writing JSON")?;
            writeln!(out)?;
        }
        OutputFormat::Text => write_text(&mut out, &summary)?,
    }
    Ok(())
}

fn write_text(out: &mut impl Write, s: &Summary) -> std::io::Result<()> {
    writeln!(out, "File:            {}", s.file)?;
    writeln!(out, "Columns:         {}", s.columns.join(", "))?;
    writeln!(out, "Figures:         {}", join(&s.graph_ids))?;
    writeln!(out, "Figure:          {}", s.graph_id)?;
    writeln!(out, "Points:          {}", join(&s.points))?;
    writeln!(out, "Date bounds:     {}", s.bounds)?;
    writeln!(out, "Selected range:  {}", s.range)?;
    writeln!(
        out,
        "Rows:            {} in figure, {} in range, {} without a valid date",
        s.figure_rows, s.rows_in_range, s.invalid_dates
    )?;
    writeln!(out)?;

    if s.empty {
        writeln!(out, "No data in the selected date range.")?;
        return Ok(());
    }

    writeln!(out, "{}", s.in_range.columns.join("\t"))?;
    for row in &s.in_range.rows {
        let cells: Vec<String> = row.cells.iter().map(|c| c.to_string()).collect();
        writeln!(out, "{}", cells.join("\t"))?;
    }
    Ok(())
}

fn join(values: &[CellValue]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_slope::data::loader::load_csv_reader;

    const CSV: &str = "\
Graph_ID,DP_Number,Date,Displacement_cm,Precipitation_mm
A,1,2023-01-01,1.0,0.0
B,2,2023-01-02,2.0,1.0
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table() -> Table {
        load_csv_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "rusty-slope",
            "data.csv",
            "--graph",
            "7",
            "--from",
            "2023-01-01",
            "--summary",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("data.csv")));
        assert_eq!(cli.graph_value(), Some(CellValue::Integer(7)));
        assert_eq!(cli.from, Some(date(2023, 1, 1)));
        assert!(cli.summary);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_summary_requires_file() {
        assert!(Cli::try_parse_from(["rusty-slope", "--summary"]).is_err());
    }

    #[test]
    fn test_summary_defaults_to_first_figure() {
        let s = build_summary(&table(), Path::new("x.csv"), None, None, None).unwrap();
        assert_eq!(s.graph_id, CellValue::String("A".into()));
        assert_eq!(s.rows_in_range, 1);
        assert!(!s.empty);
    }

    #[test]
    fn test_summary_empty_range_is_not_an_error() {
        let s = build_summary(
            &table(),
            Path::new("x.csv"),
            Some(CellValue::String("A".into())),
            Some(date(2023, 2, 1)),
            Some(date(2023, 2, 28)),
        )
        .unwrap();
        assert!(s.empty);

        let mut out = Vec::new();
        write_text(&mut out, &s).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No data in the selected date range."));
    }

    #[test]
    fn test_text_rows_leave_missing_cells_blank() {
        let csv = "Graph_ID,Date,Displacement_cm,Precipitation_mm\nA,2023-01-01,,0.5\n";
        let table = load_csv_reader(csv.as_bytes()).unwrap();
        let s = build_summary(&table, Path::new("x.csv"), None, None, None).unwrap();

        let mut out = Vec::new();
        write_text(&mut out, &s).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("A\t2023-01-01\t\t0.5\n"), "{text}");
    }

    #[test]
    fn test_summary_unknown_graph() {
        let err = build_summary(
            &table(),
            Path::new("x.csv"),
            Some(CellValue::String("Z".into())),
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("'Z' not found"), "{err}");
    }

    #[test]
    fn test_summary_json_shape() {
        let s = build_summary(&table(), Path::new("x.csv"), None, None, None).unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["graph_id"], "A");
        assert_eq!(json["bounds"]["start"], "2023-01-01");
        assert_eq!(json["empty"], false);
        assert!(json.get("in_range").is_none());
    }
}
