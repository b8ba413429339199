use std::collections::BTreeMap;

use serde::Serialize;

use super::error::PipelineError;
use super::filter::{
    compute_date_bounds, distinct_values, drop_invalid_dates, filter_by_date_range,
    normalize_date_column, select_by_category,
};
use super::model::{
    CellValue, DATE, DISPLACEMENT, DP_NUMBER, DateRange, GRAPH_ID, PRECIPITATION, Table,
};

const SECONDS_PER_DAY: f64 = 86_400.0;

// ---------------------------------------------------------------------------
// GraphView – everything the presentation layer shows for one figure
// ---------------------------------------------------------------------------

/// Result of running the pipeline for one `Graph_ID` and date range.
#[derive(Debug, Clone)]
pub struct GraphView {
    /// The selected `Graph_ID`.
    pub graph_id: CellValue,
    /// All rows of the figure, as loaded.
    pub figure_rows: Table,
    /// Calendar min/max over the figure's valid dates.
    pub bounds: DateRange,
    /// Range actually applied.
    pub range: DateRange,
    /// Figure rows with a valid date inside `range`.
    pub in_range: Table,
    /// Distinct `DP_Number` values of the figure.
    pub points: Vec<CellValue>,
    /// Figure rows dropped because `Date` did not parse.
    pub invalid_dates: usize,
}

impl GraphView {
    /// Run select → normalize → drop → bounds → range filter.
    ///
    /// Without a `requested` range the full bounds are used. A requested range
    /// is applied as given, so a range outside the data yields an empty
    /// `in_range` rather than an error.
    pub fn build(
        table: &Table,
        graph_id: &CellValue,
        requested: Option<DateRange>,
    ) -> Result<Self, PipelineError> {
        let figure_rows = select_by_category(table, GRAPH_ID, graph_id)?;

        let normalized = normalize_date_column(&figure_rows, DATE);
        let dated = drop_invalid_dates(&normalized, DATE)?;
        let invalid_dates = figure_rows.len() - dated.len();
        if invalid_dates > 0 {
            log::warn!("figure {graph_id}: {invalid_dates} row(s) without a valid date were skipped");
        }

        let bounds = compute_date_bounds(&dated, DATE)?;
        let range = requested.unwrap_or(bounds);
        let in_range = filter_by_date_range(&dated, DATE, &range)?;

        let points = if figure_rows.has_column(DP_NUMBER) {
            distinct_values(&figure_rows, DP_NUMBER)?
        } else {
            Vec::new()
        };

        Ok(GraphView {
            graph_id: graph_id.clone(),
            figure_rows,
            bounds,
            range,
            in_range,
            points,
            invalid_dates,
        })
    }

    /// Zero rows in the selected range: a valid outcome, shown as "no data".
    pub fn is_empty(&self) -> bool {
        self.in_range.is_empty()
    }

    /// Plot title, e.g. `Figure G1 - Displacement and Precipitation`.
    pub fn title(&self) -> String {
        format!(
            "Figure {} - Displacement and Precipitation",
            self.graph_id.to_string().to_uppercase()
        )
    }

    /// Chart series of the rows in range.
    ///
    /// Displacement is split per `DP_Number`. Precipitation is a single
    /// series keeping the first value seen at each timestamp, since every
    /// point of a figure repeats the same rainfall record.
    pub fn series(&self) -> ChartSeries {
        let table = &self.in_range;
        let Some(date_idx) = table.column_index(DATE) else {
            return ChartSeries::default();
        };
        let point_idx = table.column_index(DP_NUMBER);
        let disp_idx = table.column_index(DISPLACEMENT);
        let precip_idx = table.column_index(PRECIPITATION);

        let mut displacement: Vec<PointSeries> = Vec::new();
        let mut precipitation: BTreeMap<i64, f64> = BTreeMap::new();

        for row in &table.rows {
            let Some(dt) = row.get(date_idx).as_datetime() else {
                continue;
            };
            let secs = dt.and_utc().timestamp();
            let x = secs as f64 / SECONDS_PER_DAY;

            if let Some(v) = disp_idx.and_then(|i| row.get(i).as_f64()) {
                let point = point_idx.map_or(CellValue::Missing, |i| row.get(i).clone());
                match displacement.iter_mut().find(|s| s.point == point) {
                    Some(series) => series.values.push([x, v]),
                    None => displacement.push(PointSeries {
                        point,
                        values: vec![[x, v]],
                    }),
                }
            }

            if let Some(p) = precip_idx.and_then(|i| row.get(i).as_f64()) {
                precipitation.entry(secs).or_insert(p);
            }
        }

        for series in &mut displacement {
            series.values.sort_by(|a, b| a[0].total_cmp(&b[0]));
        }

        ChartSeries {
            displacement,
            precipitation: precipitation
                .into_iter()
                .map(|(secs, p)| [secs as f64 / SECONDS_PER_DAY, p])
                .collect(),
        }
    }
}

/// Measurement columns the chart needs but the table lacks.
pub fn missing_series_columns(table: &Table) -> Vec<&'static str> {
    [DISPLACEMENT, PRECIPITATION]
        .into_iter()
        .filter(|c| !table.has_column(c))
        .collect()
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

/// Displacement of one measurement point over time. `x` is days since the epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSeries {
    pub point: CellValue,
    pub values: Vec<[f64; 2]>,
}

impl PointSeries {
    pub fn label(&self) -> String {
        match &self.point {
            CellValue::Missing => "Displacement".to_string(),
            p => format!("Displacement DP {p}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub displacement: Vec<PointSeries>,
    pub precipitation: Vec<[f64; 2]>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.displacement.is_empty() && self.precipitation.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;
    use chrono::NaiveDate;

    const CSV: &str = "\
Graph_ID,DP_Number,Date,Displacement_cm,Precipitation_mm
g1,1,2023-01-02,0.4,3.0
g1,2,2023-01-02,0.7,3.0
g1,1,2023-01-01,0.1,0.0
g2,9,2023-01-01,5.0,0.0
g1,2,not-a-date,9.9,9.9
g1,1,2023-01-05,0.8,12.5
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn g1() -> CellValue {
        CellValue::String("g1".into())
    }

    #[test]
    fn test_build_full_range() {
        let table = load_csv_reader(CSV.as_bytes()).unwrap();
        let view = GraphView::build(&table, &g1(), None).unwrap();

        assert_eq!(view.figure_rows.len(), 5);
        assert_eq!(view.invalid_dates, 1);
        assert_eq!(view.bounds.start(), date(2023, 1, 1));
        assert_eq!(view.bounds.end(), date(2023, 1, 5));
        assert_eq!(view.range, view.bounds);
        assert_eq!(view.in_range.len(), 4);
        assert_eq!(view.points, vec![CellValue::Integer(1), CellValue::Integer(2)]);
        assert!(!view.is_empty());
        assert_eq!(view.title(), "Figure G1 - Displacement and Precipitation");
    }

    #[test]
    fn test_build_disjoint_range_is_empty_not_error() {
        let table = load_csv_reader(CSV.as_bytes()).unwrap();
        let feb = DateRange::new(date(2023, 2, 1), date(2023, 2, 28)).unwrap();
        let view = GraphView::build(&table, &g1(), Some(feb)).unwrap();

        assert!(view.is_empty());
        assert_eq!(view.range, feb);
        assert!(view.series().is_empty());
    }

    #[test]
    fn test_build_without_valid_dates() {
        let csv = "Graph_ID,Date\nA,nope\n";
        let table = load_csv_reader(csv.as_bytes()).unwrap();
        let err = GraphView::build(&table, &CellValue::String("A".into()), None).unwrap_err();
        assert_eq!(err, PipelineError::EmptyRange { column: DATE.into() });
    }

    #[test]
    fn test_series_grouped_and_sorted() {
        let table = load_csv_reader(CSV.as_bytes()).unwrap();
        let series = GraphView::build(&table, &g1(), None).unwrap().series();

        let day = |d: u32| date(2023, 1, d).and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp() as f64
            / SECONDS_PER_DAY;

        assert_eq!(series.displacement.len(), 2);
        assert_eq!(series.displacement[0].point, CellValue::Integer(1));
        assert_eq!(
            series.displacement[0].values,
            vec![[day(1), 0.1], [day(2), 0.4], [day(5), 0.8]]
        );
        assert_eq!(series.displacement[1].values, vec![[day(2), 0.7]]);
        assert_eq!(
            series.precipitation,
            vec![[day(1), 0.0], [day(2), 3.0], [day(5), 12.5]]
        );
        assert_eq!(series.displacement[0].label(), "Displacement DP 1");
    }

    #[test]
    fn test_series_without_point_column() {
        let csv = "Graph_ID,Date,Displacement_cm\nA,2023-01-01,1.0\n";
        let table = load_csv_reader(csv.as_bytes()).unwrap();
        let view = GraphView::build(&table, &CellValue::String("A".into()), None).unwrap();

        assert!(view.points.is_empty());
        let series = view.series();
        assert_eq!(series.displacement.len(), 1);
        assert_eq!(series.displacement[0].label(), "Displacement");
        assert!(series.precipitation.is_empty());
        assert_eq!(missing_series_columns(&table), vec![PRECIPITATION]);
    }
}
