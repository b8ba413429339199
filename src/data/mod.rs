/// Data layer: core types, loading, and the filtering pipeline.
///
/// Architecture:
/// ```text
///        .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (typed cells, `Fecha` normalized)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  select Graph_ID → normalize Date → drop invalid → bounds → range
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  GraphView: subsets, bounds, points, chart series
///   └──────────┘
/// ```

pub mod dates;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;

pub use error::PipelineError;
pub use model::{CellValue, DateRange, Row, Table};
pub use pipeline::GraphView;
