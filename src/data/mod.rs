/// Data layer: indicator types, loading, and the query engine.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Observation>, IndicatorSchema
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query    │  filters, latest-year difference, correlation, scatter
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  insight  │  difference → Higher / Lower / Equal + message
///   └──────────┘
/// ```

pub mod error;
pub mod insight;
pub mod loader;
pub mod model;
pub mod query;

pub use error::{QueryMiss, SchemaError};
pub use model::{Dataset, Indicator, IndicatorSchema, Observation};
