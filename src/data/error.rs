//! Error types for loading and querying indicator data.

use thiserror::Error;

use super::model::Indicator;

/// A lookup that produced no answer.
///
/// None of these are faults: the UI turns them into a neutral notice and
/// keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryMiss {
    /// The name is not one of the known indicator headers.
    #[error("unknown indicator: {0:?}")]
    UnknownIndicator(String),

    /// A known indicator that the loaded file does not carry.
    #[error("{0} is not present in the loaded dataset")]
    IndicatorNotLoaded(Indicator),

    /// An expected cell is absent.
    #[error("no {indicator} value for {country} in {year}")]
    MissingValue {
        country: String,
        year: i32,
        indicator: Indicator,
    },

    /// A derived view has no eligible rows.
    #[error("not enough data available for this combination")]
    InsufficientData,
}

/// Header problems found while loading a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A required identifier column is missing.
    #[error("missing required column {0:?}")]
    MissingColumn(&'static str),

    /// A required column has a type we cannot read.
    #[error("column {column:?} has unsupported type {found}")]
    UnsupportedType { column: String, found: String },
}
