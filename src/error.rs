//! Typed errors for one upload's evaluation pass.

use thiserror::Error;

/// Failure to turn uploaded bytes into a [`crate::ingest::TimeSeries`].
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("the file is empty")]
    Empty,
    #[error("malformed CSV: {0}")]
    Malformed(String),
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("no data column besides '{0}'")]
    NoValueColumn(String),
    #[error("invalid timestamp '{value}' in row {row}")]
    InvalidTimestamp { row: usize, value: String },
    #[error("could not read the file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Failure to summarize the `variable` column.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("column '{column}' is not numeric ({dtype})")]
    NonNumeric { column: String, dtype: String },
    #[error("column '{0}' has no values")]
    NoValues(String),
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Any failure of a single evaluation pass.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}
