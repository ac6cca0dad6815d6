use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Unknown scaler '{0}'; expected 'standard' or 'minmax'")]
    UnknownScaler(String),

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Required column '{0}' not found")]
    MissingColumn(String),

    #[error("Column '{0}' is not numeric and cannot be used as a feature")]
    NonNumericColumn(String),

    #[error("Column '{column}' contains {count} missing values")]
    MissingValues { column: String, count: usize },

    #[error("Time column '{0}' is required for this split")]
    MissingTimeColumn(String),

    #[error("Time column '{column}' must be a Datetime or Date column, found {dtype}")]
    InvalidTimeColumn { column: String, dtype: String },

    #[error("Time column '{column}' is not in ascending order at row {row}")]
    UnsortedTimeColumn { column: String, row: usize },

    #[error("The {partition} partition has {rows} rows but at least {required} are needed for one window")]
    InsufficientRows {
        partition: &'static str,
        rows: usize,
        required: usize,
    },

    #[error("Expected {expected} columns, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("Scaler used before it was fitted")]
    NotFitted,

    #[error("Failed processing DataFrame: {0}")]
    DataFrame(#[from] PolarsError),
}
