use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("'{left}' has {left_len} points but '{right}' has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("Series '{0}' is empty")]
    EmptySeries(&'static str),

    #[error("Failed building chart data: {0}")]
    DataFrame(#[from] PolarsError),
}
