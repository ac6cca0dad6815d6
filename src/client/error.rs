use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid date '{0}': expected an 8-digit YYYYMMDD calendar date, e.g. \"20201106\"")]
    InvalidDate(String),

    #[error("Unknown field '{0}'; see `Parameter::ALL` for the accepted identifiers")]
    UnknownField(String),

    #[error("API key file '{0}' is empty")]
    EmptyKey(PathBuf),

    #[error("Failed to read API key file '{0}'")]
    KeyRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine configuration directory for the API key")]
    KeyPathResolution,

    #[error("Network request failed for {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed for {url} with status {status}")]
    Response {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to decode JSON response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed building DataFrame: {0}")]
    DataFrame(#[from] PolarsError),
}

impl ClientError {
    /// True for errors caused by the caller's input rather than the service.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidDate(_) | ClientError::UnknownField(_) | ClientError::EmptyKey(_)
        )
    }
}
