//! Query parameter assembly for the observation endpoint.

use crate::client::error::ClientError;
use crate::types::parameter::Parameter;
use chrono::{DateTime, NaiveDate};

/// Row cap used when the caller does not pass one.
pub const DEFAULT_OBSERVATION_LIMIT: u64 = 100_000;

/// Parses an 8-digit `YYYYMMDD` string into a calendar date.
///
/// Anything that is not exactly eight ASCII digits forming a valid date
/// (`"2021-01-01"`, `"202101"`, `"20210230"`) is a [`ClientError::InvalidDate`].
pub fn parse_date(date: &str) -> Result<NaiveDate, ClientError> {
    let invalid = || ClientError::InvalidDate(date.to_string());
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let year: i32 = date[..4].parse().map_err(|_| invalid())?;
    let month: u32 = date[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = date[6..].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Converts a `YYYYMMDD` string to microseconds since the Unix epoch at midnight UTC.
///
/// ```
/// use metobs::{date_to_epoch_micros, epoch_micros_to_date};
///
/// let micros = date_to_epoch_micros("20201106").unwrap();
/// assert_eq!(micros, 1_604_620_800_000_000);
/// assert_eq!(epoch_micros_to_date(micros).unwrap().to_string(), "2020-11-06");
/// ```
pub fn date_to_epoch_micros(date: &str) -> Result<i64, ClientError> {
    let date = parse_date(date)?;
    Ok(date
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .timestamp_micros())
}

/// Inverse of [`date_to_epoch_micros`]: the UTC calendar date of an epoch in microseconds.
pub fn epoch_micros_to_date(micros: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_micros(micros).map(|dt| dt.date_naive())
}

/// A validated request against the observation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationQuery {
    pub from_micros: i64,
    pub to_micros: i64,
    pub station_id: Option<String>,
    pub parameter: Option<Parameter>,
    pub limit: u64,
}

impl ObservationQuery {
    /// Validates the raw inputs and resolves the time interval.
    pub fn new(
        start_date: &str,
        end_date: &str,
        station_id: Option<&str>,
        field: Option<&str>,
        limit: Option<u64>,
    ) -> Result<Self, ClientError> {
        let from_micros = date_to_epoch_micros(start_date)?;
        let to_micros = date_to_epoch_micros(end_date)?;
        let parameter = field.map(str::parse::<Parameter>).transpose()?;
        Ok(Self {
            from_micros,
            to_micros,
            station_id: station_id.map(str::to_string),
            parameter,
            limit: limit.unwrap_or(DEFAULT_OBSERVATION_LIMIT),
        })
    }

    /// The query string pairs, in the order they are sent. The API key goes first.
    pub fn to_params(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("api-key", api_key.to_string()),
            ("from", self.from_micros.to_string()),
            ("to", self.to_micros.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(parameter) = self.parameter {
            params.push(("parameterId", parameter.as_str().to_string()));
        }
        if let Some(station_id) = &self.station_id {
            params.push(("stationId", station_id.clone()));
        }
        params
    }
}
