//! Decoding of DMI observation records and their conversion into an observation
//! table with a derived `time` column.

use polars::prelude::*;
use serde::Deserialize;

/// Name of the timestamp column derived from `timeObserved`.
pub const TIME_COLUMN: &str = "time";

/// One observation record as returned by `GET /observation`.
///
/// The service also sends `_id` and `timeCreated`; those are bookkeeping fields
/// and are not decoded.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub parameter_id: String,
    pub station_id: String,
    /// Observation time as microseconds since the Unix epoch.
    pub time_observed: i64,
    pub value: Option<f64>,
}

/// Converts observation records into a `DataFrame` with columns
/// `parameterId`, `stationId`, `value`, `time`.
///
/// `time` is a `Datetime(Microseconds)` column built from `timeObserved`. Rows keep
/// the order in which the service returned them.
pub fn observations_to_frame(observations: Vec<Observation>) -> PolarsResult<DataFrame> {
    let mut parameters = Vec::with_capacity(observations.len());
    let mut stations = Vec::with_capacity(observations.len());
    let mut values = Vec::with_capacity(observations.len());
    let mut times = Vec::with_capacity(observations.len());

    for obs in observations {
        parameters.push(obs.parameter_id);
        stations.push(obs.station_id);
        values.push(obs.value);
        times.push(obs.time_observed);
    }

    let mut df = df!(
        "parameterId" => parameters,
        "stationId" => stations,
        "value" => values,
        TIME_COLUMN => times
    )?;
    let time = df
        .column(TIME_COLUMN)?
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
    df.with_column(time)?;
    Ok(df)
}
