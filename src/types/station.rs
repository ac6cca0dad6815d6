//! Defines the data structures returned by the DMI station endpoint and their
//! conversion into a flat station table.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single DMI weather station as returned by `GET /station`.
///
/// Only the fields needed for the station table are decoded; everything else in
/// the payload is ignored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// The DMI station identifier (e.g., "06180" for Copenhagen Airport).
    pub station_id: String,
    /// Country code, e.g. "DNK" or "GRL".
    pub country: Option<String>,
    /// Human-readable station name.
    pub name: Option<String>,
    /// Station type, e.g. "Synop" or "Pluvio".
    #[serde(rename = "type")]
    pub station_type: Option<String>,
    /// Geographical position of the station.
    pub location: Location,
}

/// Represents the geographical location of a weather station.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
}

/// Flattens stations into a `DataFrame` with columns
/// `stationId`, `country`, `name`, `type`, `lat`, `lon`.
///
/// The service may list a station more than once (e.g. per instrument); only the
/// first occurrence of each `stationId` is kept.
pub fn stations_to_frame(stations: Vec<Station>) -> PolarsResult<DataFrame> {
    let mut seen = HashSet::with_capacity(stations.len());
    let unique: Vec<Station> = stations
        .into_iter()
        .filter(|s| seen.insert(s.station_id.clone()))
        .collect();

    let mut ids = Vec::with_capacity(unique.len());
    let mut countries = Vec::with_capacity(unique.len());
    let mut names = Vec::with_capacity(unique.len());
    let mut types = Vec::with_capacity(unique.len());
    let mut lats = Vec::with_capacity(unique.len());
    let mut lons = Vec::with_capacity(unique.len());

    for station in unique {
        ids.push(station.station_id);
        countries.push(station.country);
        names.push(station.name);
        types.push(station.station_type);
        lats.push(station.location.latitude);
        lons.push(station.location.longitude);
    }

    df!(
        "stationId" => ids,
        "country" => countries,
        "name" => names,
        "type" => types,
        "lat" => lats,
        "lon" => lons
    )
}
