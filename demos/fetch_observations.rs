//! demos/fetch_observations.rs
//!
//! Lists DMI stations and fetches one month of dry-bulb temperatures for
//! Copenhagen airport (station 06180).
//!
//! The API key is read from `<config dir>/metobs/api-key`, or from the file
//! given as the first argument.
//!
//! cargo run --example fetch_observations [path/to/api-key]

use metobs::{DmiClient, MetObsError, Parameter};

#[tokio::main]
async fn main() -> Result<(), MetObsError> {
    // Set RUST_LOG=info (or debug) to see the requests being made.
    env_logger::init();

    let client = match std::env::args().nth(1) {
        Some(path) => DmiClient::from_key_file(path).await?,
        None => DmiClient::from_default_key_file().await?,
    };

    let stations = client.list_stations().await?;
    println!("{} stations, first rows:", stations.height());
    println!("{}", stations.head(Some(5)));

    let observations = client
        .get_observations()
        .start_date("20210101")
        .end_date("20210201")
        .station_id("06180")
        .field(Parameter::TempDry.as_str())
        .call()
        .await?;
    println!("Shape: {:?}", observations.shape());
    println!("{}", observations.tail(Some(5)));

    Ok(())
}
