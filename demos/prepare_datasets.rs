//! demos/prepare_datasets.rs
//!
//! Fetches a year of hourly temperatures, keeps the readings that have a
//! value, and builds train/validation/test windows with both split strategies.
//!
//! cargo run --example prepare_datasets [path/to/api-key]

use chrono::NaiveDate;
use metobs::{create_datasets, create_offset_datasets, DmiClient, ScalerKind};
use polars::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let client = match std::env::args().nth(1) {
        Some(path) => DmiClient::from_key_file(path).await?,
        None => DmiClient::from_default_key_file().await?,
    };

    let observations = client
        .get_observations()
        .start_date("20200101")
        .end_date("20210301")
        .station_id("06180")
        .field("temp_dry")
        .call()
        .await?;

    // The service returns newest first; the builders expect time order.
    let frame = observations
        .lazy()
        .filter(col("value").is_not_null())
        .select([col("time"), col("value").alias("Value")])
        .sort(["time"], SortMultipleOptions::default())
        .collect()?;
    println!("{} hourly readings", frame.height());

    let contiguous = create_datasets()
        .frame(&frame)
        .split(0.7)
        .steps(1)
        .lookback(72)
        .horizon(12)
        .batch_size(256)
        .scaler(ScalerKind::MinMax)
        .call()?;
    println!("Contiguous split: {:?}", contiguous.boundaries);

    let offset = create_offset_datasets()
        .frame(&frame)
        .test_start(NaiveDate::from_ymd_opt(2021, 1, 1).ok_or("invalid cutoff")?)
        .steps(1)
        .lookback(72)
        .horizon(12)
        .batch_size(256)
        .scaler(ScalerKind::Standard)
        .call()?;
    println!("Offset split: {:?}", offset.boundaries);

    if let Some(batch) = offset.train.batches().next() {
        println!(
            "First training batch: inputs {:?}, targets {:?}",
            batch.inputs.shape(),
            batch.targets.shape()
        );
    }
    Ok(())
}
