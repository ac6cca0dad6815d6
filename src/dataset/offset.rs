use crate::dataset::error::DatasetError;
use crate::dataset::scaler::ScalerKind;
use crate::dataset::sequence::WindowSpec;
use crate::dataset::table::FeatureTable;
use crate::dataset::{assemble, Datasets, Partitioned, DEFAULT_LABEL_COLUMN, DEFAULT_SEED};
use crate::types::observation::TIME_COLUMN;
use bon::builder;
use chrono::{NaiveDate, NaiveTime};
use log::{debug, info};
use polars::prelude::DataFrame;

/// Rows per interleaved block (eight days of hourly data).
pub const DEFAULT_BLOCK_ROWS: usize = 192;

/// Leading rows of each block used for training (seven days of hourly data).
pub const DEFAULT_TRAIN_ROWS_PER_BLOCK: usize = 168;

/// Splits `frame` into interleaved training/validation blocks and a test set cut at a date.
///
/// Rows dated before `test_start` are walked in blocks of `block_rows`: the
/// first `train_rows_per_block` rows of every block train, the rest validate.
/// Leftover rows after the last full block train as well. Every row dated on or
/// after midnight of `test_start` is a test row. The partitions are stacked
/// into one reference table (`train ++ validation ++ test`) and windowed like
/// [`create_datasets`](crate::dataset::contiguous::create_datasets) does.
///
/// This function uses a builder pattern.
///
/// # Arguments
///
/// * `.frame(&DataFrame)`: **Required.** Cleaned table with an ascending `Datetime` or `Date` time column.
/// * `.test_start(NaiveDate)`: **Required.** First day of the test set.
/// * `.block_rows(usize)`: Optional. Defaults to `192`.
/// * `.train_rows_per_block(usize)`: Optional. Defaults to `168`.
/// * `.steps(usize)`, `.lookback(usize)`, `.horizon(usize)`, `.batch_size(usize)`: **Required.** Window geometry.
/// * `.scaler(ScalerKind)`: Optional. Scaling is skipped when not set.
/// * `.time_column(&str)`: Optional. Defaults to `"time"`.
/// * `.label_column(&str)`: Optional. Defaults to `"Value"`.
/// * `.seed(u64)`: Optional. Defaults to `42`.
///
/// # Errors
///
/// Besides the errors of [`create_datasets`](crate::dataset::contiguous::create_datasets),
/// fails with [`DatasetError::MissingTimeColumn`] or
/// [`DatasetError::InvalidTimeColumn`] when there are no usable timestamps, and
/// with [`DatasetError::InsufficientRows`] when not one full block precedes the cutoff.
/// Rows must be in ascending time order ([`DatasetError::UnsortedTimeColumn`]).
#[builder]
#[allow(clippy::too_many_arguments)]
pub fn create_offset_datasets(
    frame: &DataFrame,
    test_start: NaiveDate,
    block_rows: Option<usize>,
    train_rows_per_block: Option<usize>,
    steps: usize,
    lookback: usize,
    horizon: usize,
    batch_size: usize,
    scaler: Option<ScalerKind>,
    time_column: Option<&str>,
    label_column: Option<&str>,
    seed: Option<u64>,
) -> Result<Datasets, DatasetError> {
    let block_rows = block_rows.unwrap_or(DEFAULT_BLOCK_ROWS);
    let train_rows_per_block = train_rows_per_block.unwrap_or(DEFAULT_TRAIN_ROWS_PER_BLOCK);
    let time_column = time_column.unwrap_or(TIME_COLUMN);
    let label_column = label_column.unwrap_or(DEFAULT_LABEL_COLUMN);
    let seed = seed.unwrap_or(DEFAULT_SEED);

    if train_rows_per_block == 0 || train_rows_per_block >= block_rows {
        return Err(DatasetError::InvalidParameter {
            name: "train_rows_per_block",
            reason: format!(
                "{} must be greater than 0 and smaller than block_rows {}",
                train_rows_per_block, block_rows
            ),
        });
    }
    let spec = WindowSpec {
        lookback,
        horizon,
        steps,
        batch_size,
    };
    spec.validate()?;

    let table = FeatureTable::from_frame(frame, time_column)?;
    let label_index = table.column_index(label_column)?;
    let times = table
        .times()
        .ok_or_else(|| DatasetError::MissingTimeColumn(time_column.to_string()))?;
    table.ensure_ascending(time_column)?;

    let cutoff = test_start.and_time(NaiveTime::MIN);
    let (before, test): (Vec<usize>, Vec<usize>) =
        (0..table.len()).partition(|&row| times[row] < cutoff);

    let n_blocks = before.len() / block_rows;
    if n_blocks == 0 {
        return Err(DatasetError::InsufficientRows {
            partition: "train",
            rows: before.len(),
            required: block_rows,
        });
    }

    let mut train = Vec::with_capacity(before.len());
    let mut validation = Vec::with_capacity(n_blocks * (block_rows - train_rows_per_block));
    for block in before.chunks_exact(block_rows) {
        let (head, tail) = block.split_at(train_rows_per_block);
        train.extend_from_slice(head);
        validation.extend_from_slice(tail);
    }
    // Full blocks leave at least one validation row.
    let last_validation = validation.last().map(|&row| times[row]);
    let leftover = before[n_blocks * block_rows..]
        .iter()
        .copied()
        .filter(|&row| last_validation.map_or(true, |last| times[row] > last));
    train.extend(leftover);

    info!(
        "Offset split: {} blocks of {} rows before {}, {} test rows",
        n_blocks,
        block_rows,
        test_start,
        test.len()
    );
    debug!(
        "Offset split keeps {} of {} pre-cutoff rows",
        train.len() + validation.len(),
        before.len()
    );

    let partitioned = Partitioned::gather(table.values().view(), train, validation, test);
    assemble(
        partitioned,
        table.columns().to_vec(),
        label_index,
        scaler,
        &spec,
        seed,
    )
}
