use crate::dataset::error::DatasetError;
use crate::dataset::scaler::ScalerKind;
use crate::dataset::sequence::WindowSpec;
use crate::dataset::table::FeatureTable;
use crate::dataset::{assemble, Datasets, Partitioned, DEFAULT_LABEL_COLUMN, DEFAULT_SEED};
use crate::types::observation::TIME_COLUMN;
use bon::builder;
use log::debug;
use polars::prelude::DataFrame;

/// Fraction of rows given to validation when none is given.
pub const DEFAULT_VALIDATION_FRACTION: f64 = 0.1;

// `0.7 + 0.1` times `rows` can land a few ulps below an integer; the slack
// grows with `rows`.
fn floor_rows(fraction: f64, rows: usize) -> usize {
    let rows = rows as f64;
    let tolerance = rows.max(1.0) * 4.0 * f64::EPSILON;
    (fraction * rows + tolerance).floor() as usize
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), DatasetError> {
    if !(value > 0.0 && value < 1.0) {
        return Err(DatasetError::InvalidParameter {
            name,
            reason: format!("{} is not between 0 and 1", value),
        });
    }
    Ok(())
}

/// Splits `frame` chronologically into train, validation and test sequence datasets.
///
/// Rows `[0, ⌊split·N⌋)` train, the next `⌊validation_fraction·N⌋` rows
/// validate, the rest test. Feature and label scalers are fit on the training
/// partition and only applied to the others. Window `i` of a partition starts at
/// its row `i` and its label is the label column `lookback + horizon` rows later,
/// always inside the same partition.
///
/// This function uses a builder pattern.
///
/// # Arguments
///
/// * `.frame(&DataFrame)`: **Required.** Cleaned, time-ordered table. Every column except the time column is a feature.
/// * `.split(f64)`: **Required.** Fraction of rows used for training.
/// * `.validation_fraction(f64)`: Optional. Fraction of rows used for validation. Defaults to `0.1`.
/// * `.steps(usize)`, `.lookback(usize)`, `.horizon(usize)`, `.batch_size(usize)`: **Required.** Window geometry, see [`WindowSpec`].
/// * `.scaler(ScalerKind)`: Optional. Defaults to [`ScalerKind::Standard`].
/// * `.time_column(&str)`: Optional. Excluded from the features when present. Defaults to `"time"`.
/// * `.label_column(&str)`: Optional. Defaults to `"Value"`.
/// * `.seed(u64)`: Optional. Seed of the training/validation shuffle. Defaults to `42`.
///
/// # Errors
///
/// Returns a [`DatasetError`] for invalid fractions or window geometry, a missing
/// label column, non-numeric or null feature values, a time column that is not
/// in ascending order, or a partition too short to hold a single window.
///
/// # Examples
///
/// ```rust
/// # use metobs::{create_datasets, DatasetError};
/// # use polars::prelude::*;
/// # fn main() -> Result<(), DatasetError> {
/// let values: Vec<f64> = (0..500).map(|i| (i as f64 / 24.0).sin()).collect();
/// let frame = df!("Value" => values)?;
///
/// let datasets = create_datasets()
///     .frame(&frame)
///     .split(0.7)
///     .steps(1)
///     .lookback(24)
///     .horizon(1)
///     .batch_size(32)
///     .call()?;
/// assert_eq!(datasets.boundaries.train, 0..350);
/// assert_eq!(datasets.train.sequence_length(), 24);
/// # Ok(())
/// # }
/// ```
#[builder]
#[allow(clippy::too_many_arguments)]
pub fn create_datasets(
    frame: &DataFrame,
    split: f64,
    validation_fraction: Option<f64>,
    steps: usize,
    lookback: usize,
    horizon: usize,
    batch_size: usize,
    scaler: Option<ScalerKind>,
    time_column: Option<&str>,
    label_column: Option<&str>,
    seed: Option<u64>,
) -> Result<Datasets, DatasetError> {
    let validation_fraction = validation_fraction.unwrap_or(DEFAULT_VALIDATION_FRACTION);
    let scaler = scaler.unwrap_or_default();
    let time_column = time_column.unwrap_or(TIME_COLUMN);
    let label_column = label_column.unwrap_or(DEFAULT_LABEL_COLUMN);
    let seed = seed.unwrap_or(DEFAULT_SEED);

    check_fraction("split", split)?;
    check_fraction("validation_fraction", validation_fraction)?;
    if split + validation_fraction >= 1.0 {
        return Err(DatasetError::InvalidParameter {
            name: "validation_fraction",
            reason: format!(
                "split {} plus validation {} leaves no test rows",
                split, validation_fraction
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
    table.ensure_ascending(time_column)?;
    let rows = table.len();
    let train_end = floor_rows(split, rows);
    let validation_end = floor_rows(split + validation_fraction, rows).min(rows);
    debug!(
        "Contiguous split of {} rows at {} and {}",
        rows, train_end, validation_end
    );

    let partitioned = Partitioned::gather(
        table.values().view(),
        (0..train_end).collect(),
        (train_end..validation_end).collect(),
        (validation_end..rows).collect(),
    );
    assemble(
        partitioned,
        table.columns().to_vec(),
        label_index,
        Some(scaler),
        &spec,
        seed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::scaler::{AnyScaler, Scaler};
    use crate::dataset::tests::hourly_frame;
    use chrono::NaiveDate;
    use ndarray::array;
    use polars::prelude::DataType;

    fn start() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn build(frame: &DataFrame) -> Result<Datasets, DatasetError> {
        create_datasets()
            .frame(frame)
            .split(0.7)
            .steps(1)
            .lookback(24)
            .horizon(1)
            .batch_size(32)
            .call()
    }

    #[test]
    fn test_floor_rows() {
        assert_eq!(floor_rows(0.7, 1000), 700);
        assert_eq!(floor_rows(0.7 + 0.1, 1000), 800);
        assert_eq!(floor_rows(0.5, 5), 2);
        assert_eq!(floor_rows(0.7 + 0.1, 10_000_000), 8_000_000);
        assert_eq!(floor_rows(0.7 + 0.1, 1_000_000_000), 800_000_000);
        assert_eq!(floor_rows(0.3, 0), 0);
    }

    #[test]
    fn test_time_column_order_and_dtype() -> Result<(), DatasetError> {
        let frame = hourly_frame(start(), 1000, |r| r as f64);
        assert!(matches!(
            build(&frame.reverse()),
            Err(DatasetError::UnsortedTimeColumn { row: 1, .. })
        ));

        let mut daily = frame.clone();
        let date = daily.column("time")?.cast(&DataType::Date)?;
        daily.with_column(date)?;
        let datasets = build(&daily)?;
        assert_eq!(datasets.boundaries, build(&frame)?.boundaries);
        assert_eq!(datasets.columns, ["Value", "humidity"]);
        Ok(())
    }

    #[test]
    fn test_contiguous_boundaries() -> Result<(), DatasetError> {
        let datasets = build(&hourly_frame(start(), 1000, |r| r as f64))?;

        assert_eq!(datasets.boundaries.train, 0..700);
        assert_eq!(datasets.boundaries.validation, 700..800);
        assert_eq!(datasets.boundaries.test, 800..1000);
        assert_eq!(datasets.source_rows, (0..1000).collect::<Vec<usize>>());
        assert_eq!(datasets.columns, ["Value", "humidity"]);

        // Usable rows = partition length - (lookback + horizon), stride 1.
        assert_eq!(datasets.train.len(), 700 - 25 - 23);
        assert_eq!(datasets.validation.len(), 100 - 25 - 23);
        assert_eq!(datasets.test.len(), 200 - 25 - 23);
        assert!(datasets.train.is_shuffled());
        assert!(datasets.validation.is_shuffled());
        assert!(!datasets.test.is_shuffled());
        Ok(())
    }

    #[test]
    fn test_label_is_read_horizon_past_window_end() -> Result<(), DatasetError> {
        let datasets = build(&hourly_frame(start(), 1000, |r| r as f64 * 0.5))?;
        let label_scaler = &datasets.scalers.as_ref().unwrap().label;

        let b = &datasets.boundaries;
        for (ds, range) in [
            (&datasets.train, &b.train),
            (&datasets.validation, &b.validation),
            (&datasets.test, &b.test),
        ] {
            for i in 0..ds.len() {
                let position = ds.label_position(i);
                assert_eq!(position, ds.window_end(i) + 1);
                assert!(range.contains(&position));

                let scaled = ds.label(i).unwrap();
                let restored = label_scaler.inverse_transform(array![[scaled]].view())?;
                let expected = datasets.source_rows[position] as f64 * 0.5;
                assert!((restored[[0, 0]] - expected).abs() < 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn test_scalers_fit_on_training_rows_only() -> Result<(), DatasetError> {
        let a = build(&hourly_frame(start(), 1000, |r| r as f64 * 0.5))?;
        let b = build(&hourly_frame(start(), 1000, |r| {
            if r < 700 {
                r as f64 * 0.5
            } else {
                -1000.0
            }
        }))?;

        let (sa, sb) = (a.scalers.unwrap(), b.scalers.unwrap());
        assert_eq!(sa, sb);
        assert_eq!(a.train, b.train);
        assert_ne!(a.test, b.test);

        let AnyScaler::Standard(features) = sa.features else {
            panic!("expected the default standard scaler");
        };
        assert!((features.mean().unwrap()[0] - 174.75).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_minmax_and_seed() -> Result<(), DatasetError> {
        let frame = hourly_frame(start(), 400, |r| (r as f64 / 10.0).sin());
        let build = |seed: u64| {
            create_datasets()
                .frame(&frame)
                .split(0.6)
                .validation_fraction(0.2)
                .steps(2)
                .lookback(12)
                .horizon(3)
                .batch_size(16)
                .scaler(ScalerKind::MinMax)
                .seed(seed)
                .call()
        };

        let first = build(7)?;
        assert_eq!(first, build(7)?);
        assert_eq!(first.boundaries.validation, 240..320);
        assert_eq!(first.train.sequence_length(), 6);
        assert_eq!(first.scalers.as_ref().unwrap().label.kind(), ScalerKind::MinMax);

        let order = |d: &Datasets| -> Vec<f64> {
            d.train
                .batches()
                .flat_map(|b| b.targets.column(0).to_vec())
                .collect()
        };
        assert_eq!(order(&first), order(&build(7)?));
        assert_ne!(order(&first), order(&build(8)?));
        Ok(())
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let frame = hourly_frame(start(), 100, |r| r as f64);

        let result = build(&frame);
        assert!(matches!(
            result,
            Err(DatasetError::InsufficientRows {
                partition: "validation",
                rows: 10,
                required: 49
            })
        ));

        let result = create_datasets()
            .frame(&frame)
            .split(0.95)
            .steps(1)
            .lookback(2)
            .horizon(1)
            .batch_size(4)
            .call();
        assert!(matches!(
            result,
            Err(DatasetError::InvalidParameter { name: "validation_fraction", .. })
        ));

        let result = create_datasets()
            .frame(&frame)
            .split(0.5)
            .steps(1)
            .lookback(2)
            .horizon(1)
            .batch_size(4)
            .label_column("temp_dry")
            .call();
        assert!(matches!(result, Err(DatasetError::MissingColumn(ref c)) if c == "temp_dry"));

        let result = "robust".parse::<ScalerKind>().and_then(|kind| {
            create_datasets()
                .frame(&frame)
                .split(0.5)
                .steps(1)
                .lookback(2)
                .horizon(1)
                .batch_size(4)
                .scaler(kind)
                .call()
        });
        assert!(matches!(result, Err(DatasetError::UnknownScaler(_))));
    }
}
