//! Turns a cleaned observation table into train/validation/test sequence datasets.
//!
//! Two split strategies are provided: [`contiguous::create_datasets`] cuts the
//! table into three contiguous chronological partitions, while
//! [`offset::create_offset_datasets`] interleaves training and validation
//! blocks and cuts the test set at a calendar date. Both then share the same pipeline: fit scalers on the training
//! partition, read each label `lookback + horizon` rows past its window's first
//! row, and emit one [`SequenceDataset`] per partition.

pub mod contiguous;
pub mod error;
pub mod offset;
pub mod scaler;
pub mod sequence;
pub mod table;

use crate::dataset::error::DatasetError;
use crate::dataset::scaler::{AnyScaler, Scaler, ScalerKind};
use crate::dataset::sequence::{SequenceDataset, WindowSpec};
use log::{debug, info};
use ndarray::{s, Array2, ArrayView2, Axis};
use std::ops::Range;

/// Column read as the label when none is given.
pub const DEFAULT_LABEL_COLUMN: &str = "Value";

/// Seed for the shuffled partitions when none is given.
pub const DEFAULT_SEED: u64 = 42;

/// Partition positions in the reference table (`train ++ validation ++ test`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitBoundaries {
    pub train: Range<usize>,
    pub validation: Range<usize>,
    pub test: Range<usize>,
}

/// Scalers fitted on the training partition.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedScalers {
    /// Applied to every feature column.
    pub features: AnyScaler,
    /// Applied to the label column only; use it to map predictions back to units.
    pub label: AnyScaler,
}

/// The three sequence datasets plus what is needed to interpret them.
#[derive(Debug, Clone, PartialEq)]
pub struct Datasets {
    pub train: SequenceDataset,
    pub validation: SequenceDataset,
    pub test: SequenceDataset,
    pub boundaries: SplitBoundaries,
    /// `None` when scaling was skipped.
    pub scalers: Option<FittedScalers>,
    /// Feature column names, in matrix column order.
    pub columns: Vec<String>,
    /// Row of the input frame behind each reference-table position.
    pub source_rows: Vec<usize>,
}

/// The reference table before scaling and windowing.
pub(crate) struct Partitioned {
    pub values: Array2<f64>,
    pub source_rows: Vec<usize>,
    pub boundaries: SplitBoundaries,
}

impl Partitioned {
    /// Gathers `train ++ validation ++ test` rows of `table` into one matrix.
    pub fn gather(
        table: ArrayView2<'_, f64>,
        train: Vec<usize>,
        validation: Vec<usize>,
        test: Vec<usize>,
    ) -> Self {
        let train_end = train.len();
        let validation_end = train_end + validation.len();
        let test_end = validation_end + test.len();

        let mut source_rows = train;
        source_rows.extend(validation);
        source_rows.extend(test);

        Self {
            values: table.select(Axis(0), &source_rows),
            source_rows,
            boundaries: SplitBoundaries {
                train: 0..train_end,
                validation: train_end..validation_end,
                test: validation_end..test_end,
            },
        }
    }
}

/// Shared tail of both builders.
pub(crate) fn assemble(
    partitioned: Partitioned,
    columns: Vec<String>,
    label_index: usize,
    scaler: Option<ScalerKind>,
    spec: &WindowSpec,
    seed: u64,
) -> Result<Datasets, DatasetError> {
    let Partitioned {
        values,
        source_rows,
        boundaries,
    } = partitioned;

    let parts = [
        ("train", &boundaries.train),
        ("validation", &boundaries.validation),
        ("test", &boundaries.test),
    ];
    for (partition, range) in parts {
        if range.len() < spec.min_rows() {
            return Err(DatasetError::InsufficientRows {
                partition,
                rows: range.len(),
                required: spec.min_rows(),
            });
        }
    }
    info!(
        "Partitions: train={} validation={} test={} (scaler: {})",
        boundaries.train.len(),
        boundaries.validation.len(),
        boundaries.test.len(),
        scaler.map_or_else(|| "none".to_string(), |k| k.to_string())
    );

    let offset = spec.label_offset();
    // Usable feature rows and their labels, both relative to the partition start.
    let split = |range: &Range<usize>| {
        let usable = range.len() - offset;
        let features = values.slice(s![range.start..range.start + usable, ..]);
        let labels = values.slice(s![range.start + offset..range.end, label_index..label_index + 1]);
        (features, labels)
    };
    let (train_x, train_y) = split(&boundaries.train);
    let (val_x, val_y) = split(&boundaries.validation);
    let (test_x, test_y) = split(&boundaries.test);

    let (scalers, [train_x, val_x, test_x], [train_y, val_y, test_y]) = match scaler {
        Some(kind) => {
            let mut features = kind.scaler();
            features.fit(values.slice(s![boundaries.train.clone(), ..]))?;
            let mut label = kind.scaler();
            label.fit(train_y)?;
            debug!("Fitted {} scalers on {} training rows", kind, boundaries.train.len());

            let xs = [
                features.transform(train_x)?,
                features.transform(val_x)?,
                features.transform(test_x)?,
            ];
            let ys = [
                label.transform(train_y)?,
                label.transform(val_y)?,
                label.transform(test_y)?,
            ];
            (Some(FittedScalers { features, label }), xs, ys)
        }
        None => (
            None,
            [train_x.to_owned(), val_x.to_owned(), test_x.to_owned()],
            [train_y.to_owned(), val_y.to_owned(), test_y.to_owned()],
        ),
    };

    let train = SequenceDataset::new(train_x, train_y, spec, true, seed, boundaries.train.start);
    let validation = SequenceDataset::new(
        val_x,
        val_y,
        spec,
        true,
        seed.wrapping_add(1),
        boundaries.validation.start,
    );
    let test = SequenceDataset::new(test_x, test_y, spec, false, seed, boundaries.test.start);

    Ok(Datasets {
        train,
        validation,
        test,
        boundaries,
        scalers,
        columns,
        source_rows,
    })
}
