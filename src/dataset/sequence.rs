//! Fixed-length sequence windows paired with single-step labels.
//!
//! Window `i` of a [`SequenceDataset`] is made of feature rows
//! `i, i + sampling_rate, …, i + (sequence_length - 1) * sampling_rate` and is
//! paired with `labels[i]`. Windows are grouped into batches; training and
//! validation sets visit them in a seeded random order, test sets in order.

use crate::dataset::error::DatasetError;
use ndarray::{Array2, Array3, ArrayView1, ArrayView2, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Window geometry shared by all partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    /// Rows spanned by one window.
    pub lookback: usize,
    /// Rows between the end of a window and its label.
    pub horizon: usize,
    /// Stride between sampled rows inside a window.
    pub steps: usize,
    pub batch_size: usize,
}

impl WindowSpec {
    pub fn validate(&self) -> Result<(), DatasetError> {
        let positive = [
            ("lookback", self.lookback),
            ("steps", self.steps),
            ("batch_size", self.batch_size),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(DatasetError::InvalidParameter {
                    name,
                    reason: "must be greater than 0".to_string(),
                });
            }
        }
        if self.steps > self.lookback {
            return Err(DatasetError::InvalidParameter {
                name: "steps",
                reason: format!(
                    "stride {} is larger than lookback {}",
                    self.steps, self.lookback
                ),
            });
        }
        Ok(())
    }

    /// Sampled rows per window (`lookback / steps`).
    pub fn sequence_length(&self) -> usize {
        self.lookback / self.steps
    }

    /// Distance from a window's first row to its label row.
    pub fn label_offset(&self) -> usize {
        self.lookback + self.horizon
    }

    /// Smallest partition that still yields one window.
    pub fn min_rows(&self) -> usize {
        self.label_offset() + (self.sequence_length() - 1) * self.steps + 1
    }
}

/// One batch: inputs shaped `(batch, sequence_length, features)`, targets `(batch, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub inputs: Array3<f64>,
    pub targets: Array2<f64>,
}

/// Windows and labels of one partition.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDataset {
    features: Array2<f64>,
    labels: Array2<f64>,
    sequence_length: usize,
    sampling_rate: usize,
    batch_size: usize,
    shuffle: bool,
    seed: u64,
    /// Position of feature row 0 in the reference table.
    start: usize,
    lookback: usize,
    horizon: usize,
}

impl SequenceDataset {
    /// `features` are the usable (already scaled) rows of a partition and `labels`
    /// holds one label per usable row. The number of windows is capped by both.
    pub(crate) fn new(
        features: Array2<f64>,
        labels: Array2<f64>,
        spec: &WindowSpec,
        shuffle: bool,
        seed: u64,
        start: usize,
    ) -> Self {
        Self {
            features,
            labels,
            sequence_length: spec.sequence_length(),
            sampling_rate: spec.steps,
            batch_size: spec.batch_size,
            shuffle,
            seed,
            start,
            lookback: spec.lookback,
            horizon: spec.horizon,
        }
    }

    /// Number of `(window, label)` pairs.
    pub fn len(&self) -> usize {
        let span = (self.sequence_length - 1) * self.sampling_rate;
        self.features
            .nrows()
            .saturating_sub(span)
            .min(self.labels.nrows())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn sampling_rate(&self) -> usize {
        self.sampling_rate
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffle
    }

    pub fn n_batches(&self) -> usize {
        self.len().div_ceil(self.batch_size)
    }

    /// Scaled feature rows the windows are sampled from.
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Scaled labels, one per window.
    pub fn labels(&self) -> ArrayView1<'_, f64> {
        self.labels.column(0)
    }

    /// The `i`-th window, shaped `(sequence_length, features)`.
    pub fn window(&self, i: usize) -> Option<Array2<f64>> {
        if i >= self.len() {
            return None;
        }
        let rows: Vec<usize> = self.window_rows(i).collect();
        Some(self.features.select(Axis(0), &rows))
    }

    pub fn label(&self, i: usize) -> Option<f64> {
        (i < self.len()).then(|| self.labels[[i, 0]])
    }

    /// Reference-table positions of the rows sampled for window `i`.
    pub fn window_positions(&self, i: usize) -> Vec<usize> {
        self.window_rows(i).map(|r| self.start + r).collect()
    }

    /// Exclusive end of window `i`'s lookback span in the reference table.
    pub fn window_end(&self, i: usize) -> usize {
        self.start + i + self.lookback
    }

    /// Reference-table position the label of window `i` was read from,
    /// always `window_end(i) + horizon`.
    pub fn label_position(&self, i: usize) -> usize {
        self.window_end(i) + self.horizon
    }

    fn window_rows(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.sequence_length).map(move |k| i + k * self.sampling_rate)
    }

    /// Batches for the first epoch.
    pub fn batches(&self) -> Batches<'_> {
        self.batches_for_epoch(0)
    }

    /// Batches for `epoch`. Shuffled datasets draw a new order per epoch from a
    /// generator seeded with `seed + epoch`, so runs are reproducible.
    pub fn batches_for_epoch(&self, epoch: u64) -> Batches<'_> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        if self.shuffle {
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(epoch));
            order.shuffle(&mut rng);
        }
        Batches {
            dataset: self,
            order,
            cursor: 0,
        }
    }
}

/// Iterator over the batches of a [`SequenceDataset`]. The last batch may be short.
pub struct Batches<'a> {
    dataset: &'a SequenceDataset,
    order: Vec<usize>,
    cursor: usize,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.dataset.batch_size).min(self.order.len());
        let picked = &self.order[self.cursor..end];
        self.cursor = end;

        let ds = self.dataset;
        let inputs = Array3::from_shape_fn(
            (picked.len(), ds.sequence_length, ds.n_features()),
            |(b, t, f)| ds.features[[picked[b] + t * ds.sampling_rate, f]],
        );
        let targets = Array2::from_shape_fn((picked.len(), 1), |(b, _)| ds.labels[[picked[b], 0]]);
        Some(Batch { inputs, targets })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.order.len() - self.cursor).div_ceil(self.dataset.batch_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches<'_> {}
