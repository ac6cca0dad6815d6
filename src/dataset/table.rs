//! Numeric view of a cleaned observation `DataFrame`.

use crate::dataset::error::DatasetError;
use chrono::{DateTime, NaiveDateTime, NaiveTime};
use ndarray::Array2;
use polars::prelude::*;

/// Every non-time column of a frame as an `f64` matrix, plus the timestamps if
/// the frame has a time column.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    columns: Vec<String>,
    values: Array2<f64>,
    times: Option<Vec<NaiveDateTime>>,
}

impl FeatureTable {
    /// Extracts the feature matrix from `frame`.
    ///
    /// The column named `time_column` is not a feature. When present it must be a
    /// `Datetime` or `Date` column without nulls; dates map to midnight. All other
    /// columns are cast to `f64`; string columns and nulls are rejected.
    pub fn from_frame(frame: &DataFrame, time_column: &str) -> Result<Self, DatasetError> {
        let mut columns = Vec::new();
        let mut data: Vec<Vec<f64>> = Vec::new();
        let mut times = None;

        for column in frame.get_columns() {
            let name = column.name().as_str();
            if name == time_column {
                times = Some(read_times(column)?);
                continue;
            }
            if matches!(column.dtype(), DataType::String) {
                return Err(DatasetError::NonNumericColumn(name.to_string()));
            }
            let cast = column.cast(&DataType::Float64)?;
            let values = cast.f64()?;
            let nulls = values.null_count();
            if nulls > 0 {
                return Err(DatasetError::MissingValues {
                    column: name.to_string(),
                    count: nulls,
                });
            }
            columns.push(name.to_string());
            data.push(values.into_no_null_iter().collect());
        }

        let rows = frame.height();
        let values = Array2::from_shape_fn((rows, data.len()), |(r, c)| data[c][r]);
        Ok(Self {
            columns,
            values,
            times,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows × features.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn times(&self) -> Option<&[NaiveDateTime]> {
        self.times.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails with [`DatasetError::UnsortedTimeColumn`] at the first row dated
    /// before its predecessor. Tables without timestamps pass.
    pub fn ensure_ascending(&self, time_column: &str) -> Result<(), DatasetError> {
        let Some(times) = self.times() else {
            return Ok(());
        };
        match times.windows(2).position(|w| w[1] < w[0]) {
            Some(i) => Err(DatasetError::UnsortedTimeColumn {
                column: time_column.to_string(),
                row: i + 1,
            }),
            None => Ok(()),
        }
    }

    /// Position of a feature column.
    pub fn column_index(&self, name: &str) -> Result<usize, DatasetError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }
}

fn read_times(column: &Column) -> Result<Vec<NaiveDateTime>, DatasetError> {
    let invalid = || DatasetError::InvalidTimeColumn {
        column: column.name().to_string(),
        dtype: column.dtype().to_string(),
    };
    let nulls = column.null_count();
    if nulls > 0 && matches!(column.dtype(), DataType::Datetime(_, _) | DataType::Date) {
        return Err(DatasetError::MissingValues {
            column: column.name().to_string(),
            count: nulls,
        });
    }
    match column.dtype() {
        DataType::Date => Ok(column
            .date()?
            .as_date_iter()
            .flatten()
            .map(|d| d.and_time(NaiveTime::MIN))
            .collect()),
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            column
                .datetime()?
                .into_iter()
                .flatten()
                .map(|t| {
                    let dt = match unit {
                        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(t),
                        TimeUnit::Microseconds => DateTime::from_timestamp_micros(t),
                        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(t)),
                    };
                    dt.map(|dt| dt.naive_utc()).ok_or_else(invalid)
                })
                .collect()
        }
        _ => Err(invalid()),
    }
}
