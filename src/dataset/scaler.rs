//! Column-wise feature scalers.
//!
//! Scalers are fit on one matrix (rows = samples, columns = features) and then
//! applied unchanged to others, so statistics come only from the data passed to
//! [`Scaler::fit`].

use crate::dataset::error::DatasetError;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use std::fmt;
use std::str::FromStr;

/// A column-wise transformation learned from a training matrix.
pub trait Scaler {
    /// Learns the per-column statistics from `data`. Refitting replaces them.
    fn fit(&mut self, data: ArrayView2<'_, f64>) -> Result<(), DatasetError>;

    /// Applies the learned statistics without changing them.
    fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, DatasetError>;

    /// Maps scaled values back to the original units.
    fn inverse_transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, DatasetError>;

    fn fit_transform(&mut self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, DatasetError> {
        self.fit(data)?;
        self.transform(data)
    }
}

/// Which scaler to build.
///
/// ```
/// use metobs::ScalerKind;
///
/// assert_eq!("minmax".parse::<ScalerKind>().unwrap(), ScalerKind::MinMax);
/// assert!("robust".parse::<ScalerKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalerKind {
    /// Zero mean, unit variance per column.
    #[default]
    Standard,
    /// Rescale each column to `[0, 1]`.
    MinMax,
}

impl ScalerKind {
    /// A new, unfitted scaler of this kind.
    pub fn scaler(self) -> AnyScaler {
        match self {
            ScalerKind::Standard => AnyScaler::Standard(StandardScaler::default()),
            ScalerKind::MinMax => AnyScaler::MinMax(MinMaxScaler::default()),
        }
    }
}

impl FromStr for ScalerKind {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(ScalerKind::Standard),
            "minmax" => Ok(ScalerKind::MinMax),
            other => Err(DatasetError::UnknownScaler(other.to_string())),
        }
    }
}

impl fmt::Display for ScalerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalerKind::Standard => write!(f, "standard"),
            ScalerKind::MinMax => write!(f, "minmax"),
        }
    }
}

fn check_rows(data: &ArrayView2<'_, f64>) -> Result<(), DatasetError> {
    if data.nrows() == 0 {
        return Err(DatasetError::InvalidParameter {
            name: "data",
            reason: "cannot fit a scaler on zero rows".to_string(),
        });
    }
    Ok(())
}

fn check_width(expected: usize, data: &ArrayView2<'_, f64>) -> Result<(), DatasetError> {
    if data.ncols() != expected {
        return Err(DatasetError::ShapeMismatch {
            expected,
            found: data.ncols(),
        });
    }
    Ok(())
}

// Constant columns would divide by zero; they are left unscaled instead.
fn guard_zero(mut scale: Array1<f64>) -> Array1<f64> {
    scale.mapv_inplace(|s| if s == 0.0 { 1.0 } else { s });
    scale
}

/// Standardizes columns to zero mean and unit (population) variance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    /// Per-column mean learned by `fit`.
    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    /// Per-column standard deviation learned by `fit` (1.0 for constant columns).
    pub fn scale(&self) -> Option<&Array1<f64>> {
        self.scale.as_ref()
    }

    fn fitted(&self) -> Result<(&Array1<f64>, &Array1<f64>), DatasetError> {
        match (&self.mean, &self.scale) {
            (Some(mean), Some(scale)) => Ok((mean, scale)),
            _ => Err(DatasetError::NotFitted),
        }
    }
}

impl Scaler for StandardScaler {
    fn fit(&mut self, data: ArrayView2<'_, f64>) -> Result<(), DatasetError> {
        check_rows(&data)?;
        let mean = data.mean_axis(Axis(0)).ok_or(DatasetError::NotFitted)?;
        let std = data.std_axis(Axis(0), 0.0);
        self.mean = Some(mean);
        self.scale = Some(guard_zero(std));
        Ok(())
    }

    fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, DatasetError> {
        let (mean, scale) = self.fitted()?;
        check_width(mean.len(), &data)?;
        Ok((&data - mean) / scale)
    }

    fn inverse_transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, DatasetError> {
        let (mean, scale) = self.fitted()?;
        check_width(mean.len(), &data)?;
        Ok(&data * scale + mean)
    }
}

/// Rescales each column linearly so the fitted minimum maps to 0 and the maximum to 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinMaxScaler {
    data_min: Option<Array1<f64>>,
    data_range: Option<Array1<f64>>,
}

impl MinMaxScaler {
    /// Per-column minimum learned by `fit`.
    pub fn data_min(&self) -> Option<&Array1<f64>> {
        self.data_min.as_ref()
    }

    /// Per-column maximum learned by `fit`.
    pub fn data_max(&self) -> Option<Array1<f64>> {
        let (min, range) = self.fitted().ok()?;
        Some(min + range)
    }

    fn fitted(&self) -> Result<(&Array1<f64>, &Array1<f64>), DatasetError> {
        match (&self.data_min, &self.data_range) {
            (Some(min), Some(range)) => Ok((min, range)),
            _ => Err(DatasetError::NotFitted),
        }
    }
}

impl Scaler for MinMaxScaler {
    fn fit(&mut self, data: ArrayView2<'_, f64>) -> Result<(), DatasetError> {
        check_rows(&data)?;
        let min = data.fold_axis(Axis(0), f64::INFINITY, |acc, &v| acc.min(v));
        let max = data.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &v| acc.max(v));
        let range = &max - &min;
        self.data_min = Some(min);
        self.data_range = Some(guard_zero(range));
        Ok(())
    }

    fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, DatasetError> {
        let (min, range) = self.fitted()?;
        check_width(min.len(), &data)?;
        Ok((&data - min) / range)
    }

    fn inverse_transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, DatasetError> {
        let (min, range) = self.fitted()?;
        check_width(min.len(), &data)?;
        Ok(&data * range + min)
    }
}

/// Either scaler, chosen at runtime through [`ScalerKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnyScaler {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl AnyScaler {
    pub fn kind(&self) -> ScalerKind {
        match self {
            AnyScaler::Standard(_) => ScalerKind::Standard,
            AnyScaler::MinMax(_) => ScalerKind::MinMax,
        }
    }

    fn inner(&self) -> &dyn Scaler {
        match self {
            AnyScaler::Standard(s) => s,
            AnyScaler::MinMax(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Scaler {
        match self {
            AnyScaler::Standard(s) => s,
            AnyScaler::MinMax(s) => s,
        }
    }
}

impl Scaler for AnyScaler {
    fn fit(&mut self, data: ArrayView2<'_, f64>) -> Result<(), DatasetError> {
        self.inner_mut().fit(data)
    }

    fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, DatasetError> {
        self.inner().transform(data)
    }

    fn inverse_transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, DatasetError> {
        self.inner().inverse_transform(data)
    }
}
