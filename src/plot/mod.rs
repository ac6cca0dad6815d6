//! Chart data for training curves and forecasts.
//!
//! The frame builders are always available. Rendering them in the browser with
//! `plotlars` needs the `plotting` feature.

pub mod error;

use crate::plot::error::PlotError;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-epoch losses reported by a training loop.
///
/// Deserializes from the usual `{"loss": [...], "val_loss": [...]}` history JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub loss: Vec<f64>,
    pub val_loss: Vec<f64>,
}

impl TrainingHistory {
    pub fn epochs(&self) -> usize {
        self.loss.len()
    }
}

/// Columns `epoch`, `loss`, `val_loss`, one row per epoch starting at 0.
pub fn training_frame(history: &TrainingHistory) -> Result<DataFrame, PlotError> {
    if history.loss.is_empty() {
        return Err(PlotError::EmptySeries("loss"));
    }
    if history.loss.len() != history.val_loss.len() {
        return Err(PlotError::LengthMismatch {
            left: "loss",
            left_len: history.loss.len(),
            right: "val_loss",
            right_len: history.val_loss.len(),
        });
    }
    let epochs: Vec<u32> = (0..history.epochs() as u32).collect();
    Ok(df!(
        "epoch" => epochs,
        "loss" => &history.loss,
        "val_loss" => &history.val_loss
    )?)
}

/// Lines up a history window, the true future and one prediction on a shared step axis.
///
/// History points sit at steps `-n..=-1`, the true future starts at step
/// `delta` and the prediction is placed at `delta`. Columns are `step`,
/// `history`, `true_future` and `prediction`; cells outside a series are null.
pub fn prediction_frame(
    history: &[f64],
    true_future: &[f64],
    prediction: f64,
    delta: usize,
) -> Result<DataFrame, PlotError> {
    if history.is_empty() {
        return Err(PlotError::EmptySeries("history"));
    }
    if true_future.is_empty() {
        return Err(PlotError::EmptySeries("true_future"));
    }
    let n = history.len();
    let rows = n + true_future.len();

    let steps: Vec<i64> = (0..rows)
        .map(|r| {
            if r < n {
                r as i64 - n as i64
            } else {
                (delta + r - n) as i64
            }
        })
        .collect();
    let history_col: Vec<Option<f64>> = (0..rows).map(|r| history.get(r).copied()).collect();
    let future_col: Vec<Option<f64>> = (0..rows)
        .map(|r| r.checked_sub(n).and_then(|i| true_future.get(i).copied()))
        .collect();
    let prediction_col: Vec<Option<f64>> = (0..rows)
        .map(|r| (r == n).then_some(prediction))
        .collect();

    Ok(df!(
        "step" => steps,
        "history" => history_col,
        "true_future" => future_col,
        "prediction" => prediction_col
    )?)
}

/// Opens a line chart of training and validation loss.
#[cfg(feature = "plotting")]
pub fn plot_training(history: &TrainingHistory, title: &str) -> Result<(), PlotError> {
    use plotlars::{Legend, Line, Plot, Rgb, Shape, Text, TimeSeriesPlot};

    let frame = with_string_axis(training_frame(history)?, "epoch")?;
    TimeSeriesPlot::builder()
        .data(&frame)
        .x("epoch")
        .y("loss")
        .additional_series(vec!["val_loss"])
        .colors(vec![Rgb(31, 119, 180), Rgb(214, 39, 40)])
        .lines(vec![Line::Solid, Line::Solid])
        .with_shape(true)
        .shapes(vec![Shape::Circle, Shape::Circle])
        .plot_title(Text::from(title).size(18))
        .x_title("Epochs")
        .y_title("Loss")
        .legend(&Legend::new().x(0.8).y(0.95))
        .build()
        .plot();
    Ok(())
}

/// Opens a chart of the history window, the true future and the prediction.
#[cfg(feature = "plotting")]
pub fn plot_prediction(
    history: &[f64],
    true_future: &[f64],
    prediction: f64,
    delta: usize,
    title: &str,
) -> Result<(), PlotError> {
    use plotlars::{Legend, Line, Plot, Rgb, Shape, Text, TimeSeriesPlot};

    let frame = with_string_axis(
        prediction_frame(history, true_future, prediction, delta)?,
        "step",
    )?;
    TimeSeriesPlot::builder()
        .data(&frame)
        .x("step")
        .y("history")
        .additional_series(vec!["true_future", "prediction"])
        .colors(vec![Rgb(31, 119, 180), Rgb(44, 160, 44), Rgb(214, 39, 40)])
        .lines(vec![Line::Solid, Line::Dash, Line::Dot])
        .with_shape(true)
        .shapes(vec![Shape::Circle, Shape::Square, Shape::Cross])
        .plot_title(Text::from(title).size(18))
        .x_title("Time step")
        .legend(&Legend::new().x(0.05).y(0.95))
        .build()
        .plot();
    Ok(())
}

// TimeSeriesPlot reads its x axis as text.
#[cfg(feature = "plotting")]
fn with_string_axis(mut frame: DataFrame, column: &str) -> Result<DataFrame, PlotError> {
    let axis = frame.column(column)?.cast(&DataType::String)?;
    frame.with_column(axis)?;
    Ok(frame)
}
