//! demos/plot_training.rs
//!
//! Plots a training history read from a JSON file (`{"loss": [...], "val_loss": [...]}`)
//! and an example forecast against its true future.
//!
//! cargo run --example plot_training --features plotting [history.json]

use metobs::{plot_prediction, plot_training, TrainingHistory};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let history: TrainingHistory = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => TrainingHistory {
            loss: vec![0.92, 0.51, 0.37, 0.31, 0.28, 0.27],
            val_loss: vec![0.88, 0.55, 0.43, 0.40, 0.39, 0.40],
        },
    };
    plot_training(&history, "Training and validation loss")?;

    let window: Vec<f64> = (0..72).map(|h| (h as f64 / 12.0).sin() * 4.0 + 6.0).collect();
    plot_prediction(&window, &[7.9], 7.4, 12, "Single step prediction")?;
    Ok(())
}
