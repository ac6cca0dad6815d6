mod client;
mod dataset;
mod error;
mod plot;
mod types;
mod utils;

pub use error::MetObsError;

pub use client::dmi::*;
pub use client::error::ClientError;
pub use client::query::{
    date_to_epoch_micros, epoch_micros_to_date, parse_date, ObservationQuery,
    DEFAULT_OBSERVATION_LIMIT,
};

pub use types::observation::{observations_to_frame, Observation, TIME_COLUMN};
pub use types::parameter::Parameter;
pub use types::station::{stations_to_frame, Location, Station};

pub use dataset::contiguous::{create_datasets, DEFAULT_VALIDATION_FRACTION};
pub use dataset::error::DatasetError;
pub use dataset::offset::{create_offset_datasets, DEFAULT_BLOCK_ROWS, DEFAULT_TRAIN_ROWS_PER_BLOCK};
pub use dataset::scaler::{AnyScaler, MinMaxScaler, Scaler, ScalerKind, StandardScaler};
pub use dataset::sequence::{Batch, Batches, SequenceDataset, WindowSpec};
pub use dataset::table::FeatureTable;
pub use dataset::{Datasets, FittedScalers, SplitBoundaries, DEFAULT_LABEL_COLUMN, DEFAULT_SEED};

pub use plot::error::PlotError;
pub use plot::{prediction_frame, training_frame, TrainingHistory};
#[cfg(feature = "plotting")]
pub use plot::{plot_prediction, plot_training};

pub use utils::default_key_path;
