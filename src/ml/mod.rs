//! Sequence models and the iterative forecast they drive.
//!
//! A model sees a standardized window of `input_sequence - 1` renewable-share
//! values and returns the next standardized value; the runner de-standardizes
//! it, rolls the window forward and repeats for the forecast horizon.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod models;
pub mod registry;
pub mod runner;
pub mod scaler;

pub use models::{LinearSequenceModel, ModelFile, MovingAverageModel};
pub use registry::ModelRegistry;
pub use runner::ForecastRunner;
pub use scaler::StandardScaler;

/// One-step-ahead predictor over a fixed-length numeric window. Stateless per call.
pub trait SequenceModel: Send + Sync {
    fn predict(&self, window: &[f64]) -> Result<f64>;

    /// Window length the model was trained on, when it is fixed.
    fn window_len(&self) -> Option<usize> {
        None
    }
}

/// Registry record for one trained model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub country: String,
    /// Trailing historical points the model consumes.
    pub input_sequence: usize,
}
