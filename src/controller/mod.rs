pub mod batch;
pub mod checks;

use std::sync::Arc;

use crate::config::Config;
use crate::storage::PredictionFileStore;

pub use batch::{BatchRunner, BatchSummary};
pub use checks::{run_checks, CheckReport};

/// Shared state of the prediction web service.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub store: Arc<PredictionFileStore>,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        let store = Arc::new(PredictionFileStore::new(cfg.storage.predictions_dir.clone()));
        Self { cfg, store }
    }
}
