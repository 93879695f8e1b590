//! Forecast persistence: CSV history, key-value cache and run log.

pub mod cache;
pub mod csv_store;
pub mod run_log;

pub use cache::{CachePayload, ForecastCache, RedisForecastCache};
pub use csv_store::PredictionFileStore;
pub use run_log::RunLog;
