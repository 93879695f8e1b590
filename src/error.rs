use thiserror::Error;

/// Errors raised by the ingestion, refinement and forecasting pipeline.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("unknown area: {0}")]
    UnknownArea(String),

    /// Two independently processed series were paired by position but differ in length.
    #[error("misaligned series in {context}: {left} rows vs {right} rows")]
    MisalignedSeries {
        context: &'static str,
        left: usize,
        right: usize,
    },

    #[error("insufficient data: need {required} rows, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("invalid granularity: {0} minutes")]
    InvalidGranularity(f64),

    /// Upsampling (granularity above one hour) has no defined policy.
    #[error("unsupported granularity for hourly normalization: {0} minutes")]
    UnsupportedGranularity(f64),

    #[error("column mismatch: expected {expected} values, got {actual}")]
    ColumnMismatch { expected: usize, actual: usize },

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ForecastError {
    /// Configuration errors abort a whole batch; everything else only the current country.
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(self, ForecastError::MissingCredential(_))
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(error: reqwest::Error) -> Self {
        ForecastError::RemoteFetch(error.to_string())
    }
}

impl From<redis::RedisError> for ForecastError {
    fn from(error: redis::RedisError) -> Self {
        ForecastError::Cache(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
