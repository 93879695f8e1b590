use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::time::time_key;

/// One hourly renewable-share forecast value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(rename = "startTimeUTC", with = "time_key")]
    pub start_time_utc: DateTime<Utc>,
    #[serde(rename = "percentRenewableForecast")]
    pub percent_renewable_forecast: i64,
}

/// What the model was fed: the trailing window of the renewable-share series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub country: String,
    pub model: String,
    #[serde(rename = "percentRenewable")]
    pub percent_renewable: Vec<i64>,
    /// `YYYYMMDDhhmm` of the first input sample.
    pub start: String,
    /// `YYYYMMDDhhmm` of the last input sample.
    pub end: String,
}

/// Built fresh per run and handed by value to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub input: PredictionInput,
    pub output: Vec<ForecastPoint>,
}

impl PredictionResult {
    pub fn country(&self) -> &str {
        &self.input.country
    }

    pub fn forecast_values(&self) -> Vec<i64> {
        self.output
            .iter()
            .map(|p| p.percent_renewable_forecast)
            .collect()
    }
}
