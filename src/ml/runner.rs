use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::info;

use super::registry::ModelRegistry;
use super::scaler::StandardScaler;
use super::SequenceModel;
use crate::config::PipelineConfig;
use crate::domain::prediction::{ForecastPoint, PredictionInput, PredictionResult};
use crate::domain::table::{round_half_even, TimeSeriesTable};
use crate::domain::time::{run_date_range, utc_time_key};
use crate::error::{ForecastError, Result};
use crate::forecast::{RenewableShareEngine, PERCENT_RENEWABLE};

/// Hourly steps produced by every model run.
pub const FORECAST_HORIZON_HOURS: usize = 48;

/// Trailing slice of the renewable-share series fed to a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelWindow {
    pub values: Vec<f64>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Last `input_sequence` rows of `percentRenewable`. Shorter series are
/// rejected rather than silently feeding the model a shorter window.
pub fn model_input(table: &TimeSeriesTable, input_sequence: usize) -> Result<ModelWindow> {
    if input_sequence < 2 {
        return Err(ForecastError::Model(format!(
            "input sequence of {input_sequence} leaves no model window"
        )));
    }
    if table.len() < input_sequence {
        return Err(ForecastError::InsufficientData {
            required: input_sequence,
            available: table.len(),
        });
    }
    let tail = table.tail(input_sequence);
    let values = tail
        .require_column(PERCENT_RENEWABLE)?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    let (Some(start), Some(end)) = (tail.rows().first(), tail.rows().last()) else {
        return Err(ForecastError::InsufficientData {
            required: input_sequence,
            available: 0,
        });
    };
    Ok(ModelWindow {
        values,
        start: start.timestamp.with_timezone(&Utc),
        end: end.timestamp.with_timezone(&Utc),
    })
}

/// `horizon` hourly instants starting one hour after `last`.
pub fn forecast_timestamps(last: DateTime<Utc>, horizon: usize) -> Vec<DateTime<Utc>> {
    (1..=horizon as i64).map(|h| last + Duration::hours(h)).collect()
}

/// Iterative forecast: each step standardizes the trailing `N - 1` values with a
/// freshly fitted scaler, predicts, de-standardizes and rolls the window.
/// Outputs are rounded half-to-even and floored at 0.
pub fn run_model(model: &dyn SequenceModel, window: &[f64], horizon: usize) -> Result<Vec<i64>> {
    if window.len() < 2 {
        return Err(ForecastError::InsufficientData {
            required: 2,
            available: window.len(),
        });
    }
    let lookback = window.len() - 1;
    let mut history = window.to_vec();
    let mut forecast = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        let recent = &history[history.len() - lookback..];
        let scaler = StandardScaler::fit(recent);
        let predicted = scaler.inverse_transform(model.predict(&scaler.transform(recent))?);
        if !predicted.is_finite() {
            return Err(ForecastError::Model(format!("non-finite prediction {predicted}")));
        }
        forecast.push(predicted);
        history.push(predicted);
        history.remove(0);
    }
    Ok(forecast
        .into_iter()
        .map(|v| round_half_even(v).max(0.0) as i64)
        .collect())
}

/// Resolves the latest model for a country and produces its forecast.
#[derive(Clone)]
pub struct ForecastRunner {
    engine: RenewableShareEngine,
    registry: ModelRegistry,
    pipeline: PipelineConfig,
}

impl ForecastRunner {
    pub fn new(engine: RenewableShareEngine, registry: ModelRegistry, pipeline: PipelineConfig) -> Self {
        Self {
            engine,
            registry,
            pipeline,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Model resolution happens before any fetch, so an unknown model never
    /// costs a remote call.
    pub async fn run_latest_model(&self, country: &str, today: NaiveDate) -> Result<PredictionResult> {
        let model_name = self.registry.latest_model_for(country).await?;
        let meta = self.registry.metadata(&model_name).await?;
        let model = self.registry.load(&model_name).await?;

        let (start, end) = run_date_range(today, self.pipeline.history_days, self.pipeline.lookahead_days);
        let series = self
            .engine
            .forecast_percent_renewable(&meta.country, start, end)
            .await?;
        let window = model_input(&series, meta.input_sequence)?;
        let values = run_model(model.as_ref(), &window.values, FORECAST_HORIZON_HOURS)?;

        let output = forecast_timestamps(window.end, values.len())
            .into_iter()
            .zip(values)
            .map(|(start_time_utc, percent_renewable_forecast)| ForecastPoint {
                start_time_utc,
                percent_renewable_forecast,
            })
            .collect::<Vec<_>>();
        info!(
            country = %meta.country,
            model = %model_name,
            input_end = %utc_time_key(&window.end),
            points = output.len(),
            "forecast produced"
        );

        Ok(PredictionResult {
            input: PredictionInput {
                country: meta.country,
                model: model_name,
                percent_renewable: window.values.iter().map(|v| *v as i64).collect(),
                start: utc_time_key(&window.start),
                end: utc_time_key(&window.end),
            },
            output,
        })
    }
}
