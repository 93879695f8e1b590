use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use super::blend::blend_forecast;
use super::share::{add_wind_solar_total, compute_share, TOTAL};
use crate::domain::table::TimeSeriesTable;
use crate::error::Result;
use crate::refine::{refine, to_hourly, RefinedSeries, HOURLY_MINUTES};

/// Column the total-generation forecast arrives under.
pub const AGGREGATED_COLUMN: &str = "Actual Aggregated";

/// Raw generation data provider. Tables carry local-timezone timestamps of the
/// requested country and one column per source label.
#[async_trait]
pub trait GenerationSource: Send + Sync {
    async fn actual_generation(
        &self,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeriesTable>;

    async fn total_forecast(
        &self,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeriesTable>;

    async fn wind_solar_forecast(
        &self,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeriesTable>;
}

/// Fetch -> refine -> normalize -> share/blend for one country at a time.
#[derive(Clone)]
pub struct RenewableShareEngine {
    source: Arc<dyn GenerationSource>,
}

impl RenewableShareEngine {
    pub fn new(source: Arc<dyn GenerationSource>) -> Self {
        Self { source }
    }

    pub async fn refined_actual_generation(
        &self,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RefinedSeries> {
        let raw = self.source.actual_generation(country, start, end).await?;
        let refined = refine(raw)?;
        log_refinement(country, "actual generation", &refined);
        Ok(refined)
    }

    /// Total-generation forecast with its single column renamed to `total`.
    pub async fn refined_total_forecast(
        &self,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RefinedSeries> {
        let raw = self.source.total_forecast(country, start, end).await?;
        let mut refined = refine(raw)?;
        refined.table.rename_column(AGGREGATED_COLUMN, TOTAL);
        log_refinement(country, "total forecast", &refined);
        Ok(refined)
    }

    /// Wind/solar forecast with the `totalRenewable` column added.
    pub async fn refined_wind_solar_forecast(
        &self,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RefinedSeries> {
        let raw = self.source.wind_solar_forecast(country, start, end).await?;
        let mut refined = refine(raw)?;
        refined.table = add_wind_solar_total(refined.table)?;
        log_refinement(country, "wind/solar forecast", &refined);
        Ok(refined)
    }

    /// Renewable share of actual generation. With `interval60` the series is
    /// brought to hourly cadence first when it is not already hourly.
    pub async fn actual_percent_renewable(
        &self,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval60: bool,
    ) -> Result<TimeSeriesTable> {
        let refined = self.refined_actual_generation(country, start, end).await?;
        let table = if interval60 && refined.granularity_minutes != HOURLY_MINUTES {
            to_hourly(&refined.table, refined.granularity_minutes)?
        } else {
            refined.table
        };
        compute_share(table)
    }

    /// Hourly renewable-share forecast built from the total and wind/solar forecasts.
    pub async fn forecast_percent_renewable(
        &self,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeriesTable> {
        let total = hourly(self.refined_total_forecast(country, start, end).await?)?;
        let wind_solar = hourly(self.refined_wind_solar_forecast(country, start, end).await?)?;
        let blended = blend_forecast(&total, wind_solar)?;
        info!(country, rows = blended.len(), "renewable forecast assembled");
        Ok(blended)
    }
}

/// Hourly UTC table whatever the source cadence.
fn hourly(series: RefinedSeries) -> Result<TimeSeriesTable> {
    to_hourly(&series.table, series.granularity_minutes)
}

fn log_refinement(country: &str, dataset: &str, refined: &RefinedSeries) {
    info!(
        country,
        dataset,
        rows = refined.table.len(),
        granularity_minutes = refined.granularity_minutes,
        imputed = refined.log.imputed_count(),
        "series refined"
    );
}
