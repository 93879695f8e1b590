use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::entsoe::EntsoeClient;
use crate::error::ForecastError;
use crate::forecast::RenewableShareEngine;
use crate::ml::{ForecastRunner, ModelRegistry};
use crate::storage::{ForecastCache, PredictionFileStore, RedisForecastCache, RunLog};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs the latest model per country and persists each result. Countries run
/// one after another; a failing country is recorded and the next one starts.
#[derive(Clone)]
pub struct BatchRunner {
    runner: ForecastRunner,
    store: PredictionFileStore,
    cache: Option<Arc<dyn ForecastCache>>,
    run_log: RunLog,
}

impl BatchRunner {
    pub fn new(
        runner: ForecastRunner,
        store: PredictionFileStore,
        cache: Option<Arc<dyn ForecastCache>>,
        run_log: RunLog,
    ) -> Self {
        Self {
            runner,
            store,
            cache,
            run_log,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let client = EntsoeClient::from_config(cfg).context("building ENTSO-E client")?;
        let engine = RenewableShareEngine::new(Arc::new(client));
        let runner = ForecastRunner::new(
            engine,
            ModelRegistry::from_config(&cfg.models),
            cfg.pipeline.clone(),
        );
        let cache = RedisForecastCache::from_config(&cfg.cache)
            .context("invalid cache URL")?
            .map(|c| Arc::new(c) as Arc<dyn ForecastCache>);
        Ok(Self::new(
            runner,
            PredictionFileStore::new(cfg.storage.predictions_dir.clone()),
            cache,
            RunLog::new(cfg.storage.logs_dir.clone()),
        ))
    }

    pub fn cache(&self) -> Option<&dyn ForecastCache> {
        self.cache.as_deref()
    }

    /// Forecast, save, cache (best effort) and log one country.
    pub async fn run_country(&self, country: &str, now: NaiveDateTime) -> crate::error::Result<()> {
        let result = self.runner.run_latest_model(country, now.date()).await?;
        self.store.save(&result)?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&result, now).await {
                warn!(country, error = %e, "cache write failed, continuing");
            }
        }
        self.run_log.append(&result, now)?;
        Ok(())
    }

    /// Every country with a model, or just `only` when given. Configuration
    /// errors abort the batch; anything else only fails its country.
    pub async fn run(&self, only: Option<&str>, now: NaiveDateTime) -> Result<BatchSummary> {
        let countries = match only {
            Some(country) => vec![country.to_uppercase()],
            None => self
                .runner
                .registry()
                .available_countries()
                .await
                .context("listing available models")?,
        };
        info!(count = countries.len(), "starting forecast batch");

        let mut summary = BatchSummary::default();
        for country in countries {
            info!(%country, "running forecast");
            match self.run_country(&country, now).await {
                Ok(()) => summary.succeeded.push(country),
                Err(e) if e.is_fatal_for_batch() => {
                    return Err(anyhow::Error::new(e).context(format!("forecast for {country}")));
                }
                Err(e) => {
                    error!(%country, error = %e, "forecast failed");
                    summary.failed.push((country, e.to_string()));
                }
            }
        }
        info!(
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            "forecast batch finished"
        );
        Ok(summary)
    }
}

/// Maps a batch failure to whether it came from configuration.
pub fn is_configuration_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ForecastError>()
        .is_some_and(ForecastError::is_fatal_for_batch)
}
