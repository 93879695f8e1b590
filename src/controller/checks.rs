use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::entsoe::client::TOKEN_VARIABLE;
use crate::error::{ForecastError, Result};
use crate::storage::ForecastCache;

/// Outcome of the pre-flight checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub created_dirs: Vec<PathBuf>,
    /// `None` when no cache is configured.
    pub cache_reachable: Option<bool>,
}

/// Verifies the token is configured, creates missing output directories and
/// pings the cache. Only a missing token is an error.
pub async fn run_checks(cfg: &Config, cache: Option<&dyn ForecastCache>) -> Result<CheckReport> {
    if cfg.entsoe_token().is_none() {
        return Err(ForecastError::MissingCredential(TOKEN_VARIABLE.to_string()));
    }

    let mut report = CheckReport::default();
    for dir in [&cfg.storage.logs_dir, &cfg.storage.predictions_dir] {
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await?;
            info!(path = %dir.display(), "created folder");
            report.created_dirs.push(dir.clone());
        }
    }

    report.cache_reachable = match cache {
        Some(cache) => match cache.ping().await {
            Ok(()) => Some(true),
            Err(e) => {
                warn!(error = %e, "cache server not reachable");
                Some(false)
            }
        },
        None => {
            warn!("no cache configured, forecasts are written to files only");
            None
        }
    };
    Ok(report)
}
