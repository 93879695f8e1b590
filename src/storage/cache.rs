use async_trait::async_trait;
use chrono::NaiveDateTime;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::CacheConfig;
use crate::domain::prediction::PredictionResult;
use crate::domain::time::utc_time_key;
use crate::error::Result;

/// Column-oriented forecast body: row index -> value, per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheData {
    #[serde(rename = "startTimeUTC")]
    pub start_time_utc: BTreeMap<usize, String>,
    #[serde(rename = "percentRenewableForecast")]
    pub percent_renewable_forecast: BTreeMap<usize, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachePayload {
    pub data: CacheData,
    #[serde(rename = "timeInterval")]
    pub time_interval: u32,
    pub last_updated: String,
}

impl CachePayload {
    pub fn new(result: &PredictionResult, time_interval: u32, now: NaiveDateTime) -> Self {
        let start_time_utc = result
            .output
            .iter()
            .enumerate()
            .map(|(i, p)| (i, utc_time_key(&p.start_time_utc)))
            .collect();
        let percent_renewable_forecast = result
            .output
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.percent_renewable_forecast))
            .collect();
        Self {
            data: CacheData {
                start_time_utc,
                percent_renewable_forecast,
            },
            time_interval,
            last_updated: now.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        }
    }
}

/// Latest forecast per country for fast readers. Writes are best effort for
/// callers; the CSV store stays the durable record.
#[async_trait]
pub trait ForecastCache: Send + Sync {
    async fn store(&self, result: &PredictionResult, now: NaiveDateTime) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct RedisForecastCache {
    client: redis::Client,
    key_suffix: String,
    time_interval: u32,
}

impl RedisForecastCache {
    pub fn new(url: &str, key_suffix: impl Into<String>, time_interval: u32) -> Result<Self> {
        Ok(Self {
            client: redis::Client::open(url)?,
            key_suffix: key_suffix.into(),
            time_interval,
        })
    }

    /// `None` when no cache URL is configured.
    pub fn from_config(config: &CacheConfig) -> Result<Option<Self>> {
        config
            .redis_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| Self::new(url, config.key_suffix.clone(), config.time_interval_minutes))
            .transpose()
    }

    pub fn key_for(&self, country: &str) -> String {
        format!("{country}{}", self.key_suffix)
    }
}

#[async_trait]
impl ForecastCache for RedisForecastCache {
    async fn store(&self, result: &PredictionResult, now: NaiveDateTime) -> Result<()> {
        let key = self.key_for(result.country());
        let payload = serde_json::to_string(&CachePayload::new(result, self.time_interval, now))?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(&key, payload).await?;
        debug!(%key, "forecast cached");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
