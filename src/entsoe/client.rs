use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, info};

use super::document::{parse_document, series_to_table};
use crate::config::Config;
use crate::domain::area::Area;
use crate::domain::table::TimeSeriesTable;
use crate::domain::time::utc_time_key;
use crate::error::{ForecastError, Result};
use crate::forecast::GenerationSource;

/// Environment variable the access token is read from.
pub const TOKEN_VARIABLE: &str = "ENTSOE_TOKEN";

/// `documentType` / `processType` pair of a transparency-platform data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataItem {
    pub document_type: &'static str,
    pub process_type: &'static str,
    /// Drop series reported against `outBiddingZone_Domain`.
    pub generation_only: bool,
}

/// Actual generation per production type (16.1.B&C).
pub const ACTUAL_GENERATION: DataItem = DataItem {
    document_type: "A75",
    process_type: "A16",
    generation_only: true,
};

/// Day-ahead aggregated generation forecast (14.1.C).
pub const TOTAL_FORECAST: DataItem = DataItem {
    document_type: "A71",
    process_type: "A01",
    generation_only: true,
};

/// Day-ahead wind and solar generation forecast (14.1.D).
pub const WIND_SOLAR_FORECAST: DataItem = DataItem {
    document_type: "A69",
    process_type: "A01",
    generation_only: true,
};

/// ENTSO-E Transparency Platform REST client.
#[derive(Clone)]
pub struct EntsoeClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl EntsoeClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("renewcast/0.2"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.entsoe.base_url.clone(),
            config.entsoe_token().map(str::to_string),
            Duration::from_secs(config.entsoe.http_timeout_seconds),
        )
    }

    fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| ForecastError::MissingCredential(TOKEN_VARIABLE.to_string()))
    }

    /// Raw XML body for one data item over `[start, end)`.
    pub async fn query(
        &self,
        item: DataItem,
        area: &Area,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<String> {
        let token = self.token()?;
        let period_start = utc_time_key(&start);
        let period_end = utc_time_key(&end);
        debug!(
            document_type = item.document_type,
            area = area.country,
            %period_start,
            %period_end,
            "querying transparency platform"
        );

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("securityToken", token),
                ("documentType", item.document_type),
                ("processType", item.process_type),
                ("in_Domain", area.eic),
                ("periodStart", period_start.as_str()),
                ("periodEnd", period_end.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            // the platform explains most rejections in an acknowledgement document
            let reason = match parse_document(&body) {
                Err(ForecastError::RemoteFetch(reason)) => reason,
                _ => body.chars().take(200).collect(),
            };
            return Err(ForecastError::RemoteFetch(format!("HTTP {status}: {reason}")));
        }
        Ok(body)
    }

    /// Fetches and pivots one data item into a table in the area's local time.
    pub async fn fetch_table(
        &self,
        item: DataItem,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeriesTable> {
        let area = Area::from_country(country)?;
        let body = self.query(item, &area, start, end).await?;
        let series = parse_document(&body)?;
        let table = series_to_table(&series, area.tz, item.generation_only)?;
        info!(
            country = area.country,
            document_type = item.document_type,
            rows = table.len(),
            columns = table.columns().len(),
            "transparency data fetched"
        );
        Ok(table)
    }
}

#[async_trait]
impl GenerationSource for EntsoeClient {
    async fn actual_generation(
        &self,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeriesTable> {
        self.fetch_table(ACTUAL_GENERATION, country, start, end).await
    }

    async fn total_forecast(
        &self,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeriesTable> {
        self.fetch_table(TOTAL_FORECAST, country, start, end).await
    }

    async fn wind_solar_forecast(
        &self,
        country: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TimeSeriesTable> {
        self.fetch_table(WIND_SOLAR_FORECAST, country, start, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_missing_token_fails_before_request() {
        let client = EntsoeClient::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        let start = Utc.with_ymd_and_hms(2023, 8, 14, 0, 0, 0).unwrap();
        let err = client
            .actual_generation("DE", start, start + chrono::Duration::days(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ForecastError::MissingCredential(ref v) if v == TOKEN_VARIABLE));
        assert!(err.is_fatal_for_batch());
    }

    #[tokio::test]
    async fn test_blank_token_counts_as_missing() {
        let client =
            EntsoeClient::new("http://127.0.0.1:9", Some("  ".into()), Duration::from_secs(1)).unwrap();
        assert!(client.token().is_err());
    }

    #[tokio::test]
    async fn test_unknown_country_is_rejected() {
        let client =
            EntsoeClient::new("http://127.0.0.1:9", Some("t".into()), Duration::from_secs(1)).unwrap();
        let start = Utc.with_ymd_and_hms(2023, 8, 14, 0, 0, 0).unwrap();
        let err = client
            .total_forecast("ZZ", start, start + chrono::Duration::days(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ForecastError::UnknownArea(_)));
    }
}
