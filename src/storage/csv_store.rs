use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::prediction::{ForecastPoint, PredictionResult};
use crate::domain::time::parse_time_key;
use crate::error::{ForecastError, Result};

#[derive(Debug, Deserialize)]
struct StoredRow {
    #[serde(rename = "startTimeUTC")]
    start_time_utc: String,
    #[serde(rename = "percentRenewableForecast")]
    percent_renewable_forecast: f64,
}

/// Accepts `YYYYMMDDhhmm` and the `YYYY-MM-DD hh:mm:ss` form older files were written with.
fn parse_stored_time(text: &str) -> Result<DateTime<Utc>> {
    parse_time_key(text).or_else(|err| {
        NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S")
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|_| err)
    })
}

/// Per-country `<CC>.csv` history of forecasts, merged by timestamp.
#[derive(Debug, Clone)]
pub struct PredictionFileStore {
    dir: PathBuf,
}

impl PredictionFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, country: &str) -> PathBuf {
        self.dir.join(format!("{country}.csv"))
    }

    /// Stored points ordered by time. Absent and empty files are an empty history.
    pub fn load(&self, country: &str) -> Result<Vec<ForecastPoint>> {
        Ok(self
            .read_history(&self.path_for(country))?
            .into_iter()
            .map(|(start_time_utc, percent_renewable_forecast)| ForecastPoint {
                start_time_utc,
                percent_renewable_forecast,
            })
            .collect())
    }

    fn read_history(&self, path: &Path) -> Result<BTreeMap<DateTime<Utc>, i64>> {
        let mut history = BTreeMap::new();
        if !path.exists() || fs::metadata(path)?.len() == 0 {
            return Ok(history);
        }
        let mut reader = csv::Reader::from_path(path)?;
        for row in reader.deserialize::<StoredRow>() {
            let row = row?;
            let timestamp = parse_stored_time(&row.start_time_utc)?;
            if !row.percent_renewable_forecast.is_finite() {
                return Err(ForecastError::Parse(format!(
                    "non-numeric forecast at {}",
                    row.start_time_utc
                )));
            }
            history.insert(timestamp, row.percent_renewable_forecast.round() as i64);
        }
        Ok(history)
    }

    /// Merges `result.output` into the country file; new values win on equal timestamps.
    pub fn save(&self, result: &PredictionResult) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(result.country());
        let mut history = self.read_history(&path)?;
        let previous = history.len();
        for point in &result.output {
            history.insert(point.start_time_utc, point.percent_renewable_forecast);
        }

        let mut writer = csv::Writer::from_path(&path)?;
        for (start_time_utc, percent_renewable_forecast) in history.iter() {
            writer.serialize(ForecastPoint {
                start_time_utc: *start_time_utc,
                percent_renewable_forecast: *percent_renewable_forecast,
            })?;
        }
        writer.flush()?;
        debug!(path = %path.display(), previous, total = history.len(), "prediction file merged");
        info!(country = result.country(), rows = result.output.len(), "predictions saved");
        Ok(path)
    }
}
