use chrono::NaiveDateTime;
use itertools::Itertools;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::prediction::PredictionResult;
use crate::error::Result;

/// Monthly per-country text log with one line per forecast run.
#[derive(Debug, Clone)]
pub struct RunLog {
    dir: PathBuf,
}

fn bracketed(values: impl IntoIterator<Item = i64>) -> String {
    format!("[{}]", values.into_iter().join(", "))
}

impl RunLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<CC>-<MM>-<YYYY>.log`
    pub fn path_for(&self, country: &str, now: NaiveDateTime) -> PathBuf {
        self.dir
            .join(format!("{country}-{}.log", now.format("%m-%Y")))
    }

    /// `<now> : <model> <start> <end> [inputs] [outputs]`
    pub fn format_line(result: &PredictionResult, now: NaiveDateTime) -> String {
        format!(
            "{} : {} {} {} {} {}",
            now.format("%Y-%m-%d %H:%M:%S%.6f"),
            result.input.model,
            result.input.start,
            result.input.end,
            bracketed(result.input.percent_renewable.iter().copied()),
            bracketed(result.forecast_values()),
        )
    }

    pub fn append(&self, result: &PredictionResult, now: NaiveDateTime) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(result.country(), now);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", Self::format_line(result, now))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::{ForecastPoint, PredictionInput};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn result() -> PredictionResult {
        PredictionResult {
            input: PredictionInput {
                country: "FR".into(),
                model: "FR_v2".into(),
                percent_renewable: vec![30, 31, 33],
                start: "202308162100".into(),
                end: "202308162300".into(),
            },
            output: vec![
                ForecastPoint {
                    start_time_utc: Utc.with_ymd_and_hms(2023, 8, 17, 0, 0, 0).unwrap(),
                    percent_renewable_forecast: 34,
                },
                ForecastPoint {
                    start_time_utc: Utc.with_ymd_and_hms(2023, 8, 17, 1, 0, 0).unwrap(),
                    percent_renewable_forecast: 35,
                },
            ],
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 8, 17)
            .unwrap()
            .and_hms_micro_opt(6, 5, 9, 42)
            .unwrap()
    }

    #[test]
    fn test_line_format() {
        assert_eq!(
            RunLog::format_line(&result(), now()),
            "2023-08-17 06:05:09.000042 : FR_v2 202308162100 202308162300 [30, 31, 33] [34, 35]"
        );
    }

    #[test]
    fn test_append_creates_monthly_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("logs"));
        let path = log.append(&result(), now()).unwrap();
        log.append(&result(), now()).unwrap();
        assert!(path.ends_with("FR-08-2023.log"));
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
