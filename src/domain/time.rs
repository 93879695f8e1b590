use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{ForecastError, Result};

/// Fixed-width `YYYYMMDDhhmm` used for every timestamp crossing a boundary.
pub const TIME_KEY_FORMAT: &str = "%Y%m%d%H%M";

/// Formats an instant as a UTC `YYYYMMDDhhmm` key.
pub fn utc_time_key<Z: TimeZone>(timestamp: &DateTime<Z>) -> String {
    timestamp
        .with_timezone(&Utc)
        .format(TIME_KEY_FORMAT)
        .to_string()
}

pub fn parse_time_key(key: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(key.trim(), TIME_KEY_FORMAT)
        .map_err(|e| ForecastError::Parse(format!("invalid time key '{key}': {e}")))?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Run window: midnight `history_days` before `today` to midnight `lookahead_days` after.
pub fn run_date_range(
    today: NaiveDate,
    history_days: i64,
    lookahead_days: i64,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = Utc.from_utc_datetime(&today.and_hms_opt(0, 0, 0).unwrap_or_default());
    (
        midnight - Duration::days(history_days),
        midnight + Duration::days(lookahead_days),
    )
}

/// Serde adapter for `DateTime<Utc>` fields stored as `YYYYMMDDhhmm`.
pub mod time_key {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::utc_time_key(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_key(&raw).map_err(serde::de::Error::custom)
    }
}
