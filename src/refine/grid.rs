use chrono::{DateTime, Duration, TimeZone};

use crate::error::{ForecastError, Result};

/// Converts a (possibly fractional) minute granularity into an exact step.
pub fn granularity_step(granularity_minutes: f64) -> Result<Duration> {
    if !granularity_minutes.is_finite() || granularity_minutes <= 0.0 {
        return Err(ForecastError::InvalidGranularity(granularity_minutes));
    }
    let millis = (granularity_minutes * 60_000.0).round() as i64;
    if millis <= 0 {
        return Err(ForecastError::InvalidGranularity(granularity_minutes));
    }
    Ok(Duration::milliseconds(millis))
}

/// Every timestamp from `start` to `end` inclusive, `granularity_minutes` apart,
/// in the timezone of `start`. Stepping is on absolute time so DST transitions
/// neither repeat nor skip samples.
pub fn expected_timestamps<Z: TimeZone>(
    start: &DateTime<Z>,
    end: &DateTime<Z>,
    granularity_minutes: f64,
) -> Result<Vec<DateTime<Z>>> {
    let step = granularity_step(granularity_minutes)?;
    if end < start {
        return Ok(Vec::new());
    }
    let span = end.clone().signed_duration_since(start.clone()).num_milliseconds();
    let count = (span / step.num_milliseconds()) as usize + 1;
    Ok((0..count)
        .map(|i| start.clone() + Duration::milliseconds(step.num_milliseconds() * i as i64))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::Europe::Berlin;
    use proptest::prelude::*;

    #[test]
    fn test_quarter_hour_grid() {
        let start = Utc.with_ymd_and_hms(2023, 8, 15, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 8, 15, 1, 0, 0).unwrap();
        let grid = expected_timestamps(&start, &end, 15.0).unwrap();
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0], start);
        assert_eq!(grid[4], end);
    }

    #[test]
    fn test_end_not_on_grid_is_excluded() {
        let start = Utc.with_ymd_and_hms(2023, 8, 15, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 8, 15, 0, 50, 0).unwrap();
        let grid = expected_timestamps(&start, &end, 15.0).unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.last().unwrap().format("%M").to_string(), "45");
    }

    #[test]
    fn test_dst_switch_keeps_absolute_spacing() {
        // 2023-03-26 02:00 CET jumps to 03:00 CEST
        let start = Berlin.with_ymd_and_hms(2023, 3, 26, 0, 0, 0).unwrap();
        let end = Berlin.with_ymd_and_hms(2023, 3, 26, 4, 0, 0).unwrap();
        let grid = expected_timestamps(&start, &end, 60.0).unwrap();
        let hours: Vec<_> = grid.iter().map(|t| t.format("%H").to_string()).collect();
        assert_eq!(hours, ["00", "01", "03", "04"]);
    }

    #[test]
    fn test_rejects_non_positive_granularity() {
        let start = Utc.with_ymd_and_hms(2023, 8, 15, 0, 0, 0).unwrap();
        assert!(expected_timestamps(&start, &start, 0.0).is_err());
        assert!(expected_timestamps(&start, &start, -15.0).is_err());
        assert!(expected_timestamps(&start, &start, f64::NAN).is_err());
    }

    #[test]
    fn test_end_before_start_is_empty() {
        let start = Utc.with_ymd_and_hms(2023, 8, 15, 1, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 8, 15, 0, 0, 0).unwrap();
        assert!(expected_timestamps(&start, &end, 60.0).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_grid_is_strictly_increasing_with_expected_length(
            span_minutes in 0i64..20_000,
            granularity in prop::sample::select(vec![15.0f64, 30.0, 60.0, 7.5]),
        ) {
            let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
            let end = start + Duration::minutes(span_minutes);
            let grid = expected_timestamps(&start, &end, granularity).unwrap();
            let expected_len = (span_minutes as f64 / granularity).floor() as usize + 1;
            prop_assert_eq!(grid.len(), expected_len);
            prop_assert_eq!(grid[0], start);
            prop_assert!(grid.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(*grid.last().unwrap() <= end);
        }
    }
}
