use chrono_tz::UTC;
use tracing::debug;

use super::grid::expected_timestamps;
use crate::domain::table::{column_means, TimeSeriesTable};
use crate::error::{ForecastError, Result};

pub const HOURLY_MINUTES: f64 = 60.0;

const GRANULARITY_EPSILON: f64 = 1e-9;

/// Regroups a refined sub-hourly table into hourly rows.
///
/// Rows are partitioned by position into consecutive groups of
/// `floor(60 / granularity)` rows (the last group may be partial) and each group
/// becomes the column-wise mean of its members. Hourly UTC timestamps spanning
/// the original first..last instant are then assigned to the groups by
/// position; if the two counts differ the pairing would be meaningless and
/// [`ForecastError::MisalignedSeries`] is returned instead.
///
/// A table already at 60 minutes is returned re-keyed in UTC. Coarser
/// granularities have no upsampling policy and are rejected.
pub fn to_hourly(refined: &TimeSeriesTable, granularity_minutes: f64) -> Result<TimeSeriesTable> {
    if !granularity_minutes.is_finite() || granularity_minutes <= 0.0 {
        return Err(ForecastError::InvalidGranularity(granularity_minutes));
    }
    if (granularity_minutes - HOURLY_MINUTES).abs() < GRANULARITY_EPSILON {
        return Ok(refined.with_timezone(UTC));
    }
    if granularity_minutes > HOURLY_MINUTES {
        return Err(ForecastError::UnsupportedGranularity(granularity_minutes));
    }

    let (Some(first), Some(last)) = (refined.min_timestamp(), refined.max_timestamp()) else {
        return Ok(TimeSeriesTable::new(refined.columns().to_vec()));
    };

    let group_size = (HOURLY_MINUTES / granularity_minutes).floor() as usize;
    let width = refined.columns().len();
    let groups: Vec<Vec<Option<f64>>> = refined
        .rows()
        .chunks(group_size)
        .map(|chunk| column_means(chunk, width))
        .collect();

    let hours = expected_timestamps(&first.with_timezone(&UTC), &last.with_timezone(&UTC), HOURLY_MINUTES)?;
    if hours.len() != groups.len() {
        return Err(ForecastError::MisalignedSeries {
            context: "hourly normalization",
            left: groups.len(),
            right: hours.len(),
        });
    }

    debug!(
        rows = refined.len(),
        group_size,
        hourly_rows = groups.len(),
        "normalized to hourly interval"
    );

    let mut hourly = TimeSeriesTable::new(refined.columns().to_vec());
    for (timestamp, values) in hours.into_iter().zip(groups) {
        hourly.push(timestamp, values)?;
    }
    Ok(hourly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone};
    use chrono_tz::{Europe::Paris, Tz};
    use rstest::rstest;

    fn series(granularity: i64, values: &[f64]) -> TimeSeriesTable {
        let start: DateTime<Tz> = Paris.with_ymd_and_hms(2023, 8, 15, 0, 0, 0).unwrap();
        let mut table = TimeSeriesTable::new(["Solar"]);
        for (i, v) in values.iter().enumerate() {
            table
                .push_values(start + Duration::minutes(granularity * i as i64), &[*v])
                .unwrap();
        }
        table
    }

    #[test]
    fn test_four_quarter_hours_make_one_hour() {
        let table = series(15, &[10.0, 20.0, 30.0, 40.0]);
        let hourly = to_hourly(&table, 15.0).unwrap();
        assert_eq!(hourly.len(), 1);
        assert_eq!(hourly.column("Solar").unwrap(), vec![Some(25.0)]);
        // 00:00 Paris summer time
        assert_eq!(hourly.rows()[0].start_time_utc(), "202308142200");
    }

    #[rstest]
    #[case(15, 96, 24)]
    #[case(15, 95, 24)]
    #[case(30, 48, 24)]
    #[case(15, 97, 25)]
    fn test_full_days_group_by_position(#[case] granularity: i64, #[case] rows: usize, #[case] hours: usize) {
        let values: Vec<f64> = (0..rows).map(|i| i as f64).collect();
        let table = series(granularity, &values);
        let hourly = to_hourly(&table, granularity as f64).unwrap();
        assert_eq!(hourly.len(), hours);
        assert!(hourly.timestamps().collect::<Vec<_>>().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_partial_final_group_is_averaged() {
        // 5 quarter hours -> 00:00..01:00 gives 2 hourly slots
        let table = series(15, &[1.0, 2.0, 3.0, 4.0, 9.0]);
        let hourly = to_hourly(&table, 15.0).unwrap();
        assert_eq!(hourly.column("Solar").unwrap(), vec![Some(2.5), Some(9.0)]);
    }

    #[test]
    fn test_hourly_input_is_only_rekeyed() {
        let table = series(60, &[1.0, 2.0]);
        let hourly = to_hourly(&table, 60.0).unwrap();
        assert_eq!(hourly.column("Solar"), table.column("Solar"));
        assert_eq!(hourly.timezone(), Some(UTC));
    }

    #[test]
    fn test_coarser_than_hourly_is_rejected() {
        let table = series(120, &[1.0, 2.0]);
        assert!(matches!(
            to_hourly(&table, 120.0),
            Err(ForecastError::UnsupportedGranularity(g)) if g == 120.0
        ));
    }

    #[test]
    fn test_group_count_mismatch_is_reported() {
        // 45 minute steps: groups of one row, but only 2 hourly slots in 1h30
        let table = series(45, &[1.0, 2.0, 3.0]);
        assert!(matches!(
            to_hourly(&table, 45.0),
            Err(ForecastError::MisalignedSeries { left: 3, right: 2, .. })
        ));
    }
}
