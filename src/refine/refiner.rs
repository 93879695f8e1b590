//! Gap detection and imputation for raw source series.
//!
//! The granularity of a fetch is taken from the spacing of its first two
//! samples. Every timestamp of the regular grid between the observed first and
//! last sample that the source did not deliver is imputed, in timestamp order,
//! with the rounded mean of the rows already present for the same local
//! calendar day, or with the rounded mean of the whole fetch when that day has
//! no rows at all. Each correction is recorded in a [`RefinementLog`].

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

use super::grid::expected_timestamps;
use crate::domain::table::{column_means, round_half_even, Row, TimeSeriesTable};
use crate::error::{ForecastError, Result};

/// Which average stood in for a missing sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    DayAverage(NaiveDate),
    SeriesAverage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefinementEntry {
    Summary {
        rows: usize,
        granularity_minutes: f64,
    },
    Imputed {
        timestamp: DateTime<Tz>,
        fallback: Fallback,
        values: Vec<i64>,
    },
    DuplicateDropped {
        timestamp: DateTime<Tz>,
    },
    OffGridDropped {
        timestamp: DateTime<Tz>,
    },
}

impl fmt::Display for RefinementEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary {
                rows,
                granularity_minutes,
            } => write!(f, "Row count : fetched = {rows}, duration : {granularity_minutes} min"),
            Self::Imputed {
                timestamp,
                fallback,
                values,
            } => {
                let values = values
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                match fallback {
                    Fallback::DayAverage(day) => write!(
                        f,
                        "Missing value: {timestamp} replaced with average day value {day} : {values}"
                    ),
                    Fallback::SeriesAverage => write!(
                        f,
                        "Missing value: {timestamp} replaced with whole data average : {values}"
                    ),
                }
            }
            Self::DuplicateDropped { timestamp } => {
                write!(f, "Duplicate value: {timestamp} dropped, later sample kept")
            }
            Self::OffGridDropped { timestamp } => {
                write!(f, "Off-grid value: {timestamp} dropped")
            }
        }
    }
}

/// Ordered, read-only audit trail of the corrections made to one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefinementLog {
    entries: Vec<RefinementEntry>,
}

impl RefinementLog {
    fn push(&mut self, entry: RefinementEntry) {
        debug!(correction = %entry, "refinement");
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[RefinementEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn imputed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, RefinementEntry::Imputed { .. }))
            .count()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

/// A refined table together with the granularity it was observed at.
#[derive(Debug, Clone)]
pub struct RefinedSeries {
    pub table: TimeSeriesTable,
    pub granularity_minutes: f64,
    pub log: RefinementLog,
}

/// Minutes between the first two samples of a raw fetch.
pub fn observed_granularity(table: &TimeSeriesTable) -> Result<f64> {
    let rows = table.rows();
    if rows.len() < 2 {
        return Err(ForecastError::InsufficientData {
            required: 2,
            available: rows.len(),
        });
    }
    let delta = rows[1]
        .timestamp
        .signed_duration_since(rows[0].timestamp)
        .num_milliseconds();
    let minutes = delta as f64 / 60_000.0;
    if minutes <= 0.0 {
        return Err(ForecastError::InvalidGranularity(minutes));
    }
    Ok(minutes)
}

/// Running per-day column sums, updated as imputed rows are inserted.
#[derive(Debug, Clone)]
struct DayStats {
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl DayStats {
    fn new(width: usize) -> Self {
        Self {
            sums: vec![0.0; width],
            counts: vec![0; width],
        }
    }

    fn add(&mut self, values: &[Option<f64>]) {
        for (idx, value) in values.iter().enumerate() {
            if let Some(v) = value.filter(|v| !v.is_nan()) {
                self.sums[idx] += v;
                self.counts[idx] += 1;
            }
        }
    }

    fn means(&self) -> Vec<Option<f64>> {
        self.sums
            .iter()
            .zip(&self.counts)
            .map(|(sum, &count)| (count > 0).then(|| sum / count as f64))
            .collect()
    }
}

/// Rounded to integers, undefined means become 0.
fn imputation_values(means: &[Option<f64>]) -> Vec<i64> {
    means
        .iter()
        .map(|m| m.map(round_half_even).unwrap_or(0.0) as i64)
        .collect()
}

/// Fills every gap of `table` on its observed grid and returns the rows sorted
/// ascending with the log of corrections made.
pub fn refine(table: TimeSeriesTable) -> Result<RefinedSeries> {
    let granularity_minutes = observed_granularity(&table)?;
    let mut log = RefinementLog::default();
    log.push(RefinementEntry::Summary {
        rows: table.len(),
        granularity_minutes,
    });

    let (Some(first), Some(last)) = (table.min_timestamp(), table.max_timestamp()) else {
        return Err(ForecastError::InsufficientData {
            required: 2,
            available: 0,
        });
    };
    let grid = expected_timestamps(&first, &last, granularity_minutes)?;
    let on_grid: HashSet<i64> = grid.iter().map(|t| t.timestamp_millis()).collect();

    let columns = table.columns().to_vec();
    let width = columns.len();

    // Later samples win on duplicates; samples off the grid cannot be placed.
    let mut kept: HashMap<i64, Row> = HashMap::with_capacity(table.len());
    for row in table.into_rows() {
        let key = row.timestamp.timestamp_millis();
        if !on_grid.contains(&key) {
            log.push(RefinementEntry::OffGridDropped {
                timestamp: row.timestamp,
            });
            continue;
        }
        if let Some(previous) = kept.insert(key, row) {
            log.push(RefinementEntry::DuplicateDropped {
                timestamp: previous.timestamp,
            });
        }
    }

    let mut rows: Vec<Row> = kept.into_values().collect();
    rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let series_average = imputation_values(&column_means(rows.iter(), width));
    let mut days: HashMap<NaiveDate, DayStats> = HashMap::new();
    for row in &rows {
        days.entry(row.timestamp.date_naive())
            .or_insert_with(|| DayStats::new(width))
            .add(&row.values);
    }

    let present: HashSet<i64> = rows.iter().map(|r| r.timestamp.timestamp_millis()).collect();
    let missing: Vec<DateTime<Tz>> = grid
        .into_iter()
        .filter(|t| !present.contains(&t.timestamp_millis()))
        .collect();

    for timestamp in missing {
        let day = timestamp.date_naive();
        let (values, fallback) = match days.get(&day) {
            Some(stats) => (imputation_values(&stats.means()), Fallback::DayAverage(day)),
            None => (series_average.clone(), Fallback::SeriesAverage),
        };
        let row_values: Vec<Option<f64>> = values.iter().map(|&v| Some(v as f64)).collect();
        days.entry(day)
            .or_insert_with(|| DayStats::new(width))
            .add(&row_values);
        log.push(RefinementEntry::Imputed {
            timestamp,
            fallback,
            values,
        });
        rows.push(Row {
            timestamp,
            values: row_values,
        });
    }

    let mut refined = TimeSeriesTable::new(columns);
    for row in rows {
        refined.push(row.timestamp, row.values)?;
    }
    refined.sort_by_timestamp();

    Ok(RefinedSeries {
        table: refined,
        granularity_minutes,
        log,
    })
}
