//! Ordered-row, named-column time series table.
//!
//! Rows are keyed by a timezone-aware timestamp and hold one optional value per
//! column (`None` marks a sample the source did not report). Two join styles
//! exist and every merge point picks one explicitly:
//! - timestamp-keyed: rows are matched by instant (refinement, persistence)
//! - positional: row `i` of one table is paired with row `i` of another
//!   ([`TimeSeriesTable::copy_column_positional`]); lengths must match or the
//!   join fails with [`ForecastError::MisalignedSeries`].

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use super::time::utc_time_key;
use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub timestamp: DateTime<Tz>,
    pub values: Vec<Option<f64>>,
}

impl Row {
    /// Derived `startTimeUTC` key of this row.
    pub fn start_time_utc(&self) -> String {
        utc_time_key(&self.timestamp)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TimeSeriesTable {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, timestamp: DateTime<Tz>, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(ForecastError::ColumnMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        self.rows.push(Row { timestamp, values });
        Ok(())
    }

    /// Convenience for fully-populated rows.
    pub fn push_values(&mut self, timestamp: DateTime<Tz>, values: &[f64]) -> Result<()> {
        self.push(timestamp, values.iter().copied().map(Some).collect())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    pub fn require_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        self.column(name)
            .ok_or_else(|| ForecastError::MissingColumn(name.to_string()))
    }

    /// Replaces `name` if present, appends it otherwise.
    pub fn set_column(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(ForecastError::MisalignedSeries {
                context: "set column",
                left: self.rows.len(),
                right: values.len(),
            });
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.values[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.values.push(value);
                }
            }
        }
        Ok(())
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Positional join: row `i` of `other` feeds row `i` of `self`.
    pub fn copy_column_positional(
        &mut self,
        other: &TimeSeriesTable,
        name: &str,
        context: &'static str,
    ) -> Result<()> {
        let values = other.require_column(name)?;
        if values.len() != self.len() {
            return Err(ForecastError::MisalignedSeries {
                context,
                left: self.len(),
                right: values.len(),
            });
        }
        self.set_column(name, values)
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &DateTime<Tz>> {
        self.rows.iter().map(|r| &r.timestamp)
    }

    pub fn min_timestamp(&self) -> Option<DateTime<Tz>> {
        self.timestamps().min().cloned()
    }

    pub fn max_timestamp(&self) -> Option<DateTime<Tz>> {
        self.timestamps().max().cloned()
    }

    /// Stable ascending sort by instant.
    pub fn sort_by_timestamp(&mut self) {
        self.rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    }

    /// Last `n` rows (all rows when fewer exist).
    pub fn tail(&self, n: usize) -> Self {
        let skip = self.rows.len().saturating_sub(n);
        Self {
            columns: self.columns.clone(),
            rows: self.rows[skip..].to_vec(),
        }
    }

    pub fn with_timezone(&self, tz: Tz) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .map(|r| Row {
                    timestamp: r.timestamp.with_timezone(&tz),
                    values: r.values.clone(),
                })
                .collect(),
        }
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.rows.first().map(|r| r.timestamp.timezone())
    }
}

/// Column-wise arithmetic mean skipping missing samples; `None` where a column has none.
pub fn column_means<'a, I>(rows: I, width: usize) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut sums = vec![0.0; width];
    let mut counts = vec![0usize; width];
    for row in rows {
        for (idx, value) in row.values.iter().enumerate() {
            if let Some(v) = value.filter(|v| !v.is_nan()) {
                sums[idx] += v;
                counts[idx] += 1;
            }
        }
    }
    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
        .collect()
}

/// Round-half-to-even, matching the numeric library the source series were produced with.
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}
