//! Renewable-share metrics over per-source generation columns.

use crate::domain::sources::ColumnClassification;
use crate::domain::table::{round_half_even, TimeSeriesTable};
use crate::error::Result;

pub const RENEWABLE_TOTAL: &str = "renewableTotal";
pub const RENEWABLE_TOTAL_WS: &str = "renewableTotalWS";
pub const NON_RENEWABLE_TOTAL: &str = "nonRenewableTotal";
pub const TOTAL: &str = "total";
pub const PERCENT_RENEWABLE: &str = "percentRenewable";
pub const PERCENT_RENEWABLE_WS: &str = "percentRenewableWS";
/// Wind + solar total of a wind/solar forecast table.
pub const TOTAL_RENEWABLE: &str = "totalRenewable";

/// `round(part / total * 100)` with ties to even; 0 when the ratio is undefined.
pub fn percentage(part: Option<f64>, total: Option<f64>) -> f64 {
    match (part, total) {
        (Some(part), Some(total)) if total != 0.0 => {
            let ratio = part / total * 100.0;
            if ratio.is_finite() {
                round_half_even(ratio)
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Per-row sum over `columns`; missing samples count as 0.
pub fn row_sums(table: &TimeSeriesTable, columns: &[String]) -> Vec<f64> {
    let indices: Vec<usize> = columns
        .iter()
        .filter_map(|c| table.column_index(c))
        .collect();
    table
        .rows()
        .iter()
        .map(|row| {
            indices
                .iter()
                .filter_map(|&i| row.values[i])
                .filter(|v| !v.is_nan())
                .sum()
        })
        .collect()
}

/// Adds the renewable / wind-solar / non-renewable totals and both percentages.
pub fn compute_share(mut table: TimeSeriesTable) -> Result<TimeSeriesTable> {
    let classes = ColumnClassification::classify(table.columns());
    let renewable = row_sums(&table, &classes.renewable);
    let wind_solar = row_sums(&table, &classes.wind_solar);
    let non_renewable = row_sums(&table, &classes.non_renewable);
    let total: Vec<f64> = renewable
        .iter()
        .zip(&non_renewable)
        .map(|(r, n)| r + n)
        .collect();

    let percent = |part: &[f64]| -> Vec<Option<f64>> {
        part.iter()
            .zip(&total)
            .map(|(p, t)| Some(percentage(Some(*p), Some(*t))))
            .collect()
    };
    let percent_renewable = percent(&renewable);
    let percent_renewable_ws = percent(&wind_solar);

    table.set_column(RENEWABLE_TOTAL, renewable.iter().copied().map(Some).collect())?;
    table.set_column(RENEWABLE_TOTAL_WS, wind_solar.iter().copied().map(Some).collect())?;
    table.set_column(NON_RENEWABLE_TOTAL, non_renewable.into_iter().map(Some).collect())?;
    table.set_column(TOTAL, total.iter().copied().map(Some).collect())?;
    table.set_column(PERCENT_RENEWABLE, percent_renewable)?;
    table.set_column(PERCENT_RENEWABLE_WS, percent_renewable_ws)?;
    Ok(table)
}

/// Adds `totalRenewable`, the sum of whichever wind/solar columns are present.
pub fn add_wind_solar_total(mut table: TimeSeriesTable) -> Result<TimeSeriesTable> {
    let classes = ColumnClassification::classify(table.columns());
    let totals = row_sums(&table, &classes.wind_solar);
    table.set_column(TOTAL_RENEWABLE, totals.into_iter().map(Some).collect())?;
    Ok(table)
}
