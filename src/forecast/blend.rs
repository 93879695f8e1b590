use super::share::{percentage, PERCENT_RENEWABLE, TOTAL, TOTAL_RENEWABLE};
use crate::domain::table::TimeSeriesTable;
use crate::error::Result;

/// Combines an hourly total-generation forecast with an hourly wind/solar
/// forecast into a renewable-share forecast.
///
/// `total` is copied onto the wind/solar table by row position; both tables are
/// refined and normalized independently, so unequal lengths are reported as
/// `MisalignedSeries` rather than paired.
pub fn blend_forecast(
    total_forecast: &TimeSeriesTable,
    wind_solar_forecast: TimeSeriesTable,
) -> Result<TimeSeriesTable> {
    let mut blended = wind_solar_forecast;
    blended.copy_column_positional(total_forecast, TOTAL, "forecast blend")?;

    let renewable = blended.require_column(TOTAL_RENEWABLE)?;
    let total = blended.require_column(TOTAL)?;
    let percent = renewable
        .into_iter()
        .zip(total)
        .map(|(r, t)| Some(percentage(r, t)))
        .collect();
    blended.set_column(PERCENT_RENEWABLE, percent)?;
    Ok(blended)
}
