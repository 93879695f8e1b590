//! ENTSO-E Transparency Platform generation data.

pub mod client;
pub mod document;

pub use client::{EntsoeClient, ACTUAL_GENERATION, TOTAL_FORECAST, WIND_SOLAR_FORECAST};
pub use document::{parse_document, series_to_table, GenerationSeries};
