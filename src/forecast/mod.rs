//! Renewable-share metrics and the orchestration that feeds them.

pub mod blend;
pub mod engine;
pub mod share;

pub use blend::blend_forecast;
pub use engine::{GenerationSource, RenewableShareEngine, AGGREGATED_COLUMN};
pub use share::{
    add_wind_solar_total, compute_share, percentage, NON_RENEWABLE_TOTAL, PERCENT_RENEWABLE,
    PERCENT_RENEWABLE_WS, RENEWABLE_TOTAL, RENEWABLE_TOTAL_WS, TOTAL, TOTAL_RENEWABLE,
};
