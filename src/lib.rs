//! Hourly renewable-share forecasting from ENTSO-E generation data.
//!
//! Raw generation series are refined onto their observed sampling grid,
//! normalized to hourly cadence, turned into renewable-share metrics and fed to
//! a sequence model that forecasts the next 48 hours.

pub mod api;
pub mod config;
pub mod controller;
pub mod domain;
pub mod entsoe;
pub mod error;
pub mod forecast;
pub mod ml;
pub mod refine;
pub mod storage;
pub mod telemetry;

pub use error::{ForecastError, Result};
