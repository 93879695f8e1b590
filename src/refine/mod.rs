//! Time-series refinement: expected grids, gap imputation and hourly normalization.

pub mod grid;
pub mod interval;
pub mod refiner;

pub use grid::expected_timestamps;
pub use interval::{to_hourly, HOURLY_MINUTES};
pub use refiner::{refine, Fallback, RefinedSeries, RefinementEntry, RefinementLog};
