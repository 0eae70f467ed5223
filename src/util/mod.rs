//! Utility functions.

pub mod env;
pub mod format;
pub mod time;

pub use format::{
    format_consumption, format_cost, format_liters, format_odometer, format_price_per_liter,
};
pub use time::{format_days_since, format_relative_time};
