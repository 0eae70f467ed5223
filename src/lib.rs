//! fueltrack - fuel fill statistics
//!
//! Derives consumption, spending and monthly totals from a household's fuel
//! fill records, keeps them in an in-memory store that supports optimistic
//! edits, and refreshes that store from a data source on an interval.

// Note: deny (not forbid) to allow #[allow(unsafe_code)] in test helpers for env var manipulation
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod core;
pub mod error;
pub mod render;
pub mod storage;
pub mod util;

/// Test utilities module - included in test builds or when test-utils feature is enabled.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{ExitCode, FuelError, Result};
