//! Test utilities for fueltrack.
//!
//! Shared fill factories, a temp directory helper and assertion macros for
//! unit tests and the integration tests under `tests/`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fueltrack::test_utils::*;
//!
//! let fleet = make_test_fleet();
//! let dir = TestDir::new();
//! let path = dir.create_file("fills.json", &make_test_fleet_json());
//! ```

use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::core::models::FuelFillRecord;

// =============================================================================
// Test Data Factories
// =============================================================================

/// Parse a `YYYY-MM-DD` literal.
///
/// # Panics
///
/// Panics if `raw` is not a valid date.
#[must_use]
pub fn test_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("invalid test date")
}

/// Create a bare fill for `vehicle_id` on `date`.
#[must_use]
pub const fn make_test_fill(id: i64, vehicle_id: i64, date: NaiveDate) -> FuelFillRecord {
    FuelFillRecord::new(id, vehicle_id, date)
}

/// Create a bare fill for vehicle 1 on a `YYYY-MM-DD` date.
///
/// # Examples
///
/// ```rust,ignore
/// let fill = make_test_fill_on(1, "2024-03-02").with_liters(41.5);
/// assert_eq!(fill.vehicle_id, 1);
/// ```
#[must_use]
pub fn make_test_fill_on(id: i64, date: &str) -> FuelFillRecord {
    make_test_fill(id, 1, test_date(date))
}

/// Two vehicles over the first half of 2024.
///
/// Vehicle 1 (ids 1..=6) has complete records with odometer readings.
/// Vehicle 2 (ids 7..=10) is missing some odometer and price fields, the way
/// real entries often are. Every id is positive.
#[must_use]
pub fn make_test_fleet() -> Vec<FuelFillRecord> {
    let full = |id, date, km, liters, amount, price| {
        make_test_fill(id, 1, test_date(date))
            .with_odometer(km)
            .with_liters(liters)
            .with_amount(amount)
            .with_price_per_liter(price)
    };

    vec![
        full(1, "2024-01-04", 41_200, 38.2, 66.85, 1.75),
        full(2, "2024-01-27", 41_820, 41.0, 72.16, 1.76),
        full(3, "2024-02-19", 42_410, 39.4, 70.13, 1.78),
        full(4, "2024-03-15", 43_050, 42.3, 73.60, 1.74),
        full(5, "2024-04-09", 43_640, 37.9, 67.08, 1.77),
        full(6, "2024-05-30", 44_300, 43.1, 77.15, 1.79).with_notes("motorway trip"),
        make_test_fill(7, 2, test_date("2024-01-12"))
            .with_odometer(8_100)
            .with_liters(30.5)
            .with_amount(53.07),
        make_test_fill(8, 2, test_date("2024-02-28"))
            .with_liters(28.0)
            .with_amount(49.56),
        make_test_fill(9, 2, test_date("2024-04-21"))
            .with_odometer(9_020)
            .with_liters(31.2)
            .with_amount(55.85)
            .with_price_per_liter(1.79),
        make_test_fill(10, 2, test_date("2024-06-11")).with_amount(20.0),
    ]
}

/// [`make_test_fleet`] as a JSON array, in the on-disk camelCase format.
///
/// # Panics
///
/// Panics if serialization fails.
#[must_use]
pub fn make_test_fleet_json() -> String {
    serde_json::to_string_pretty(&make_test_fleet()).expect("fleet serializes")
}

/// Sample config file body.
#[must_use]
pub fn make_test_config_toml() -> String {
    r#"[general]
refresh_interval_seconds = 30
log_level = "info"

[output]
format = "json"
color = false
pretty = true
"#
    .to_string()
}

// =============================================================================
// Temp Directory Utilities
// =============================================================================

/// A temporary directory removed on drop.
///
/// # Examples
///
/// ```rust,ignore
/// use fueltrack::test_utils::TestDir;
///
/// let dir = TestDir::new();
/// let path = dir.create_file("fills.json", "[]");
/// assert!(path.exists());
/// ```
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// Create a new isolated temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Write `content` to `name`, creating parent directories as needed.
    ///
    /// Returns the full path of the new file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    #[allow(clippy::must_use_candidate)]
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.inner.path().join(name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        let mut file = fs::File::create(&path).expect("Failed to create test file");
        file.write_all(content.as_bytes())
            .expect("Failed to write test file");
        path
    }

    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.inner.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert that a string contains a substring.
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected string to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
}

/// Assert that a string does NOT contain a substring.
#[macro_export]
macro_rules! assert_not_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            !haystack.contains(needle),
            "Expected string NOT to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
}

/// Assert approximate floating point equality.
///
/// ```rust,ignore
/// assert_float_eq!(70.0, 70.0000001);
/// assert_float_eq!(7.14, 7.1428, 0.01); // custom epsilon
/// ```
#[macro_export]
macro_rules! assert_float_eq {
    ($left:expr, $right:expr) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let epsilon: f64 = f64::EPSILON * 100.0;
        assert!(
            (left - right).abs() < epsilon,
            "Float equality assertion failed: {} != {} (epsilon: {})",
            left,
            right,
            epsilon
        );
    };
    ($left:expr, $right:expr, $epsilon:expr) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let epsilon: f64 = $epsilon;
        assert!(
            (left - right).abs() < epsilon,
            "Float equality assertion failed: {} != {} (epsilon: {})",
            left,
            right,
            epsilon
        );
    };
}

// =============================================================================
// Test Helpers
// =============================================================================

/// Strip ANSI escape codes from a string.
#[must_use]
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}
