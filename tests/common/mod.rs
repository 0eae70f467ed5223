//! Shared helpers for integration tests.
//!
//! - `log_capture`: records tracing events for assertions
//! - [`fueltrack_cmd`]: the binary under test, isolated from the host environment

#![allow(dead_code)]

pub mod log_capture;

use std::path::Path;

use assert_cmd::Command;

/// Variables the binary reads that must not leak in from the developer's shell.
const HOST_ENV: [&str; 11] = [
    "FUELTRACK_FILLS_FILE",
    "FUELTRACK_FORMAT",
    "FUELTRACK_REFRESH_INTERVAL",
    "FUELTRACK_NO_COLOR",
    "FUELTRACK_PRETTY",
    "FUELTRACK_CONFIG",
    "FUELTRACK_LOG",
    "FUELTRACK_LOG_FORMAT",
    "FUELTRACK_LOG_FILE",
    "RUST_LOG",
    "NO_COLOR",
];

/// Build a `fueltrack` command whose config and data dirs live under `home`.
#[allow(deprecated)]
pub fn fueltrack_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fueltrack").expect("binary builds");
    for var in HOST_ENV {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"));
    cmd
}
