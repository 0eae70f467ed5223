//! Configuration and application paths.

pub mod config;
pub mod paths;

pub use config::{
    Config, ConfigSource, ConfigSources, ENV_CONFIG, ENV_FILLS_FILE, ENV_FORMAT, ENV_NO_COLOR,
    ENV_NO_COLOR_STD, ENV_PRETTY, ENV_REFRESH_INTERVAL, ResolvedConfig,
};
pub use paths::AppPaths;
