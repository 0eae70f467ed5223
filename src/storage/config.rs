//! Configuration file loading and management.
//!
//! Loads configuration from `<config dir>/fueltrack/config.toml`.
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `FUELTRACK_FILLS_FILE`: Fill data file
//! - `FUELTRACK_FORMAT`: Output format (human, json, md)
//! - `FUELTRACK_REFRESH_INTERVAL`: Watch refresh interval in seconds
//! - `FUELTRACK_NO_COLOR` or `NO_COLOR`: Disable colors
//! - `FUELTRACK_PRETTY`: Pretty-print JSON output (1, true, yes)
//! - `FUELTRACK_CONFIG`: Override config file path

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::error::{FuelError, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

pub const ENV_FILLS_FILE: &str = "FUELTRACK_FILLS_FILE";
pub const ENV_FORMAT: &str = "FUELTRACK_FORMAT";
pub const ENV_REFRESH_INTERVAL: &str = "FUELTRACK_REFRESH_INTERVAL";
pub const ENV_NO_COLOR: &str = "FUELTRACK_NO_COLOR";
/// Standard environment variable to disable colors.
pub const ENV_NO_COLOR_STD: &str = "NO_COLOR";
pub const ENV_PRETTY: &str = "FUELTRACK_PRETTY";
pub const ENV_CONFIG: &str = "FUELTRACK_CONFIG";

/// Accepted refresh interval range, in seconds.
pub const REFRESH_INTERVAL_RANGE: (u64, u64) = (1, 86_400);

const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Final configuration after merging CLI, env vars, and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Fill data file.
    pub fills_file: PathBuf,
    pub format: OutputFormat,
    /// Interval between refreshes in `watch`.
    pub refresh_interval: Duration,
    pub no_color: bool,
    pub pretty: bool,
    /// Log level from the config file, applied when neither flag nor env sets one.
    pub log_level: Option<String>,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub fills_file: ConfigSource,
    pub format: ConfigSource,
    pub refresh_interval: ConfigSource,
    pub no_color: ConfigSource,
    pub pretty: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    Env,
    ConfigFile,
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl ResolvedConfig {
    /// Resolve final configuration from CLI args, environment variables, and config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but is malformed, or if any
    /// resolved value is out of range.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let config = Self::load_config()?;
        config.validate()?;
        Self::resolve_with(cli, &config, &AppPaths::new())
    }

    /// Resolve against an already loaded config.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment value is invalid.
    pub fn resolve_with(cli: &Cli, config: &Config, paths: &AppPaths) -> Result<Self> {
        let mut sources = ConfigSources::default();

        let fills_file = Self::resolve_fills_file(cli, config, paths, &mut sources.fills_file);
        let format = Self::resolve_format(cli, config, &mut sources.format)?;
        let refresh_interval =
            Self::resolve_refresh_interval(cli, config, &mut sources.refresh_interval)?;
        let no_color = Self::resolve_no_color(cli, config, &mut sources.no_color);
        let pretty = Self::resolve_pretty(cli, config, &mut sources.pretty);

        tracing::debug!(
            fills_file = %fills_file.display(),
            fills_file_source = %sources.fills_file,
            format_source = %sources.format,
            "resolved configuration"
        );

        Ok(Self {
            fills_file,
            format,
            refresh_interval,
            no_color,
            pretty,
            log_level: config.general.log_level.clone(),
            sources,
        })
    }

    /// Load config file, respecting `FUELTRACK_CONFIG`.
    fn load_config() -> Result<Config> {
        match std::env::var(ENV_CONFIG) {
            Ok(path) if !path.trim().is_empty() => Config::load_from(Path::new(&path)),
            _ => Config::load(),
        }
    }

    fn resolve_fills_file(
        cli: &Cli,
        config: &Config,
        paths: &AppPaths,
        source: &mut ConfigSource,
    ) -> PathBuf {
        if let Some(file) = cli.data_args().and_then(|d| d.file.clone()) {
            *source = ConfigSource::Cli;
            return file;
        }

        if let Some(file) = env_value(ENV_FILLS_FILE) {
            *source = ConfigSource::Env;
            return PathBuf::from(file);
        }

        if let Some(file) = &config.data.fills_file {
            *source = ConfigSource::ConfigFile;
            return file.clone();
        }

        *source = ConfigSource::Default;
        paths.fills_file()
    }

    fn resolve_format(cli: &Cli, config: &Config, source: &mut ConfigSource) -> Result<OutputFormat> {
        if let Some(format) = cli.requested_format() {
            *source = ConfigSource::Cli;
            return Ok(format);
        }

        if let Some(format_env) = env_value(ENV_FORMAT) {
            *source = ConfigSource::Env;
            return parse_format(&format_env);
        }

        if let Some(format_str) = &config.output.format {
            *source = ConfigSource::ConfigFile;
            return parse_format(format_str);
        }

        *source = ConfigSource::Default;
        Ok(OutputFormat::Human)
    }

    fn resolve_refresh_interval(
        cli: &Cli,
        config: &Config,
        source: &mut ConfigSource,
    ) -> Result<Duration> {
        if let Some(Commands::Watch(args)) = &cli.command
            && let Some(secs) = args.interval
        {
            *source = ConfigSource::Cli;
            return Ok(Duration::from_secs(secs));
        }

        if let Some(raw) = env_value(ENV_REFRESH_INTERVAL) {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| interval_in_range(*secs))
                .ok_or_else(|| FuelError::ConfigInvalid {
                    key: ENV_REFRESH_INTERVAL.to_string(),
                    value: raw.clone(),
                    message: interval_message(),
                })?;
            *source = ConfigSource::Env;
            return Ok(Duration::from_secs(secs));
        }

        *source = if config.general.refresh_interval_seconds == DEFAULT_REFRESH_INTERVAL_SECS {
            ConfigSource::Default
        } else {
            ConfigSource::ConfigFile
        };
        Ok(Duration::from_secs(config.general.refresh_interval_seconds))
    }

    fn resolve_no_color(cli: &Cli, config: &Config, source: &mut ConfigSource) -> bool {
        if cli.no_color {
            *source = ConfigSource::Cli;
            return true;
        }

        // NO_COLOR counts when present with any value.
        if is_env_truthy(ENV_NO_COLOR) || std::env::var_os(ENV_NO_COLOR_STD).is_some() {
            *source = ConfigSource::Env;
            return true;
        }

        if !config.output.color {
            *source = ConfigSource::ConfigFile;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }

    fn resolve_pretty(cli: &Cli, config: &Config, source: &mut ConfigSource) -> bool {
        if cli.pretty {
            *source = ConfigSource::Cli;
            return true;
        }

        if is_env_truthy(ENV_PRETTY) {
            *source = ConfigSource::Env;
            return true;
        }

        if config.output.pretty {
            *source = ConfigSource::ConfigFile;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }
}

/// Parse a format string into [`OutputFormat`].
///
/// # Errors
/// Returns [`FuelError::Config`] for unknown names.
pub fn parse_format(s: &str) -> Result<OutputFormat> {
    match s.trim().to_lowercase().as_str() {
        "human" => Ok(OutputFormat::Human),
        "json" => Ok(OutputFormat::Json),
        "md" | "markdown" => Ok(OutputFormat::Md),
        _ => Err(FuelError::Config(format!(
            "Invalid format '{s}'. Valid formats: human, json, md"
        ))),
    }
}

/// Check if an environment variable is set to a truthy value.
#[must_use]
pub fn is_env_truthy(var: &str) -> bool {
    std::env::var(var)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

const fn interval_in_range(secs: u64) -> bool {
    secs >= REFRESH_INTERVAL_RANGE.0 && secs <= REFRESH_INTERVAL_RANGE.1
}

fn interval_message() -> String {
    format!(
        "refresh interval must be between {} and {} seconds",
        REFRESH_INTERVAL_RANGE.0, REFRESH_INTERVAL_RANGE.1
    )
}

// =============================================================================
// Config File
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub data: DataConfig,
    pub output: OutputConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Seconds between refreshes in `watch`.
    pub refresh_interval_seconds: u64,
    /// Default log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
}

/// Where fill data lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub fills_file: Option<PathBuf>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (human, json, md).
    pub format: Option<String>,
    pub color: bool,
    pub pretty: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: DEFAULT_REFRESH_INTERVAL_SECS,
            log_level: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            pretty: false,
        }
    }
}

impl Config {
    /// Load configuration from the default config file path.
    ///
    /// # Errors
    /// Fails only if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().config_file())
    }

    /// Load configuration from a specific path.
    ///
    /// Returns defaults if the file doesn't exist.
    ///
    /// # Errors
    /// Fails only if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FuelError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| FuelError::Config(format!("Failed to serialize config: {e}")))?;

        fs::write(path, content)?;
        tracing::debug!(?path, "Config file saved");
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns [`FuelError::ConfigInvalid`] naming the first bad key.
    pub fn validate(&self) -> Result<()> {
        if let Some(format) = &self.output.format
            && parse_format(format).is_err()
        {
            return Err(FuelError::ConfigInvalid {
                key: "output.format".to_string(),
                value: format.clone(),
                message: "valid formats: human, json, md".to_string(),
            });
        }

        let secs = self.general.refresh_interval_seconds;
        if !interval_in_range(secs) {
            return Err(FuelError::ConfigInvalid {
                key: "general.refresh_interval_seconds".to_string(),
                value: secs.to_string(),
                message: interval_message(),
            });
        }

        if let Some(level) = &self.general.log_level
            && crate::core::logging::LogLevel::from_arg(level).is_none()
        {
            return Err(FuelError::ConfigInvalid {
                key: "general.log_level".to_string(),
                value: level.clone(),
                message: "valid levels: error, warn, info, debug, trace".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestDir, make_test_config_toml};
    use clap::Parser;

    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    const ALL_ENV: [&str; 7] = [
        ENV_FILLS_FILE,
        ENV_FORMAT,
        ENV_REFRESH_INTERVAL,
        ENV_NO_COLOR,
        ENV_NO_COLOR_STD,
        ENV_PRETTY,
        ENV_CONFIG,
    ];

    /// Run `f` with exactly `vars` set among the variables this module reads.
    #[allow(unsafe_code)]
    fn with_env(vars: &[(&str, &str)], f: impl FnOnce()) {
        let _guard = ENV_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let prior: Vec<_> = ALL_ENV.iter().map(|k| (*k, std::env::var(k).ok())).collect();
        for key in ALL_ENV {
            unsafe { std::env::remove_var(key) };
        }
        for (key, value) in vars {
            unsafe { std::env::set_var(key, value) };
        }

        f();

        for (key, value) in prior {
            match value {
                Some(v) => unsafe { std::env::set_var(key, v) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("fueltrack").chain(args.iter().copied()))
    }

    fn test_paths(dir: &TestDir) -> AppPaths {
        AppPaths {
            config: dir.path().join("config"),
            data: dir.path().join("data"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.refresh_interval_seconds, 30);
        assert!(config.output.color);
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = TestDir::new();
        let config = Config::load_from(&dir.file_path("absent.toml")).unwrap();
        assert_eq!(config.general.refresh_interval_seconds, 30);
    }

    #[test]
    fn load_valid_toml() {
        let dir = TestDir::new();
        let path = dir.create_file("config.toml", &make_test_config_toml());
        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.general.refresh_interval_seconds, 30);
        assert_eq!(config.general.log_level.as_deref(), Some("info"));
        assert_eq!(config.output.format.as_deref(), Some("json"));
        assert!(!config.output.color);
        assert!(config.output.pretty);
    }

    #[test]
    fn load_invalid_toml_returns_parse_error() {
        let dir = TestDir::new();
        let path = dir.create_file("config.toml", "[general\nrefresh = ");
        assert!(matches!(
            Config::load_from(&path),
            Err(FuelError::ConfigParse { .. })
        ));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let dir = TestDir::new();
        let path = dir.create_file("config.toml", "[general]\nunknown = 1\n[extra]\nx = true\n");
        assert!(Config::load_from(&path).is_ok());
    }

    #[test]
    fn roundtrip_save_load() {
        let dir = TestDir::new();
        let path = dir.file_path("nested/config.toml");
        let mut config = Config::default();
        config.data.fills_file = Some(PathBuf::from("/srv/fills.json"));
        config.general.refresh_interval_seconds = 120;

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.data.fills_file, config.data.fills_file);
        assert_eq!(loaded.general.refresh_interval_seconds, 120);
    }

    #[test]
    fn validate_rejects_out_of_range_interval() {
        for secs in [0, 86_401] {
            let mut config = Config::default();
            config.general.refresh_interval_seconds = secs;
            assert!(matches!(
                config.validate(),
                Err(FuelError::ConfigInvalid { ref key, .. }) if key == "general.refresh_interval_seconds"
            ));
        }

        let mut config = Config::default();
        config.general.refresh_interval_seconds = 86_400;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_format_and_level() {
        let mut config = Config::default();
        config.output.format = Some("yaml".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.log_level = Some("loud".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_format_values() {
        assert_eq!(parse_format("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(parse_format("markdown").unwrap(), OutputFormat::Md);
        assert!(parse_format("xml").is_err());
    }

    #[test]
    fn config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI flag");
        assert_eq!(ConfigSource::Env.to_string(), "environment variable");
        assert_eq!(ConfigSource::ConfigFile.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }

    #[test]
    fn resolved_defaults() {
        with_env(&[], || {
            let dir = TestDir::new();
            let paths = test_paths(&dir);
            let resolved = ResolvedConfig::resolve_with(&cli(&["stats"]), &Config::default(), &paths)
                .unwrap();

            assert_eq!(resolved.fills_file, paths.fills_file());
            assert_eq!(resolved.format, OutputFormat::Human);
            assert_eq!(resolved.refresh_interval, Duration::from_secs(30));
            assert!(!resolved.no_color);
            assert!(!resolved.pretty);
            assert_eq!(resolved.sources.fills_file, ConfigSource::Default);
            assert_eq!(resolved.sources.refresh_interval, ConfigSource::Default);
        });
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let mut config = Config::default();
        config.data.fills_file = Some(PathBuf::from("/from/config.json"));
        config.output.format = Some("md".to_string());
        let dir = TestDir::new();
        let paths = test_paths(&dir);

        with_env(
            &[(ENV_FILLS_FILE, "/from/env.json"), (ENV_FORMAT, "json")],
            || {
                let resolved = ResolvedConfig::resolve_with(
                    &cli(&["stats", "--file", "/from/cli.json"]),
                    &config,
                    &paths,
                )
                .unwrap();
                assert_eq!(resolved.fills_file, PathBuf::from("/from/cli.json"));
                assert_eq!(resolved.sources.fills_file, ConfigSource::Cli);
                assert_eq!(resolved.format, OutputFormat::Json);
                assert_eq!(resolved.sources.format, ConfigSource::Env);

                let resolved =
                    ResolvedConfig::resolve_with(&cli(&["stats"]), &config, &paths).unwrap();
                assert_eq!(resolved.fills_file, PathBuf::from("/from/env.json"));
                assert_eq!(resolved.sources.fills_file, ConfigSource::Env);
            },
        );

        with_env(&[], || {
            let resolved = ResolvedConfig::resolve_with(&cli(&["stats"]), &config, &paths).unwrap();
            assert_eq!(resolved.fills_file, PathBuf::from("/from/config.json"));
            assert_eq!(resolved.format, OutputFormat::Md);
            assert_eq!(resolved.sources.format, ConfigSource::ConfigFile);
        });
    }

    #[test]
    fn refresh_interval_precedence() {
        let mut config = Config::default();
        config.general.refresh_interval_seconds = 300;
        let dir = TestDir::new();
        let paths = test_paths(&dir);

        with_env(&[(ENV_REFRESH_INTERVAL, "90")], || {
            let resolved =
                ResolvedConfig::resolve_with(&cli(&["watch", "--interval", "5"]), &config, &paths)
                    .unwrap();
            assert_eq!(resolved.refresh_interval, Duration::from_secs(5));

            let resolved = ResolvedConfig::resolve_with(&cli(&["watch"]), &config, &paths).unwrap();
            assert_eq!(resolved.refresh_interval, Duration::from_secs(90));
            assert_eq!(resolved.sources.refresh_interval, ConfigSource::Env);
        });

        with_env(&[(ENV_REFRESH_INTERVAL, "soon")], || {
            assert!(matches!(
                ResolvedConfig::resolve_with(&cli(&["watch"]), &config, &paths),
                Err(FuelError::ConfigInvalid { .. })
            ));
        });

        with_env(&[], || {
            let resolved = ResolvedConfig::resolve_with(&cli(&["watch"]), &config, &paths).unwrap();
            assert_eq!(resolved.refresh_interval, Duration::from_secs(300));
            assert_eq!(resolved.sources.refresh_interval, ConfigSource::ConfigFile);
        });
    }

    #[test]
    fn no_color_sources() {
        let dir = TestDir::new();
        let paths = test_paths(&dir);

        with_env(&[(ENV_NO_COLOR_STD, "")], || {
            let resolved =
                ResolvedConfig::resolve_with(&cli(&["stats"]), &Config::default(), &paths).unwrap();
            assert!(resolved.no_color);
            assert_eq!(resolved.sources.no_color, ConfigSource::Env);
        });

        with_env(&[(ENV_NO_COLOR, "0")], || {
            let resolved =
                ResolvedConfig::resolve_with(&cli(&["stats"]), &Config::default(), &paths).unwrap();
            assert!(!resolved.no_color);
        });
    }

    #[test]
    fn pretty_from_env_and_file() {
        let dir = TestDir::new();
        let paths = test_paths(&dir);

        with_env(&[(ENV_PRETTY, "yes")], || {
            let resolved =
                ResolvedConfig::resolve_with(&cli(&["stats"]), &Config::default(), &paths).unwrap();
            assert!(resolved.pretty);
            assert_eq!(resolved.sources.pretty, ConfigSource::Env);
        });
    }

    #[test]
    fn config_env_override_points_at_custom_file() {
        let dir = TestDir::new();
        let path = dir.create_file(
            "custom.toml",
            "[general]\nrefresh_interval_seconds = 99\n\n[output]\npretty = true\n",
        );

        with_env(&[(ENV_CONFIG, path.to_str().unwrap())], || {
            let resolved = ResolvedConfig::resolve(&cli(&["watch"])).unwrap();
            assert_eq!(resolved.refresh_interval, Duration::from_secs(99));
            assert!(resolved.pretty);
            assert_eq!(resolved.sources.pretty, ConfigSource::ConfigFile);
        });
    }

    #[test]
    fn invalid_config_file_fails_resolution() {
        let dir = TestDir::new();
        let path = dir.create_file("bad.toml", "[general]\nrefresh_interval_seconds = 0\n");

        with_env(&[(ENV_CONFIG, path.to_str().unwrap())], || {
            assert!(ResolvedConfig::resolve(&cli(&["stats"])).is_err());
        });
    }
}
