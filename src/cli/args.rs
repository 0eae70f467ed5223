//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::{FuelError, Result};

/// Fuel fill statistics - consumption, spending and monthly totals.
#[derive(Parser, Debug)]
#[command(name = "fueltrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Format requested on the command line, if any.
    #[must_use]
    pub fn requested_format(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else {
            self.format
        }
    }

    /// Data selection flags of the active command.
    #[must_use]
    pub fn data_args(&self) -> Option<&DataArgs> {
        self.command.as_ref().map(Commands::data_args)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show fuel statistics
    Stats(StatsArgs),

    /// List fill records, newest first
    Fills(FillsArgs),

    /// Refresh statistics on an interval until interrupted
    Watch(WatchArgs),
}

impl Commands {
    #[must_use]
    pub const fn data_args(&self) -> &DataArgs {
        match self {
            Self::Stats(args) => &args.data,
            Self::Fills(args) => &args.data,
            Self::Watch(args) => &args.data,
        }
    }
}

/// Which fills to load and which vehicle to look at.
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Restrict to one vehicle
    #[arg(long, value_name = "ID")]
    pub vehicle: Option<i64>,

    /// Fill data file (JSON)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// Arguments for the `stats` command.
#[derive(Args, Debug, Clone, Default)]
pub struct StatsArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

/// Arguments for the `fills` command.
#[derive(Args, Debug, Clone, Default)]
pub struct FillsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Show at most N fills
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

/// Arguments for the `watch` command.
#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Seconds between refreshes
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,
}

impl WatchArgs {
    /// Validate argument combinations.
    ///
    /// # Errors
    /// Returns [`FuelError::InvalidArgument`] for a zero interval.
    pub fn validate(&self) -> Result<()> {
        if self.interval == Some(0) {
            return Err(FuelError::InvalidArgument {
                name: "--interval".to_string(),
                message: "must be greater than 0 seconds".to_string(),
            });
        }
        Ok(())
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    #[default]
    Human,
    /// JSON output
    Json,
    /// Markdown output
    Md,
}
