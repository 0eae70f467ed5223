//! fueltrack - fuel fill statistics
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use fueltrack::cli::{Cli, OutputFormat};
use fueltrack::core::logging;
use fueltrack::render::error::render_error;
use fueltrack::storage::ResolvedConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(command) = cli.command.as_ref() else {
        print_quickstart();
        return ExitCode::SUCCESS;
    };

    let config = match ResolvedConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&cli, None);
            return report(&e, cli.requested_format().unwrap_or_default(), cli.no_color, cli.pretty);
        }
    };
    init_logging(&cli, config.log_level.as_deref());

    let no_color = config.no_color || !fueltrack::util::env::should_use_color(false);
    let config = ResolvedConfig { no_color, ..config };

    match fueltrack::cli::run(command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e, config.format, config.no_color, config.pretty),
    }
}

/// Flag, then `FUELTRACK_LOG`, then the config file.
fn init_logging(cli: &Cli, config_level: Option<&str>) {
    let log_level = cli
        .log_level
        .as_deref()
        .and_then(logging::LogLevel::from_arg)
        .or_else(|| logging::parse_log_level_from_env().map(logging::LogLevel::from_tracing_level))
        .or_else(|| config_level.and_then(logging::LogLevel::from_arg))
        .unwrap_or_default();
    let log_format = if cli.json_output {
        logging::LogFormat::Json
    } else {
        logging::parse_log_format_from_env().unwrap_or_default()
    };
    logging::init(
        log_level,
        log_format,
        logging::parse_log_file_from_env(),
        cli.verbose,
    );
}

fn report(error: &fueltrack::FuelError, format: OutputFormat, no_color: bool, pretty: bool) -> ExitCode {
    tracing::error!(code = %error.code(), "{error}");
    eprintln!("{}", render_error(error, format, no_color, pretty));
    ExitCode::from(error.exit_code() as u8)
}

fn print_quickstart() {
    println!(
        r"fueltrack - fuel fill statistics

USAGE:
    fueltrack [OPTIONS] <COMMAND>

COMMANDS:
    stats   Show consumption, spending and monthly totals
    fills   List fill records, newest first
    watch   Refresh statistics on an interval until Ctrl+C

QUICK START:
    fueltrack stats --file fills.json          # Statistics for every vehicle
    fueltrack stats --vehicle 2                # One vehicle
    fueltrack fills --limit 5                  # Five most recent fills
    fueltrack watch --interval 60              # Live view

ROBOT MODE:
    fueltrack stats --json                     # JSON envelope
    fueltrack fills --format md                # Markdown table

For more help: fueltrack --help
"
    );
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
}
