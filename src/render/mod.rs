//! Output rendering for human and robot modes.

pub mod error;
pub mod human;
pub mod robot;

use crate::cli::args::OutputFormat;
use crate::core::models::{FillsPayload, StatsPayload};
use crate::error::Result;

/// Render `stats` output.
///
/// # Errors
/// Returns a serialization error in JSON mode.
pub fn render_stats(
    payload: &StatsPayload,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => human::render_stats(payload, no_color),
        OutputFormat::Json => robot::render_stats_json(payload, pretty),
        OutputFormat::Md => robot::render_stats_md(payload),
    }
}

/// Render `fills` output.
///
/// # Errors
/// Returns a serialization error in JSON mode.
pub fn render_fills(
    payload: &FillsPayload,
    format: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Human => human::render_fills(payload, no_color),
        OutputFormat::Json => robot::render_fills_json(payload, pretty),
        OutputFormat::Md => robot::render_fills_md(payload),
    }
}
