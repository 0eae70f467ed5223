//! Robot-mode output (JSON and Markdown).
//!
//! JSON is wrapped in a [`RobotOutput`] envelope with a stable schema version.

use std::fmt::Write as _;

use crate::core::models::{FillsPayload, RobotOutput, StatsPayload};
use crate::error::Result;

/// Render any serializable value as JSON.
///
/// # Errors
/// Returns a serialization error.
pub fn render_json<T: serde::Serialize>(output: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    Ok(json)
}

/// Render the `stats` command as a JSON envelope.
///
/// # Errors
/// Returns a serialization error.
pub fn render_stats_json(payload: &StatsPayload, pretty: bool) -> Result<String> {
    let output = RobotOutput::new("stats", payload).for_vehicle(payload.vehicle_id);
    render_json(&output, pretty)
}

/// Render the `fills` command as a JSON envelope.
///
/// # Errors
/// Returns a serialization error.
pub fn render_fills_json(payload: &FillsPayload, pretty: bool) -> Result<String> {
    let output = RobotOutput::new("fills", payload).for_vehicle(payload.vehicle_id);
    render_json(&output, pretty)
}

/// Render the `stats` command as Markdown.
///
/// # Errors
/// Infallible today; returns `Result` to match the other renderers.
pub fn render_stats_md(payload: &StatsPayload) -> Result<String> {
    let stats = &payload.statistics;
    let mut out = String::new();

    let scope = payload
        .vehicle_id
        .map_or_else(|| "all vehicles".to_string(), |id| format!("vehicle {id}"));
    let _ = writeln!(out, "## Fuel statistics ({scope})\n");
    let _ = writeln!(out, "- total_fills: {}", stats.total_fills);
    let _ = writeln!(out, "- total_liters: {:.2}", stats.total_liters);
    let _ = writeln!(out, "- total_cost: {:.2}", stats.total_cost);
    let _ = writeln!(out, "- avg_price_per_liter: {:.3}", stats.avg_price_per_liter);
    let _ = writeln!(out, "- avg_consumption: {:.2}", stats.avg_consumption);
    let _ = writeln!(out, "- consumption_method: {}", payload.consumption_method.label());
    match stats.last_fill_date {
        Some(date) => {
            let _ = writeln!(out, "- last_fill_date: {date}");
        }
        None => out.push_str("- last_fill_date: none\n"),
    }
    match stats.last_odometer {
        Some(km) => {
            let _ = writeln!(out, "- last_odometer: {km}");
        }
        None => out.push_str("- last_odometer: none\n"),
    }

    if !stats.monthly_chart.is_empty() {
        out.push_str("\n### Monthly\n\n");
        out.push_str("| Month | Amount | Fills | Odometer |\n");
        out.push_str("|-------|-------:|------:|---------:|\n");
        for bucket in &stats.monthly_chart {
            let odometer = bucket
                .odometer
                .map_or_else(|| "-".to_string(), |km| km.to_string());
            let _ = writeln!(
                out,
                "| {} | {:.2} | {} | {odometer} |",
                bucket.month, bucket.amount, bucket.count
            );
        }
    }

    Ok(out)
}

/// Render the `fills` command as a Markdown table.
///
/// # Errors
/// Infallible today; returns `Result` to match the other renderers.
pub fn render_fills_md(payload: &FillsPayload) -> Result<String> {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "## Fills ({} of {})\n",
        payload.fills.len(),
        payload.total
    );
    out.push_str("| Id | Date | Vehicle | Odometer | Liters | Amount | Price/L |\n");
    out.push_str("|---:|------|--------:|---------:|-------:|-------:|--------:|\n");

    let dash = || "-".to_string();
    for fill in &payload.fills {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            fill.id,
            fill.date.format("%Y-%m-%d"),
            fill.vehicle_id,
            fill.odometer.map_or_else(dash, |km| km.to_string()),
            fill.liters.map_or_else(dash, |l| format!("{l:.2}")),
            fill.amount.map_or_else(dash, |a| format!("{a:.2}")),
            fill.price_per_liter.map_or_else(dash, |p| format!("{p:.3}")),
        );
    }

    Ok(out)
}
