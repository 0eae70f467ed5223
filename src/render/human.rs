//! Human-readable output.
//!
//! Colors come from `colored`. With `no_color` set no escape codes are
//! emitted at all, regardless of terminal detection.

use std::fmt::Write as _;

use chrono::Utc;
use colored::Colorize;

use crate::core::models::{FillsPayload, FuelFillRecord, MonthlyBucket, StatsPayload};
use crate::core::refresh::RefreshStatus;
use crate::core::statistics::ConsumptionMethod;
use crate::error::Result;
use crate::util::format::{
    format_consumption, format_cost, format_liters, format_odometer, format_price_per_liter,
};
use crate::util::time::{format_days_since, format_relative_time};

/// Width of the longest bar in the monthly chart.
const CHART_WIDTH: usize = 24;

const LABEL_WIDTH: usize = 17;

#[derive(Clone, Copy)]
struct Palette {
    color: bool,
}

impl Palette {
    const fn new(no_color: bool) -> Self {
        Self { color: !no_color }
    }

    fn heading(self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn value(self, text: &str) -> String {
        if self.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    fn muted(self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn bar(self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    fn warn(self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }
}

fn scope_label(vehicle_id: Option<i64>) -> String {
    vehicle_id.map_or_else(|| "all vehicles".to_string(), |id| format!("vehicle {id}"))
}

fn row(out: &mut String, palette: Palette, label: &str, value: &str) {
    // Pad before coloring; escape codes would count toward the width.
    let label = format!("{label:<LABEL_WIDTH$}");
    let _ = writeln!(out, "  {}{}", palette.muted(&label), palette.value(value));
}

/// Render the `stats` command.
///
/// # Errors
/// Infallible today; returns `Result` to match the other renderers.
pub fn render_stats(payload: &StatsPayload, no_color: bool) -> Result<String> {
    let palette = Palette::new(no_color);
    let stats = &payload.statistics;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}",
        palette.heading(&format!("Fuel statistics ({})", scope_label(payload.vehicle_id)))
    );
    let _ = writeln!(out, "{}", palette.muted(&format!("Source: {}", payload.source)));
    out.push('\n');

    if stats.total_fills == 0 {
        let _ = writeln!(out, "  {}", palette.warn("No fills recorded yet."));
        return Ok(out);
    }

    row(&mut out, palette, "Fills", &stats.total_fills.to_string());
    row(&mut out, palette, "Total volume", &format_liters(stats.total_liters));
    row(&mut out, palette, "Total spent", &format_cost(stats.total_cost));
    row(
        &mut out,
        palette,
        "Avg price",
        &format_price_per_liter(stats.avg_price_per_liter),
    );

    let consumption = match payload.consumption_method {
        ConsumptionMethod::None => format_consumption(stats.avg_consumption),
        method => format!(
            "{} (from {})",
            format_consumption(stats.avg_consumption),
            method.label()
        ),
    };
    row(&mut out, palette, "Avg consumption", &consumption);

    if let Some(date) = stats.last_fill_date {
        let today = Utc::now().date_naive();
        row(
            &mut out,
            palette,
            "Last fill",
            &format!("{date} ({})", format_days_since(date, today)),
        );
    }
    row(
        &mut out,
        palette,
        "Last odometer",
        &stats.last_odometer.map_or_else(|| "-".to_string(), format_odometer),
    );

    if !stats.monthly_chart.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "{}", palette.heading("Monthly spending"));
        out.push_str(&render_monthly_chart(&stats.monthly_chart, palette));
    }

    Ok(out)
}

fn bar_length(amount: f64, max: f64) -> usize {
    if max <= 0.0 || amount <= 0.0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)] // chart width is tiny
    let width = CHART_WIDTH as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 1..=width
    let len = (amount / max * width).round().clamp(1.0, width) as usize;
    len
}

fn render_monthly_chart(buckets: &[MonthlyBucket], palette: Palette) -> String {
    let max = buckets.iter().map(|b| b.amount).fold(0.0_f64, f64::max);
    let mut out = String::new();

    for bucket in buckets {
        let len = bar_length(bucket.amount, max);
        let bar = "█".repeat(len);
        let pad = " ".repeat(CHART_WIDTH - len);
        let fills = if bucket.count == 1 { "fill" } else { "fills" };
        let _ = writeln!(
            out,
            "  {}  {}{}  {:>9}  {}",
            palette.muted(&bucket.month),
            palette.bar(&bar),
            pad,
            format_cost(bucket.amount),
            palette.muted(&format!("{} {fills}", bucket.count)),
        );
    }

    out
}

fn cell<T>(value: Option<T>, fmt: impl FnOnce(T) -> String) -> String {
    value.map_or_else(|| "-".to_string(), fmt)
}

/// Render the `fills` command.
///
/// # Errors
/// Infallible today; returns `Result` to match the other renderers.
pub fn render_fills(payload: &FillsPayload, no_color: bool) -> Result<String> {
    let palette = Palette::new(no_color);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}",
        palette.heading(&format!(
            "Fills ({}) - showing {} of {}",
            scope_label(payload.vehicle_id),
            payload.fills.len(),
            payload.total
        ))
    );

    if payload.fills.is_empty() {
        let _ = writeln!(out, "  {}", palette.warn("No fills recorded yet."));
        return Ok(out);
    }

    let header = format!(
        "  {:<10}  {:>7}  {:>12}  {:>9}  {:>9}  {:>8}  {}",
        "Date", "Vehicle", "Odometer", "Liters", "Amount", "Price", "Notes"
    );
    let _ = writeln!(out, "{}", palette.muted(&header));

    for fill in &payload.fills {
        out.push_str(&fill_line(fill));
        out.push('\n');
    }

    Ok(out)
}

fn fill_line(fill: &FuelFillRecord) -> String {
    format!(
        "  {:<10}  {:>7}  {:>12}  {:>9}  {:>9}  {:>8}  {}",
        fill.date.format("%Y-%m-%d"),
        fill.vehicle_id,
        cell(fill.odometer, format_odometer),
        cell(fill.liters, |l| format!("{l:.2}")),
        cell(fill.amount, format_cost),
        cell(fill.price_per_liter, |p| format!("{p:.3}")),
        fill.notes.as_deref().unwrap_or(""),
    )
    .trim_end()
    .to_string()
}

/// Render one `watch` frame: the statistics plus the refresh status line.
///
/// # Errors
/// Infallible today; returns `Result` to match the other renderers.
pub fn render_watch_frame(
    payload: &StatsPayload,
    status: &RefreshStatus,
    no_color: bool,
) -> Result<String> {
    let palette = Palette::new(no_color);
    let mut out = render_stats(payload, no_color)?;
    out.push('\n');

    let refreshed = status
        .last_refreshed_at
        .map_or_else(|| "never".to_string(), format_relative_time);
    let _ = writeln!(
        out,
        "{}",
        palette.muted(&format!(
            "Refreshed {} time{} (last: {refreshed})",
            status.refresh_count,
            if status.refresh_count == 1 { "" } else { "s" }
        ))
    );

    if let Some(error) = &status.last_error {
        let _ = writeln!(
            out,
            "{}",
            palette.warn(&format!(
                "Last refresh failed ({} failure{} so far): {error}",
                status.failure_count,
                if status.failure_count == 1 { "" } else { "s" }
            ))
        );
    }

    let _ = writeln!(out, "{}", palette.muted("Press Ctrl+C to stop."));
    Ok(out)
}
