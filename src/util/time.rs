//! Time formatting utilities.

use chrono::{DateTime, NaiveDate, Utc};

/// Format how long ago a fill happened, relative to `today`.
#[must_use]
pub fn format_days_since(date: NaiveDate, today: NaiveDate) -> String {
    match (today - date).num_days() {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        days if days > 1 => format!("{days} days ago"),
        _ => "in the future".to_string(),
    }
}

/// Format a relative time (past or future).
#[must_use]
pub fn format_relative_time(target: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(target);

    if duration.num_seconds().abs() < 60 {
        return "just now".to_string();
    }

    let minutes = duration.num_minutes().abs();
    let hours = duration.num_hours().abs();
    let days = duration.num_days().abs();

    let suffix = if duration.num_seconds() > 0 {
        "ago"
    } else {
        "from now"
    };

    if days > 0 {
        format!("{days} day{} {suffix}", if days == 1 { "" } else { "s" })
    } else if hours > 0 {
        format!("{hours} hour{} {suffix}", if hours == 1 { "" } else { "s" })
    } else {
        format!(
            "{minutes} minute{} {suffix}",
            if minutes == 1 { "" } else { "s" }
        )
    }
}
