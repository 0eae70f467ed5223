//! Number formatting utilities.

/// Format a money amount with two decimals.
#[must_use]
pub fn format_cost(value: f64) -> String {
    format!("{value:.2}")
}

/// Format a fuel volume.
#[must_use]
pub fn format_liters(value: f64) -> String {
    format!("{value:.2} L")
}

/// Format a unit price.
#[must_use]
pub fn format_price_per_liter(value: f64) -> String {
    format!("{value:.3}/L")
}

/// Format a consumption figure; zero means "not enough data".
#[must_use]
pub fn format_consumption(value: f64) -> String {
    if value > 0.0 {
        format!("{value:.1} L/100km")
    } else {
        "n/a".to_string()
    }
}

/// Format an odometer reading with thousands separators.
#[must_use]
pub fn format_odometer(km: u32) -> String {
    let digits = km.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push_str(" km");
    out
}
