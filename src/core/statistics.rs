//! Fill statistics engine.
//!
//! Turns an unordered collection of fill records into a [`StatisticsSnapshot`].
//! The computation is pure and total: any input, including an empty slice,
//! yields a fully populated snapshot.
//!
//! ## Average consumption
//!
//! Odometer readings are frequently missing, so consumption is estimated
//! through a tiered fallback. The first tier producing a non-zero value wins:
//!
//! 1. **Odometer delta**: liters over distance between consecutive readings.
//! 2. **Time interval**: liters over an assumed 35 km/day between fills that
//!    are less than 90 days apart, kept only inside the 3-15 L/100km band.
//! 3. **Per-fill average**: twice the mean fill volume, clamped to 6-8 L/100km.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::models::{FuelFillRecord, MonthlyBucket, StatisticsSnapshot};

/// Assumed average distance driven per day when no odometer data exists.
pub const ASSUMED_DAILY_DISTANCE_KM: f64 = 35.0;

/// Intervals at or beyond this many days are treated as gaps in the history.
pub const MAX_INTERVAL_DAYS: i64 = 90;

/// Plausible band for the time-interval estimate (L/100km).
pub const PLAUSIBLE_CONSUMPTION_RANGE: (f64, f64) = (3.0, 15.0);

/// Clamp applied to the per-fill average estimate (L/100km).
pub const PER_FILL_CONSUMPTION_RANGE: (f64, f64) = (6.0, 8.0);

/// Number of most recent months kept in the chart.
pub const MONTHLY_CHART_LIMIT: usize = 12;

/// How the average consumption figure was derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsumptionMethod {
    /// Distance between consecutive odometer readings.
    OdometerDelta,
    /// Days between fills times an assumed daily distance.
    TimeInterval,
    /// Clamped multiple of the mean fill volume.
    PerFillAverage,
    /// Not enough data for any estimate.
    #[default]
    None,
}

impl ConsumptionMethod {
    /// Short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OdometerDelta => "odometer readings",
            Self::TimeInterval => "time between fills",
            Self::PerFillAverage => "average fill volume",
            Self::None => "not enough data",
        }
    }
}

/// Estimated consumption together with the tier that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionEstimate {
    /// Liters per 100 km; 0 when no tier applies.
    pub value: f64,
    pub method: ConsumptionMethod,
}

/// Compute statistics for a collection of fills.
#[must_use]
pub fn compute_statistics(records: &[FuelFillRecord]) -> StatisticsSnapshot {
    if records.is_empty() {
        return StatisticsSnapshot::empty();
    }

    let total_liters: f64 = records.iter().filter_map(|r| quantity(r.liters)).sum();
    let total_cost: f64 = records.iter().filter_map(|r| quantity(r.amount)).sum();
    let avg_price_per_liter = if total_liters > 0.0 {
        total_cost / total_liters
    } else {
        0.0
    };

    let sorted = sorted_by_date(records);
    let consumption = estimate_sorted(&sorted);
    let last = sorted.last();

    StatisticsSnapshot {
        total_fills: records.len(),
        total_liters,
        total_cost,
        avg_price_per_liter,
        avg_consumption: consumption.value,
        last_fill_date: last.map(|r| r.date),
        last_odometer: last.and_then(|r| r.odometer),
        monthly_chart: monthly_chart(records),
    }
}

/// Estimate average consumption (L/100km) using the tiered fallback.
#[must_use]
pub fn estimate_consumption(records: &[FuelFillRecord]) -> ConsumptionEstimate {
    estimate_sorted(&sorted_by_date(records))
}

/// Month key (`YYYY-MM`) for a fill date.
#[must_use]
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// A usable liters or amount reading: finite and non-negative.
///
/// Records built in code bypass the lenient decoder, so every read of a
/// quantity goes through here.
#[must_use]
pub fn quantity(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// Round a currency amount to two decimal places.
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// Stable: records sharing a date keep their input order.
fn sorted_by_date(records: &[FuelFillRecord]) -> Vec<&FuelFillRecord> {
    let mut sorted: Vec<&FuelFillRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);
    sorted
}

fn estimate_sorted(sorted: &[&FuelFillRecord]) -> ConsumptionEstimate {
    let tiers: [(ConsumptionMethod, fn(&[&FuelFillRecord]) -> Option<f64>); 3] = [
        (ConsumptionMethod::OdometerDelta, odometer_delta),
        (ConsumptionMethod::TimeInterval, time_interval),
        (ConsumptionMethod::PerFillAverage, per_fill_average),
    ];

    for (method, tier) in tiers {
        if let Some(value) = tier(sorted).filter(|v| *v != 0.0) {
            tracing::trace!(?method, value, "consumption estimated");
            return ConsumptionEstimate { value, method };
        }
    }

    ConsumptionEstimate::default()
}

fn odometer_delta(sorted: &[&FuelFillRecord]) -> Option<f64> {
    let mut distance_sum: u64 = 0;
    let mut liters_sum = 0.0;

    for pair in sorted.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let (Some(prev_km), Some(curr_km), Some(liters)) =
            (prev.odometer, curr.odometer, quantity(curr.liters))
        else {
            continue;
        };
        if curr_km > prev_km {
            distance_sum += u64::from(curr_km - prev_km);
            liters_sum += liters;
        }
    }

    if distance_sum == 0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)] // odometer sums stay far below 2^52
    let distance = distance_sum as f64;
    Some(liters_sum / distance * 100.0)
}

fn time_interval(sorted: &[&FuelFillRecord]) -> Option<f64> {
    let fills: Vec<&FuelFillRecord> = sorted
        .iter()
        .copied()
        .filter(|r| r.has_positive_liters())
        .collect();

    let mut total_liters = 0.0;
    let mut total_days: i64 = 0;
    let mut accepted = 0_usize;

    for pair in fills.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let Some(liters) = quantity(curr.liters) else {
            continue;
        };
        let days = (curr.date - prev.date).num_days();
        if days > 0 && days < MAX_INTERVAL_DAYS {
            total_liters += liters;
            total_days += days;
            accepted += 1;
        }
    }

    if accepted == 0 || total_days <= 0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)] // day counts are tiny
    let total_distance = ASSUMED_DAILY_DISTANCE_KM * total_days as f64;
    let estimate = total_liters / total_distance * 100.0;

    let (min, max) = PLAUSIBLE_CONSUMPTION_RANGE;
    if (min..=max).contains(&estimate) {
        Some(estimate)
    } else {
        tracing::trace!(estimate, "time-interval estimate outside plausible band");
        None
    }
}

fn per_fill_average(sorted: &[&FuelFillRecord]) -> Option<f64> {
    let volumes: Vec<f64> = sorted
        .iter()
        .filter_map(|r| quantity(r.liters))
        .filter(|l| *l > 0.0)
        .collect();

    if volumes.len() < 2 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)] // fill counts are tiny
    let mean = volumes.iter().sum::<f64>() / volumes.len() as f64;
    let (min, max) = PER_FILL_CONSUMPTION_RANGE;
    Some((mean * 2.0).clamp(min, max))
}

fn monthly_chart(records: &[FuelFillRecord]) -> Vec<MonthlyBucket> {
    let mut buckets: BTreeMap<String, MonthlyBucket> = BTreeMap::new();

    // Input order, not date order: the stored odometer is the last one seen.
    for record in records {
        let key = month_key(record.date);
        let bucket = buckets.entry(key.clone()).or_insert_with(|| MonthlyBucket {
            month: key,
            amount: 0.0,
            count: 0,
            odometer: None,
        });
        bucket.amount += quantity(record.amount).unwrap_or(0.0);
        bucket.count += 1;
        if record.odometer.is_some() {
            bucket.odometer = record.odometer;
        }
    }

    let skip = buckets.len().saturating_sub(MONTHLY_CHART_LIMIT);
    buckets
        .into_values()
        .skip(skip)
        .map(|mut bucket| {
            bucket.amount = round_cents(bucket.amount);
            bucket
        })
        .collect()
}
