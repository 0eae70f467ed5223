//! Core data models.
//!
//! These types represent fuel fill records and the statistics derived from
//! them. Serialized field names are camelCase to match the data files written
//! by the web front end.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::statistics::ConsumptionMethod;

// =============================================================================
// Fuel Fill Record
// =============================================================================

/// One fuel purchase event.
///
/// Only `id`, `vehicle_id` and `date` are guaranteed. Every numeric field is
/// optional and every consumer must handle the absent case explicitly.
///
/// # Fields
/// - `id`: Server-assigned id, or a negative placeholder for optimistic inserts.
/// - `odometer`: Cumulative distance reading in kilometers.
/// - `liters`: Volume purchased.
/// - `amount`: Total price paid.
/// - `price_per_liter`: Unit price as entered; not cross-checked against `amount / liters`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FuelFillRecord {
    pub id: i64,

    pub vehicle_id: i64,

    #[serde(with = "fill_date")]
    pub date: NaiveDate,

    #[serde(
        default,
        deserialize_with = "lenient::odometer",
        skip_serializing_if = "Option::is_none"
    )]
    pub odometer: Option<u32>,

    #[serde(
        default,
        deserialize_with = "lenient::quantity",
        skip_serializing_if = "Option::is_none"
    )]
    pub liters: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient::quantity",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient::quantity",
        skip_serializing_if = "Option::is_none"
    )]
    pub price_per_liter: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl FuelFillRecord {
    /// Create a record with only the required fields set.
    #[must_use]
    pub const fn new(id: i64, vehicle_id: i64, date: NaiveDate) -> Self {
        Self {
            id,
            vehicle_id,
            date,
            odometer: None,
            liters: None,
            amount: None,
            price_per_liter: None,
            notes: None,
            created_at: None,
        }
    }

    /// Set the odometer reading.
    #[must_use]
    pub const fn with_odometer(mut self, km: u32) -> Self {
        self.odometer = Some(km);
        self
    }

    /// Set the volume purchased.
    #[must_use]
    pub const fn with_liters(mut self, liters: f64) -> Self {
        self.liters = Some(liters);
        self
    }

    /// Set the amount paid.
    #[must_use]
    pub const fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the unit price.
    #[must_use]
    pub const fn with_price_per_liter(mut self, price: f64) -> Self {
        self.price_per_liter = Some(price);
        self
    }

    /// Attach a free-text note.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Whether the record carries a positive fuel volume.
    #[must_use]
    pub fn has_positive_liters(&self) -> bool {
        crate::core::statistics::quantity(self.liters).is_some_and(|l| l > 0.0)
    }
}

/// Parse a fill date from either `YYYY-MM-DD` or a timestamp starting with one.
#[must_use]
pub fn parse_fill_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok().or_else(|| {
        trimmed
            .get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    })
}

mod fill_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_fill_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid fill date: {raw:?}")))
    }
}

/// Deserializers that map malformed numeric input to `None` instead of failing.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn non_negative(value: &Value) -> Option<f64> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        (number.is_finite() && number >= 0.0).then_some(number)
    }

    pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(non_negative))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above the cast
    pub fn odometer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(non_negative)
            .map(f64::round)
            .filter(|km| *km <= f64::from(u32::MAX))
            .map(|km| km as u32))
    }
}

// =============================================================================
// Partial Update
// =============================================================================

/// Partial field set merged into a record by an optimistic update.
///
/// Nullable fields use `Option<Option<T>>`: the outer `None` leaves the field
/// untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillPatch {
    pub vehicle_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub odometer: Option<Option<u32>>,
    pub liters: Option<Option<f64>>,
    pub amount: Option<Option<f64>>,
    pub price_per_liter: Option<Option<f64>>,
    pub notes: Option<Option<String>>,
}

impl FillPatch {
    /// Create an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn vehicle_id(mut self, vehicle_id: i64) -> Self {
        self.vehicle_id = Some(vehicle_id);
        self
    }

    #[must_use]
    pub const fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub const fn odometer(mut self, odometer: Option<u32>) -> Self {
        self.odometer = Some(odometer);
        self
    }

    #[must_use]
    pub const fn liters(mut self, liters: Option<f64>) -> Self {
        self.liters = Some(liters);
        self
    }

    #[must_use]
    pub const fn amount(mut self, amount: Option<f64>) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub const fn price_per_liter(mut self, price: Option<f64>) -> Self {
        self.price_per_liter = Some(price);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }

    /// Whether applying the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the patch into a record.
    pub fn apply(&self, record: &mut FuelFillRecord) {
        if let Some(vehicle_id) = self.vehicle_id {
            record.vehicle_id = vehicle_id;
        }
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(odometer) = self.odometer {
            record.odometer = odometer;
        }
        if let Some(liters) = self.liters {
            record.liters = liters;
        }
        if let Some(amount) = self.amount {
            record.amount = amount;
        }
        if let Some(price) = self.price_per_liter {
            record.price_per_liter = price;
        }
        if let Some(notes) = &self.notes {
            record.notes.clone_from(notes);
        }
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// One month of fills, used to drive the spending chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    /// Month key, `YYYY-MM`.
    pub month: String,
    /// Amount spent, rounded to cents.
    pub amount: f64,
    /// Number of fills in the month.
    pub count: u32,
    /// Odometer of the last record seen for this month, in input order.
    pub odometer: Option<u32>,
}

/// Derived analytics over a collection of fills. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    pub total_fills: usize,
    pub total_liters: f64,
    pub total_cost: f64,
    pub avg_price_per_liter: f64,
    /// Estimated liters per 100 km; 0 when it cannot be estimated.
    pub avg_consumption: f64,
    pub last_fill_date: Option<NaiveDate>,
    pub last_odometer: Option<u32>,
    pub monthly_chart: Vec<MonthlyBucket>,
}

impl StatisticsSnapshot {
    /// The snapshot of an empty collection.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total_fills: 0,
            total_liters: 0.0,
            total_cost: 0.0,
            avg_price_per_liter: 0.0,
            avg_consumption: 0.0,
            last_fill_date: None,
            last_odometer: None,
            monthly_chart: Vec::new(),
        }
    }
}

impl Default for StatisticsSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// Robot Output
// =============================================================================

/// Schema version stamped on every JSON envelope.
pub const SCHEMA_VERSION: &str = "fueltrack.v1";

/// JSON envelope for machine-readable command output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,

    #[serde(default)]
    pub errors: Vec<String>,

    pub meta: RobotMeta,
}

/// Metadata for robot output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotMeta {
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<i64>,
    pub runtime: String,
}

impl<T> RobotOutput<T> {
    /// Create a new robot output envelope.
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            command: command.into(),
            data,
            errors: Vec::new(),
            meta: RobotMeta {
                format: "json".to_string(),
                vehicle_id: None,
                runtime: "cli".to_string(),
            },
        }
    }

    /// Record the vehicle filter the data was computed for.
    #[must_use]
    pub const fn for_vehicle(mut self, vehicle_id: Option<i64>) -> Self {
        self.meta.vehicle_id = vehicle_id;
        self
    }

    /// Attach non-fatal error messages.
    #[must_use]
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}

// =============================================================================
// Command Payloads
// =============================================================================

/// Data of the `stats` command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<i64>,
    /// Where the fills were loaded from.
    pub source: String,
    pub statistics: StatisticsSnapshot,
    pub consumption_method: ConsumptionMethod,
}

/// Data of the `fills` command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FillsPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<i64>,
    pub source: String,
    /// Matching fills before `--limit` was applied.
    pub total: usize,
    /// Newest first.
    pub fills: Vec<FuelFillRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn deserializes_camel_case_record() {
        let json = r#"{
            "id": 7,
            "vehicleId": 2,
            "date": "2024-03-05",
            "odometer": 45210,
            "liters": 41.5,
            "amount": 72.9,
            "pricePerLiter": 1.757,
            "notes": "highway trip",
            "createdAt": "2024-03-05T18:22:10Z"
        }"#;
        let record: FuelFillRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.vehicle_id, 2);
        assert_eq!(record.date, date("2024-03-05"));
        assert_eq!(record.odometer, Some(45210));
        assert_eq!(record.liters, Some(41.5));
        assert_eq!(record.price_per_liter, Some(1.757));
        assert_eq!(record.notes.as_deref(), Some("highway trip"));
        assert!(record.created_at.is_some());
    }

    #[test]
    fn missing_optional_fields_are_none() {
        let json = r#"{"id": 1, "vehicleId": 1, "date": "2024-01-01"}"#;
        let record: FuelFillRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, FuelFillRecord::new(1, 1, date("2024-01-01")));
    }

    #[test]
    fn malformed_numbers_are_treated_as_absent() {
        let json = r#"{
            "id": 1,
            "vehicleId": 1,
            "date": "2024-01-01",
            "odometer": "n/a",
            "liters": -4,
            "amount": "38.20",
            "pricePerLiter": true
        }"#;
        let record: FuelFillRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.odometer, None);
        assert_eq!(record.liters, None);
        assert_eq!(record.amount, Some(38.2));
        assert_eq!(record.price_per_liter, None);
    }

    #[test]
    fn accepts_timestamp_dates() {
        let json = r#"{"id": 1, "vehicleId": 1, "date": "2024-02-29T08:15:00.000Z"}"#;
        let record: FuelFillRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.date, date("2024-02-29"));
    }

    #[test]
    fn rejects_missing_date() {
        let json = r#"{"id": 1, "vehicleId": 1, "date": "yesterday"}"#;
        assert!(serde_json::from_str::<FuelFillRecord>(json).is_err());
    }

    #[test]
    fn serializes_date_as_plain_iso() {
        let record = FuelFillRecord::new(3, 1, date("2024-06-01")).with_liters(30.0);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-06-01");
        assert_eq!(json["vehicleId"], 1);
        assert!(json.get("odometer").is_none());
    }

    #[test]
    fn patch_sets_and_clears_fields() {
        let mut record = FuelFillRecord::new(1, 1, date("2024-01-01"))
            .with_odometer(1000)
            .with_liters(40.0)
            .with_notes("old");

        FillPatch::new()
            .odometer(None)
            .liters(Some(35.5))
            .notes(Some("new".to_string()))
            .apply(&mut record);

        assert_eq!(record.odometer, None);
        assert_eq!(record.liters, Some(35.5));
        assert_eq!(record.notes.as_deref(), Some("new"));
        assert_eq!(record.id, 1);
    }

    #[test]
    fn empty_patch_is_noop() {
        let original = FuelFillRecord::new(1, 1, date("2024-01-01")).with_amount(50.0);
        let mut record = original.clone();
        let patch = FillPatch::new();
        assert!(patch.is_empty());
        patch.apply(&mut record);
        assert_eq!(record, original);
    }

    #[test]
    fn empty_snapshot_serializes_nulls() {
        let json = serde_json::to_value(StatisticsSnapshot::empty()).unwrap();
        assert_eq!(json["totalFills"], 0);
        assert!(json["lastFillDate"].is_null());
        assert!(json["lastOdometer"].is_null());
        assert_eq!(json["monthlyChart"], serde_json::json!([]));
    }

    #[test]
    fn robot_output_envelope() {
        let output = RobotOutput::new("stats", StatisticsSnapshot::empty()).for_vehicle(Some(4));
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["schemaVersion"], SCHEMA_VERSION);
        assert_eq!(json["command"], "stats");
        assert_eq!(json["meta"]["vehicleId"], 4);
    }
}
