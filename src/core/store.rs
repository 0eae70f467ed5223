//! In-memory fill collection with optimistic mutations.
//!
//! [`FillStore`] holds the current records and a cached [`StatisticsSnapshot`].
//! Every mutating call regenerates the snapshot before returning, so
//! `store.statistics() == compute_statistics(store.records())` holds between
//! calls. Unknown ids are silently ignored; the UI owns rollback.

use crate::core::models::{FillPatch, FuelFillRecord, StatisticsSnapshot};
use crate::core::statistics::compute_statistics;

/// Current fill records plus their derived statistics.
#[derive(Debug, Clone, Default)]
pub struct FillStore {
    records: Vec<FuelFillRecord>,
    statistics: StatisticsSnapshot,
    next_placeholder: i64,
}

impl FillStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given records.
    #[must_use]
    pub fn with_records(records: Vec<FuelFillRecord>) -> Self {
        let mut store = Self::new();
        store.replace_all(records);
        store
    }

    /// Records in their current order (newest optimistic inserts first).
    #[must_use]
    pub fn records(&self) -> &[FuelFillRecord] {
        &self.records
    }

    /// Cached statistics for the whole collection.
    #[must_use]
    pub const fn statistics(&self) -> &StatisticsSnapshot {
        &self.statistics
    }

    /// Number of records held, placeholders included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record carrying `id`.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&FuelFillRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Swap in a freshly fetched collection.
    ///
    /// This is a full replacement: optimistic changes not yet reflected in
    /// `records` are discarded.
    pub fn replace_all(&mut self, records: Vec<FuelFillRecord>) {
        self.records = records;
        self.recompute();
        tracing::debug!(fills = self.records.len(), "replaced fill collection");
    }

    /// Prepend a record that has not been confirmed by the backend yet.
    ///
    /// No de-duplication is performed.
    pub fn add_optimistic(&mut self, record: FuelFillRecord) {
        tracing::debug!(id = record.id, vehicle_id = record.vehicle_id, "optimistic add");
        self.records.insert(0, record);
        self.recompute();
    }

    /// Merge `patch` into every record carrying `id`.
    ///
    /// Returns whether any record matched.
    pub fn update_optimistic(&mut self, id: i64, patch: &FillPatch) -> bool {
        let mut matched = false;
        for record in self.records.iter_mut().filter(|r| r.id == id) {
            patch.apply(record);
            matched = true;
        }

        if matched {
            self.recompute();
        }
        tracing::debug!(id, matched, "optimistic update");
        matched
    }

    /// Remove every record carrying `id`.
    ///
    /// Returns whether anything was removed.
    pub fn delete_optimistic(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;

        if removed {
            self.recompute();
        }
        tracing::debug!(id, removed, fills = self.records.len(), "optimistic delete");
        removed
    }

    /// Re-key an optimistically added record with the id assigned by the backend.
    ///
    /// Returns whether the placeholder was found.
    pub fn confirm_optimistic(&mut self, placeholder_id: i64, server_id: i64) -> bool {
        let mut matched = false;
        for record in self.records.iter_mut().filter(|r| r.id == placeholder_id) {
            record.id = server_id;
            matched = true;
        }

        if matched {
            self.recompute();
        }
        tracing::debug!(placeholder_id, server_id, matched, "optimistic confirm");
        matched
    }

    /// Hand out a temporary id for an optimistic insert.
    ///
    /// Placeholders are negative and never collide with an id already held.
    pub fn next_placeholder_id(&mut self) -> i64 {
        let lowest_held = self.records.iter().map(|r| r.id).min().unwrap_or(0).min(0);
        let id = self.next_placeholder.min(lowest_held) - 1;
        self.next_placeholder = id;
        id
    }

    /// Records for one vehicle, or all records when `vehicle_id` is `None`.
    #[must_use]
    pub fn filter_by_vehicle(&self, vehicle_id: Option<i64>) -> Vec<FuelFillRecord> {
        match vehicle_id {
            Some(vehicle_id) => self
                .records
                .iter()
                .filter(|r| r.vehicle_id == vehicle_id)
                .cloned()
                .collect(),
            None => self.records.clone(),
        }
    }

    /// Statistics for one vehicle, or for all records when `vehicle_id` is `None`.
    ///
    /// Computed on demand; not cached.
    #[must_use]
    pub fn statistics_for(&self, vehicle_id: Option<i64>) -> StatisticsSnapshot {
        match vehicle_id {
            Some(_) => compute_statistics(&self.filter_by_vehicle(vehicle_id)),
            None => compute_statistics(&self.records),
        }
    }

    fn recompute(&mut self) {
        self.statistics = compute_statistics(&self.records);
    }
}
