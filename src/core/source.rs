//! Fill data sources.
//!
//! The statistics core never talks to storage directly. A [`FillSource`]
//! loads the full collection and the caller hands it to
//! [`FillStore::replace_all`](crate::core::store::FillStore::replace_all).
//! A failed fetch leaves the store at its last known value.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::core::models::FuelFillRecord;
use crate::error::{FuelError, Result};

/// Loads the complete fill collection.
pub trait FillSource: Send + Sync {
    /// Fetch every fill record visible to the current user.
    fn fetch_all_fills(&self) -> impl Future<Output = Result<Vec<FuelFillRecord>>> + Send;
}

// =============================================================================
// JSON file source
// =============================================================================

/// Reads fills from a JSON file.
///
/// Accepts either a bare array of records or an object with a `fills` array.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path this source reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FillSource for JsonFileSource {
    async fn fetch_all_fills(&self) -> Result<Vec<FuelFillRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FuelError::SourceNotFound {
                    path: self.path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let records = parse_fills(&content).map_err(|e| FuelError::SourceParse {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(path = %self.path.display(), fills = records.len(), "loaded fill file");
        Ok(records)
    }
}

/// Decode a fill file body.
///
/// # Errors
/// Returns the underlying JSON error if the body is not valid JSON, is neither
/// an array nor an object with a `fills` array, or contains an invalid record.
pub fn parse_fills(content: &str) -> std::result::Result<Vec<FuelFillRecord>, serde_json::Error> {
    let value: Value = serde_json::from_str(content)?;
    match value {
        Value::Object(mut map) if map.contains_key("fills") => {
            serde_json::from_value(map.remove("fills").unwrap_or(Value::Null))
        }
        other => serde_json::from_value(other),
    }
}

// =============================================================================
// Static source
// =============================================================================

/// In-memory source whose contents can be swapped at runtime.
///
/// Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    inner: Arc<Mutex<StaticState>>,
}

#[derive(Debug, Default)]
struct StaticState {
    fills: Vec<FuelFillRecord>,
    failure: Option<String>,
    fetches: u64,
}

impl StaticSource {
    /// Create a source serving `fills`.
    #[must_use]
    pub fn new(fills: Vec<FuelFillRecord>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StaticState {
                fills,
                failure: None,
                fetches: 0,
            })),
        }
    }

    /// Replace the served collection.
    pub fn set(&self, fills: Vec<FuelFillRecord>) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).fills = fills;
    }

    /// Make subsequent fetches fail with `reason`, or succeed again with `None`.
    pub fn set_failure(&self, reason: Option<&str>) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).failure =
            reason.map(str::to_string);
    }

    /// Number of fetches served so far, failed ones included.
    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).fetches
    }
}

impl FillSource for StaticSource {
    async fn fetch_all_fills(&self) -> Result<Vec<FuelFillRecord>> {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.fetches += 1;
        match &state.failure {
            Some(reason) => Err(FuelError::FetchFailed {
                reason: reason.clone(),
            }),
            None => Ok(state.fills.clone()),
        }
    }
}
