//! Fill records, statistics and the in-memory store.

pub mod logging;
pub mod models;
pub mod refresh;
pub mod source;
pub mod statistics;
pub mod store;

pub use models::{
    FillPatch, FillsPayload, FuelFillRecord, MonthlyBucket, RobotMeta, RobotOutput,
    SCHEMA_VERSION, StatisticsSnapshot, StatsPayload,
};
pub use refresh::{RefreshHandle, RefreshStatus, RefreshTask, SharedFillStore, refresh_once};
pub use source::{FillSource, JsonFileSource, StaticSource};
pub use statistics::{ConsumptionEstimate, ConsumptionMethod, compute_statistics, estimate_consumption};
pub use store::FillStore;
