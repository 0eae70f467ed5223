//! Fills command implementation.

use std::cmp::Reverse;

use crate::cli::args::FillsArgs;
use crate::cli::stats::print_output;
use crate::core::models::FillsPayload;
use crate::core::source::{FillSource, JsonFileSource};
use crate::core::store::FillStore;
use crate::error::Result;
use crate::render;
use crate::storage::ResolvedConfig;

/// Execute the fills command.
///
/// # Errors
/// Returns an error if the fill data cannot be loaded or rendered.
pub async fn execute(args: &FillsArgs, config: &ResolvedConfig) -> Result<()> {
    let source = JsonFileSource::new(&config.fills_file);
    let store = FillStore::with_records(source.fetch_all_fills().await?);
    let payload = fills_payload(
        &store,
        &config.fills_file.display().to_string(),
        args.data.vehicle,
        args.limit,
    );

    let output = render::render_fills(&payload, config.format, config.pretty, config.no_color)?;
    print_output(&output);
    Ok(())
}

/// Matching fills, newest first, truncated to `limit`.
#[must_use]
pub fn fills_payload(
    store: &FillStore,
    label: &str,
    vehicle_id: Option<i64>,
    limit: Option<usize>,
) -> FillsPayload {
    let mut fills = store.filter_by_vehicle(vehicle_id);
    fills.sort_by_key(|r| (Reverse(r.date), Reverse(r.id)));
    let total = fills.len();
    if let Some(limit) = limit {
        fills.truncate(limit);
    }

    FillsPayload {
        vehicle_id,
        source: label.to_string(),
        total,
        fills,
    }
}
