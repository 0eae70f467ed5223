//! Stats command implementation.

use crate::cli::args::StatsArgs;
use crate::core::models::StatsPayload;
use crate::core::refresh::{lock, refresh_once, shared};
use crate::core::source::{FillSource, JsonFileSource};
use crate::core::statistics::estimate_consumption;
use crate::core::store::FillStore;
use crate::error::Result;
use crate::render;
use crate::storage::ResolvedConfig;

/// Execute the stats command.
///
/// # Errors
/// Returns an error if the fill data cannot be loaded or rendered.
pub async fn execute(args: &StatsArgs, config: &ResolvedConfig) -> Result<()> {
    let source = JsonFileSource::new(&config.fills_file);
    let payload = load_stats(&source, &config.fills_file.display().to_string(), args.data.vehicle).await?;

    let output = render::render_stats(&payload, config.format, config.pretty, config.no_color)?;
    print_output(&output);
    Ok(())
}

/// Load fills from `source` and compute the statistics payload.
///
/// # Errors
/// Returns the source error if the fetch fails.
pub async fn load_stats<S: FillSource>(
    source: &S,
    label: &str,
    vehicle_id: Option<i64>,
) -> Result<StatsPayload> {
    let store = shared(FillStore::new());
    let count = refresh_once(source, &store).await?;
    tracing::debug!(fills = count, ?vehicle_id, "computing statistics");

    let payload = stats_payload(&lock(&store), label, vehicle_id);
    Ok(payload)
}

/// Build the statistics payload for one vehicle, or for all of them.
#[must_use]
pub fn stats_payload(store: &FillStore, label: &str, vehicle_id: Option<i64>) -> StatsPayload {
    let (statistics, consumption_method) = match vehicle_id {
        Some(_) => {
            let records = store.filter_by_vehicle(vehicle_id);
            if records.is_empty() {
                tracing::debug!(?vehicle_id, "no fills for vehicle");
            }
            let method = estimate_consumption(&records).method;
            (store.statistics_for(vehicle_id), method)
        }
        None => (
            store.statistics().clone(),
            estimate_consumption(store.records()).method,
        ),
    };

    StatsPayload {
        vehicle_id,
        source: label.to_string(),
        statistics,
        consumption_method,
    }
}

pub(crate) fn print_output(output: &str) {
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}
