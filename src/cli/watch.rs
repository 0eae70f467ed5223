//! Watch command: keep the statistics fresh until interrupted.
//!
//! The store is loaded once up front (a failure there is fatal), then a
//! [`RefreshTask`] reloads it every interval and each completed tick redraws
//! the output. Refresh failures are shown but keep the last known fills.

use crate::cli::args::{OutputFormat, WatchArgs};
use crate::cli::stats::{print_output, stats_payload};
use crate::core::models::RobotOutput;
use crate::core::refresh::{RefreshStatus, RefreshTask, SharedFillStore, lock, refresh_once, shared};
use crate::core::source::JsonFileSource;
use crate::core::store::FillStore;
use crate::error::Result;
use crate::render::{human, robot};
use crate::storage::ResolvedConfig;
use crate::util::env::stdout_is_tty;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Run watch mode.
///
/// # Errors
/// Returns an error if the arguments are invalid, the initial load fails, or
/// a frame cannot be rendered.
pub async fn execute(args: &WatchArgs, config: &ResolvedConfig) -> Result<()> {
    args.validate()?;

    let label = config.fills_file.display().to_string();
    let source = JsonFileSource::new(&config.fills_file);
    let store = shared(FillStore::new());
    refresh_once(&source, &store).await?;

    let handle = RefreshTask::new(source, SharedFillStore::clone(&store), config.refresh_interval)
        .skip_initial_load()
        .spawn();
    let mut updates = handle.subscribe();
    tracing::info!(interval = ?config.refresh_interval, file = %label, "watching fill data");

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(());
    });

    let vehicle = args.data.vehicle;
    draw(&render_frame(&store, &label, vehicle, &RefreshStatus::default(), config)?, config);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = updates.borrow_and_update().clone();
                draw(&render_frame(&store, &label, vehicle, &status, config)?, config);
            }
            _ = &mut shutdown_rx => break,
        }
    }

    tracing::debug!(refreshes = handle.refresh_count(), "stopping watch");
    handle.shutdown().await;
    Ok(())
}

/// Render one frame from the current store contents.
///
/// # Errors
/// Returns a serialization error in JSON mode.
pub fn render_frame(
    store: &SharedFillStore,
    label: &str,
    vehicle_id: Option<i64>,
    status: &RefreshStatus,
    config: &ResolvedConfig,
) -> Result<String> {
    let payload = stats_payload(&lock(store), label, vehicle_id);

    match config.format {
        OutputFormat::Human => human::render_watch_frame(&payload, status, config.no_color),
        OutputFormat::Json => {
            let output = RobotOutput::new("watch", payload)
                .for_vehicle(vehicle_id)
                .with_errors(status.last_error.iter().cloned().collect());
            // One object per line so consumers can stream frames.
            robot::render_json(&output, false)
        }
        OutputFormat::Md => robot::render_stats_md(&payload),
    }
}

fn draw(frame: &str, config: &ResolvedConfig) {
    if config.format == OutputFormat::Human && stdout_is_tty() {
        print!("{CLEAR_SCREEN}");
    }
    print_output(frame);
}
