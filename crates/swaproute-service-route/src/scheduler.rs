//! Periodic graph refresh.
//!
//! Refreshes run on the blocking pool because providers do network or disk
//! IO synchronously. A failed refresh is logged and counted; the previous
//! snapshot keeps serving queries until the next tick.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use swaproute_lib::{Error, RefreshOutcome, Result};
use swaproute_service_shared::{AppState, RefreshResult, record_refresh, record_snapshot};

/// Default interval between refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Run one refresh against `state` and record its metrics.
///
/// Blocks the calling thread.
pub fn refresh_once(state: &AppState) -> Result<RefreshOutcome> {
    let started = Instant::now();
    let result = state.refresher().refresh_now();
    let elapsed = started.elapsed();

    match &result {
        Ok(outcome) => {
            record_refresh(RefreshResult::Success, elapsed);
            record_snapshot(outcome.version, outcome.tokens, outcome.edges);
        }
        Err(Error::Build(e)) => {
            record_refresh(RefreshResult::BuildError, elapsed);
            warn!(error = %e, "refresh rejected by graph validation");
        }
        Err(e) => {
            record_refresh(RefreshResult::FetchError, elapsed);
            warn!(error = %e, "refresh failed");
        }
    }
    result
}

/// Spawn a task that refreshes immediately and then every `interval`.
///
/// Ticks missed while a slow refresh is running are delayed, not replayed.
pub fn spawn_refresh_loop(state: AppState, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = interval.as_secs(), "refresh loop started");

        loop {
            ticker.tick().await;
            let task_state = state.clone();
            if let Err(e) = tokio::task::spawn_blocking(move || refresh_once(&task_state)).await {
                error!(error = %e, "refresh task panicked");
            }
        }
    })
}
