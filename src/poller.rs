//! Poll scheduler: fixed-interval refresh that diffs newly arrived records
//! for the highlight animation and replaces the store's document set.

use crate::gateway::{DocumentService, GatewayError};
use crate::store::RequestStore;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, instrument, warn};

/// How long a newly-arrived record keeps its highlight marker. Always
/// shorter than the poll period, so a highlight never survives into the
/// next cycle.
pub const HIGHLIGHT_WINDOW_MS: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub total: usize,
    pub arrived: usize,
}

/// One fetch-and-reconcile pass. The fetched set fully replaces the
/// store's documents; ids unseen before this cycle are marked fresh until
/// `now` + the highlight window. An in-flight optimistic mutation that the
/// remote side has not recorded yet is overwritten here; that race is part
/// of the design.
#[instrument(skip(store, gateway))]
pub async fn poll_cycle(
    store: &mut RequestStore,
    gateway: &dyn DocumentService,
    now: DateTime<Utc>,
) -> Result<PollReport, GatewayError> {
    let fetched = gateway.fetch_requests().await?;

    let known: HashSet<String> = store.known_ids().into_iter().collect();
    let arrived: Vec<String> = fetched
        .iter()
        .filter(|r| !known.contains(&r.id))
        .map(|r| r.id.clone())
        .collect();

    store.expire_fresh(now);
    store.mark_fresh(
        arrived.iter().cloned(),
        now + Duration::milliseconds(HIGHLIGHT_WINDOW_MS),
    );

    let report = PollReport {
        total: fetched.len(),
        arrived: arrived.len(),
    };
    store.replace_all(fetched);
    store.set_last_refreshed(now);
    Ok(report)
}

/// Repeating poll loop with an explicit stop signal. A failed cycle logs a
/// warning and is skipped: existing data stays, no notice is raised, and
/// the loop keeps running. `on_cycle` runs after each successful cycle.
pub async fn run<F>(
    store: &mut RequestStore,
    gateway: &dyn DocumentService,
    period: std::time::Duration,
    mut shutdown: watch::Receiver<bool>,
    mut on_cycle: F,
) where
    F: FnMut(&RequestStore),
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Utc::now();
                match poll_cycle(store, gateway, now).await {
                    Ok(report) => {
                        info!(total = report.total, arrived = report.arrived, "poll cycle done");
                        on_cycle(store);
                    }
                    Err(err) => {
                        warn!(%err, "poll cycle failed; skipping");
                    }
                }
            }
            _ = shutdown.changed() => {
                info!("poll loop stopped");
                return;
            }
        }
    }
}
