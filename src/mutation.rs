//! Optimistic status mutations: apply locally first, then resolve against
//! the gateway and roll back on failure.

use crate::gateway::DocumentService;
use crate::model::RequestStatus;
use crate::store::RequestStore;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};

/// How long an error notice stays visible.
pub const NOTICE_WINDOW_SECS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Auto-dismissing error notifications raised by failed mutations.
#[derive(Debug, Default)]
pub struct Notices {
    entries: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: String, now: DateTime<Utc>) {
        self.entries.push(Notice {
            message,
            raised_at: now,
        });
    }

    /// Drop notices older than the display window.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        let window = Duration::seconds(NOTICE_WINDOW_SECS);
        self.entries.retain(|n| now - n.raised_at < window);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The optimistic state became the confirmed state.
    Committed,
    /// The gateway call failed; the prior state was restored and a notice
    /// raised.
    RolledBack,
    /// The record is not in the store; nothing happened.
    UnknownId,
}

/// Change a request's status with optimistic local application.
///
/// The local transition happens before the gateway call resolves, so any
/// render between the two shows the target status. On gateway failure the
/// prior `(status, updated_at)` pair is restored exactly. Note: a second
/// mutation on the same record while one is in flight is not guarded
/// against; the rollback target is whatever state the first call captured.
#[instrument(skip(store, gateway, notices))]
pub async fn change_status(
    store: &mut RequestStore,
    gateway: &dyn DocumentService,
    notices: &mut Notices,
    id: &str,
    target: RequestStatus,
    now: DateTime<Utc>,
) -> MutationOutcome {
    let Some(prior) = store.apply_status(id, target, Some(now)) else {
        return MutationOutcome::UnknownId;
    };

    match gateway.update_status(id, target, now).await {
        Ok(outcome) => {
            info!(
                id,
                status = target.as_str(),
                matched = outcome.matched_count,
                modified = outcome.modified_count,
                "status update committed"
            );
            MutationOutcome::Committed
        }
        Err(err) => {
            let (prior_status, prior_updated) = prior;
            store.apply_status(id, prior_status, prior_updated);
            let short = &id[..id.len().min(8)];
            warn!(%err, id, "status update failed; rolled back");
            notices.push(format!("could not update request {short}"), now);
            MutationOutcome::RolledBack
        }
    }
}
