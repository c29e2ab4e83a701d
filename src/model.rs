use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an appointment request. `Pending` is the only state
/// that exposes operator actions; `Confirmed` and `Denied` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Confirmed,
    Denied,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Confirmed => "confirmed",
            RequestStatus::Denied => "denied",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "confirmed" => Some(RequestStatus::Confirmed),
            "denied" => Some(RequestStatus::Denied),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// One service-appointment request as stored in the remote collection.
/// Display fields are optional; the renderer substitutes placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub requested_date: Option<String>,
    #[serde(default)]
    pub requested_time: Option<String>,
    pub status: RequestStatus,
    #[serde(default)]
    pub original_message: Option<String>,
    #[serde(default)]
    pub source_channel_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Request {
    /// First 8 characters of the identifier, used anywhere the full id is
    /// too wide (table cells, error notices).
    pub fn short_id(&self) -> &str {
        let end = self.id.len().min(8);
        &self.id[..end]
    }
}

/// Per-status totals over the full document set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub denied: usize,
}

impl StatusCounts {
    pub fn tally<'a, I: IntoIterator<Item = &'a Request>>(requests: I) -> Self {
        let mut counts = StatusCounts::default();
        for r in requests {
            counts.total += 1;
            match r.status {
                RequestStatus::Pending => counts.pending += 1,
                RequestStatus::Confirmed => counts.confirmed += 1,
                RequestStatus::Denied => counts.denied += 1,
            }
        }
        counts
    }
}

/// Result of a single-document update as reported by the Data API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Whether the gateway talks to the remote Data API or to the in-memory
/// sample dataset. Carried to the renderer; local mode is always visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    Live,
    Local,
}

impl ConnectionMode {
    pub fn is_local(&self) -> bool {
        matches!(self, ConnectionMode::Local)
    }
}
