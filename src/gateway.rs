//! Remote Data Gateway: a thin client for the document store's HTTP Data
//! API, plus the in-memory sample backend used when the API is unreachable
//! or the config still carries placeholder credentials.

use crate::config::Config;
use crate::model::{ConnectionMode, Request, RequestStatus, UpdateOutcome};
use crate::sample;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Hard cap on documents per query, regardless of configuration.
pub const QUERY_LIMIT_CAP: u32 = 100;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("data api error {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid data api response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The two remote operations the dashboard consumes, plus a connectivity
/// probe and the generic-collection reads. Implemented by the live client
/// and by the sample backend so everything downstream is mode-agnostic.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Whether the backend is reachable. Never errors; any transport or
    /// auth failure is reported as `false`.
    async fn probe(&self) -> bool;

    async fn fetch_requests(&self) -> Result<Vec<Request>, GatewayError>;

    async fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, GatewayError>;

    async fn fetch_collection(&self, name: &str, limit: u32)
        -> Result<Vec<Value>, GatewayError>;

    async fn count(&self, name: &str) -> Result<u64, GatewayError>;
}

#[derive(Clone)]
pub struct DataApiClient {
    http: Client,
    base_url: String,
    api_key: String,
    data_source: String,
    database: String,
    collection: String,
    query_limit: u32,
}

impl fmt::Debug for DataApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataApiClient")
            .field("base_url", &self.base_url)
            .field("database", &self.database)
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl DataApiClient {
    pub fn from_config(cfg: &Config) -> Self {
        let http = Client::builder()
            .user_agent("atlas-desk/0.1")
            .no_proxy()
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url: cfg.api.data_api_url.trim_end_matches('/').to_string(),
            api_key: cfg.api.api_key.clone(),
            data_source: cfg.api.data_source.clone(),
            database: cfg.api.database.clone(),
            collection: cfg.api.collection.clone(),
            query_limit: cfg.api.query_limit.min(QUERY_LIMIT_CAP),
        }
    }

    pub fn build_request(
        &self,
        action: &str,
        body: &Value,
    ) -> Result<reqwest::Request, GatewayError> {
        let endpoint = format!("{}/action/{}", self.base_url, action);
        Ok(self
            .http
            .post(endpoint)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .build()?)
    }

    async fn execute(&self, action: &str, body: Value) -> Result<Value, GatewayError> {
        let request = self.build_request(action, &body)?;
        debug!(url = %request.url(), action, "sending data api request");
        let res = self.http.execute(request).await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status, body });
        }
        Ok(res.json::<Value>().await?)
    }

    fn scoped(&self, collection: &str) -> Value {
        json!({
            "dataSource": self.data_source,
            "database": self.database,
            "collection": collection,
        })
    }
}

/// Merge the data-source/database/collection envelope with an
/// action-specific payload into one request body.
fn merge(envelope: Value, extra: Value) -> Value {
    let mut body = envelope;
    if let (Some(dst), Some(src)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in src {
            dst.insert(k.clone(), v.clone());
        }
    }
    body
}

pub fn build_find_request(envelope: Value, limit: u32) -> Value {
    merge(
        envelope,
        json!({
            "filter": {},
            "sort": { "createdAt": -1 },
            "limit": limit.min(QUERY_LIMIT_CAP),
        }),
    )
}

pub fn build_update_request(
    envelope: Value,
    id: &str,
    status: RequestStatus,
    updated_at: DateTime<Utc>,
) -> Value {
    merge(
        envelope,
        json!({
            "filter": { "_id": { "$oid": id } },
            "update": {
                "$set": {
                    "status": status.as_str(),
                    "updatedAt": updated_at.to_rfc3339(),
                }
            }
        }),
    )
}

/// The Data API exposes counting through an aggregate pipeline rather than
/// a dedicated action.
pub fn build_count_request(envelope: Value) -> Value {
    merge(envelope, json!({ "pipeline": [ { "$count": "count" } ] }))
}

#[derive(Deserialize)]
struct FindResponse {
    documents: Vec<Value>,
}

#[async_trait]
impl DocumentService for DataApiClient {
    async fn probe(&self) -> bool {
        let body = merge(self.scoped(&self.collection), json!({ "filter": {}, "limit": 1 }));
        match self.execute("find", body).await {
            Ok(_) => true,
            Err(err) => {
                warn!(%err, "connectivity probe failed");
                false
            }
        }
    }

    async fn fetch_requests(&self) -> Result<Vec<Request>, GatewayError> {
        let body = build_find_request(self.scoped(&self.collection), self.query_limit);
        let payload = self.execute("find", body).await?;
        let found: FindResponse = serde_json::from_value(payload)?;
        let mut requests = Vec::with_capacity(found.documents.len());
        for doc in found.documents {
            requests.push(serde_json::from_value(doc)?);
        }
        Ok(requests)
    }

    async fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, GatewayError> {
        let body =
            build_update_request(self.scoped(&self.collection), id, status, updated_at);
        let payload = self.execute("updateOne", body).await?;
        Ok(serde_json::from_value(payload)?)
    }

    async fn fetch_collection(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<Value>, GatewayError> {
        let body = merge(
            self.scoped(name),
            json!({ "filter": {}, "limit": limit.min(QUERY_LIMIT_CAP) }),
        );
        let payload = self.execute("find", body).await?;
        let found: FindResponse = serde_json::from_value(payload)?;
        Ok(found.documents)
    }

    async fn count(&self, name: &str) -> Result<u64, GatewayError> {
        let body = build_count_request(self.scoped(name));
        let payload = self.execute("aggregate", body).await?;
        // An empty collection produces no documents at all from $count.
        let count = payload
            .get("documents")
            .and_then(|d| d.get(0))
            .and_then(|d| d.get("count"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Ok(count)
    }
}

/// In-memory backend over the fixed sample dataset. Reads serve the
/// dataset; writes mutate it in place so the rest of the system behaves
/// exactly as it does against the live API.
pub struct SampleBackend {
    requests: Mutex<Vec<Request>>,
}

impl SampleBackend {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(sample::sample_requests()),
        }
    }
}

impl Default for SampleBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentService for SampleBackend {
    async fn probe(&self) -> bool {
        true
    }

    async fn fetch_requests(&self) -> Result<Vec<Request>, GatewayError> {
        Ok(self.requests.lock().await.clone())
    }

    async fn update_status(
        &self,
        id: &str,
        status: RequestStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, GatewayError> {
        let mut docs = self.requests.lock().await;
        match docs.iter_mut().find(|r| r.id == id) {
            Some(doc) => {
                doc.status = status;
                doc.updated_at = Some(updated_at);
                Ok(UpdateOutcome {
                    matched_count: 1,
                    modified_count: 1,
                })
            }
            None => Ok(UpdateOutcome {
                matched_count: 0,
                modified_count: 0,
            }),
        }
    }

    async fn fetch_collection(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<Value>, GatewayError> {
        let mut docs = sample::sample_collection(name);
        docs.truncate(limit.min(QUERY_LIMIT_CAP) as usize);
        Ok(docs)
    }

    async fn count(&self, name: &str) -> Result<u64, GatewayError> {
        Ok(sample::sample_collection(name).len() as u64)
    }
}

/// Pick the backend for this session: placeholder credentials or a failed
/// probe select the sample backend, and the mode is reported so the
/// renderer can show the local banner. It is never silent.
pub async fn connect(cfg: &Config) -> (Box<dyn DocumentService>, ConnectionMode) {
    if cfg.has_placeholder_credentials() {
        info!("placeholder credentials; using local sample dataset");
        return (Box::new(SampleBackend::new()), ConnectionMode::Local);
    }
    let client = DataApiClient::from_config(cfg);
    if client.probe().await {
        info!(database = %cfg.api.database, "connected to data api");
        (Box::new(client), ConnectionMode::Live)
    } else {
        warn!("data api unreachable; using local sample dataset");
        (Box::new(SampleBackend::new()), ConnectionMode::Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn envelope() -> Value {
        json!({
            "dataSource": "Cluster0",
            "database": "skillbuilder",
            "collection": "requests",
        })
    }

    #[test]
    fn find_request_sorts_newest_first_and_caps_limit() {
        let body = build_find_request(envelope(), 500);
        assert_eq!(body["dataSource"], "Cluster0");
        assert_eq!(body["collection"], "requests");
        assert_eq!(body["sort"]["createdAt"], -1);
        assert_eq!(body["limit"], 100);
        assert!(body["filter"].as_object().unwrap().is_empty());
    }

    #[test]
    fn update_request_sets_status_and_timestamp() {
        let when = Utc.with_ymd_and_hms(2025, 2, 11, 10, 0, 0).unwrap();
        let body = build_update_request(envelope(), "65ab01cd", RequestStatus::Confirmed, when);
        assert_eq!(body["filter"]["_id"]["$oid"], "65ab01cd");
        assert_eq!(body["update"]["$set"]["status"], "confirmed");
        assert_eq!(body["update"]["$set"]["updatedAt"], when.to_rfc3339());
    }

    #[test]
    fn count_request_uses_count_pipeline() {
        let body = build_count_request(envelope());
        assert_eq!(body["pipeline"][0]["$count"], "count");
        assert_eq!(body["database"], "skillbuilder");
    }

    #[test]
    fn build_request_sets_headers() {
        let cfg: Config = serde_yaml::from_str(crate::config::example()).unwrap();
        let client = DataApiClient::from_config(&cfg);
        let body = json!({ "sample": true });
        let request = client.build_request("find", &body).unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert!(request.url().path().ends_with("/action/find"));
        let headers = request.headers();
        assert_eq!(
            headers.get("api-key").and_then(|h| h.to_str().ok()).unwrap(),
            "YOUR_DATA_API_KEY"
        );
        assert_eq!(
            headers
                .get("Content-Type")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn sample_backend_reads_and_echoes_writes() {
        let backend = SampleBackend::new();
        assert!(backend.probe().await);

        let before = backend.fetch_requests().await.unwrap();
        let pending = before
            .iter()
            .find(|r| r.status == RequestStatus::Pending)
            .unwrap()
            .clone();

        let when = Utc.with_ymd_and_hms(2025, 2, 11, 9, 0, 0).unwrap();
        let outcome = backend
            .update_status(&pending.id, RequestStatus::Confirmed, when)
            .await
            .unwrap();
        assert_eq!(outcome.matched_count, 1);
        assert_eq!(outcome.modified_count, 1);

        let after = backend.fetch_requests().await.unwrap();
        let doc = after.iter().find(|r| r.id == pending.id).unwrap();
        assert_eq!(doc.status, RequestStatus::Confirmed);
        assert_eq!(doc.updated_at, Some(when));
    }

    #[tokio::test]
    async fn sample_backend_reports_unknown_ids() {
        let backend = SampleBackend::new();
        let when = Utc.with_ymd_and_hms(2025, 2, 11, 9, 0, 0).unwrap();
        let outcome = backend
            .update_status("missing", RequestStatus::Denied, when)
            .await
            .unwrap();
        assert_eq!(outcome.matched_count, 0);
        assert_eq!(outcome.modified_count, 0);
    }

    #[tokio::test]
    async fn sample_backend_serves_collections_with_counts() {
        let backend = SampleBackend::new();
        let docs = backend.fetch_collection("tasks", 100).await.unwrap();
        assert_eq!(backend.count("tasks").await.unwrap(), docs.len() as u64);
        let capped = backend.fetch_collection("tasks", 1).await.unwrap();
        assert_eq!(capped.len(), 1);
    }
}
