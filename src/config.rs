//! Configuration loader and validator for the dashboard.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Placeholder values shipped in the example config. Either one present in
/// a loaded config selects local-fallback mode instead of the live API.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_DATA_API_KEY";
pub const PLACEHOLDER_APP_ID: &str = "YOUR_APP_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub api: Api,
    #[serde(default)]
    pub collections: Vec<CollectionSpec>,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub output_dir: String,
    pub poll_interval_secs: u64,
    pub page_size: usize,
}

/// Data API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Api {
    pub data_api_url: String,
    pub api_key: String,
    pub data_source: String,
    pub database: String,
    pub collection: String,
    pub query_limit: u32,
}

/// A secondary collection exposed by the generic-document browser. The
/// field list orders columns; it is presentation metadata, not a schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionSpec {
    pub name: String,
    pub fields: Vec<String>,
}

impl Config {
    /// Ensure required directories exist (creates `app.output_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.output_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.output_dir)
    }

    /// True when the config still carries the example credentials; the
    /// gateway then serves the sample dataset instead of probing.
    pub fn has_placeholder_credentials(&self) -> bool {
        self.api.api_key == PLACEHOLDER_API_KEY
            || self.api.data_api_url.contains(PLACEHOLDER_APP_ID)
    }

    pub fn collection_spec(&self, name: &str) -> Option<&CollectionSpec> {
        self.collections.iter().find(|c| c.name == name)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.output_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.output_dir must be non-empty"));
    }
    if cfg.app.poll_interval_secs == 0 {
        return Err(ConfigError::Invalid("app.poll_interval_secs must be > 0"));
    }
    if cfg.app.page_size == 0 {
        return Err(ConfigError::Invalid("app.page_size must be > 0"));
    }

    if cfg.api.data_api_url.trim().is_empty() {
        return Err(ConfigError::Invalid("api.data_api_url must be non-empty"));
    }
    if cfg.api.api_key.trim().is_empty() {
        return Err(ConfigError::Invalid("api.api_key must be non-empty"));
    }
    if cfg.api.data_source.trim().is_empty() {
        return Err(ConfigError::Invalid("api.data_source must be non-empty"));
    }
    if cfg.api.database.trim().is_empty() {
        return Err(ConfigError::Invalid("api.database must be non-empty"));
    }
    if cfg.api.collection.trim().is_empty() {
        return Err(ConfigError::Invalid("api.collection must be non-empty"));
    }
    if cfg.api.query_limit == 0 || cfg.api.query_limit > 100 {
        return Err(ConfigError::Invalid("api.query_limit must be in 1..=100"));
    }

    for coll in &cfg.collections {
        if coll.name.trim().is_empty() {
            return Err(ConfigError::Invalid("collections[].name must be non-empty"));
        }
        if coll.fields.is_empty() {
            return Err(ConfigError::Invalid(
                "collections[].fields must list at least one field",
            ));
        }
    }

    Ok(())
}

/// Canonical example config shipped with the crate.
pub fn example() -> &'static str {
    r#"app:
  output_dir: "./site"
  poll_interval_secs: 30
  page_size: 20

api:
  data_api_url: "https://data.mongodb-api.com/app/YOUR_APP_ID/endpoint/data/v1"
  api_key: "YOUR_DATA_API_KEY"
  data_source: "Cluster0"
  database: "skillbuilder"
  collection: "requests"
  query_limit: 100

collections:
  - name: mentors
    fields: [name, email, skills]
  - name: projects
    fields: [title, owner, status]
  - name: tasks
    fields: [title, assignee, done]
  - name: users
    fields: [username, email, role]
  - name: resources
    fields: [title, url, kind]
"#
}
