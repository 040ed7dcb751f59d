use serde::{Deserialize, Serialize};

use crate::fixture::FixtureSettings;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Where records come from. Without `api_url` only fixture data is served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub api_url: Option<String>,
    pub health_timeout_secs: u64,
    pub fetch_limit: usize,
    pub fixture: FixtureSettings,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: Some(DEFAULT_API_URL.to_string()),
            health_timeout_secs: 3,
            fetch_limit: 10_000,
            fixture: FixtureSettings::default(),
        }
    }
}
