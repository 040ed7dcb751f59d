use async_trait::async_trait;
use std::time::Duration;
use storelens_core::TransactionRecord;

use crate::error::SourceError;

/// Abstraction over the remote transaction feed.
#[async_trait]
pub trait RecordFeed: Send + Sync {
    /// Succeeds only when the feed reports itself ready.
    async fn check_health(&self) -> Result<(), SourceError>;

    async fn fetch_transactions(&self, limit: usize) -> Result<Vec<TransactionRecord>, SourceError>;
}

// ── HTTP feed ─────────────────────────────────────────────────────────────────

/// Reads `{base}/api/health` and `{base}/api/transactions` over HTTP.
#[derive(Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
}

impl HttpFeed {
    pub fn new(base_url: &str, health_timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, SourceError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        request.send().await.map_err(|e| SourceError::Unreachable {
            url: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl RecordFeed for HttpFeed {
    async fn check_health(&self) -> Result<(), SourceError> {
        let url = self.api_url("health");
        let resp = self.get(&url, Some(self.health_timeout)).await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SourceError::Unhealthy {
                status: status.as_u16(),
            })
        }
    }

    async fn fetch_transactions(&self, limit: usize) -> Result<Vec<TransactionRecord>, SourceError> {
        let url = self.api_url(&format!("transactions?limit={limit}"));
        let resp = self.get(&url, None).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let records: Vec<TransactionRecord> = resp.json().await?;
        tracing::debug!(count = records.len(), "feed: transactions decoded");
        Ok(records)
    }
}
