use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storelens_core::TransactionRecord;
use tokio::sync::Mutex;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::feed::{HttpFeed, RecordFeed};
use crate::fixture::{FixtureGenerator, FixtureSettings};

struct CacheState {
    cached: Option<Arc<[TransactionRecord]>>,
    remote_enabled: bool,
}

/// Supplies the record collection, remote first with a fixture fallback.
///
/// The first successful collection is cached and shared by every caller until
/// [`RecordSource::invalidate`]. A failed remote attempt disables the feed
/// until the next `invalidate`, so a dead backend is probed once, not on
/// every load.
pub struct RecordSource {
    feed: Option<Arc<dyn RecordFeed>>,
    fixture: FixtureGenerator,
    fetch_limit: usize,
    state: Mutex<CacheState>,
    degraded: AtomicBool,
}

impl RecordSource {
    pub fn new(
        feed: Option<Arc<dyn RecordFeed>>,
        fixture: FixtureSettings,
        fetch_limit: usize,
    ) -> Self {
        Self {
            feed,
            fixture: FixtureGenerator::new(fixture),
            fetch_limit,
            state: Mutex::new(CacheState {
                cached: None,
                remote_enabled: true,
            }),
            degraded: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        let feed = match config.api_url.as_deref() {
            Some(url) => {
                let timeout = Duration::from_secs(config.health_timeout_secs);
                Some(Arc::new(HttpFeed::new(url, timeout)?) as Arc<dyn RecordFeed>)
            }
            None => None,
        };
        Ok(Self::new(feed, config.fixture.clone(), config.fetch_limit))
    }

    /// The current collection. Never fails: any remote problem is logged and
    /// answered with fixture data.
    ///
    /// Concurrent callers wait on the same attempt and receive the same
    /// snapshot.
    pub async fn fetch_records(&self) -> Arc<[TransactionRecord]> {
        let mut state = self.state.lock().await;
        if let Some(cached) = &state.cached {
            return Arc::clone(cached);
        }

        if state.remote_enabled {
            if let Some(feed) = &self.feed {
                match self.fetch_remote(feed.as_ref()).await {
                    Ok(records) => {
                        tracing::info!(count = records.len(), "Loaded transactions from record feed");
                        let records: Arc<[TransactionRecord]> = records.into();
                        self.degraded.store(false, Ordering::Relaxed);
                        state.cached = Some(Arc::clone(&records));
                        return records;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Record feed unavailable, falling back to fixture data");
                        state.remote_enabled = false;
                    }
                }
            }
        }

        // Serving fixtures in place of a configured feed is degraded mode.
        self.degraded.store(self.feed.is_some(), Ordering::Relaxed);
        let records: Arc<[TransactionRecord]> = self.fixture.generate().into();
        tracing::info!(count = records.len(), "Using fixture transactions");
        state.cached = Some(Arc::clone(&records));
        records
    }

    async fn fetch_remote(&self, feed: &dyn RecordFeed) -> Result<Vec<TransactionRecord>, SourceError> {
        feed.check_health().await?;
        let records = feed.fetch_transactions(self.fetch_limit).await?;
        if records.is_empty() {
            return Err(SourceError::EmptyPayload);
        }
        Ok(records)
    }

    /// Drops the cached collection and re-enables the remote feed.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.cached = None;
        state.remote_enabled = true;
        self.degraded.store(false, Ordering::Relaxed);
        tracing::debug!("source: cache invalidated");
    }

    /// Drops the cached collection but leaves a disabled feed disabled.
    pub async fn reload(&self) {
        self.state.lock().await.cached = None;
        tracing::debug!("source: cache cleared for reload");
    }

    /// True while fixture data stands in for a configured feed.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }
}
