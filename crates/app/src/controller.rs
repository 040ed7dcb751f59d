use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use storelens_analytics::{assemble, AnalyticsError, FilterCriteria, Page, PageView, Version, ViewOptions};
use storelens_source::RecordSource;
use tokio::sync::RwLock;

/// Drives page loads: awaits the record source, filters, assembles.
///
/// Every load and every filter change advances a generation; a load that
/// finishes after either has happened yields `None` instead of a view.
pub struct PageController {
    source: Arc<RecordSource>,
    options: ViewOptions,
    criteria: RwLock<FilterCriteria>,
    generation: AtomicU64,
}

impl PageController {
    pub fn new(source: Arc<RecordSource>, options: ViewOptions) -> Self {
        Self {
            source,
            options,
            criteria: RwLock::new(FilterCriteria::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &RecordSource {
        &self.source
    }

    pub async fn criteria(&self) -> FilterCriteria {
        self.criteria.read().await.clone()
    }

    pub async fn set_criteria(&self, criteria: FilterCriteria) {
        self.update_criteria(|c| *c = criteria).await;
    }

    /// Pending loads built from the previous filters are superseded.
    pub async fn update_criteria(&self, update: impl FnOnce(&mut FilterCriteria)) {
        let mut criteria = self.criteria.write().await;
        update(&mut *criteria);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn clear_filters(&self) {
        self.update_criteria(FilterCriteria::clear).await;
    }

    /// Forces the next load to go back to the record feed.
    pub async fn refresh(&self) {
        self.source.invalidate().await;
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Builds `page` in `version` from the filters active when the call was
    /// made. `Ok(None)` means a newer load or a filter change superseded this
    /// one.
    pub async fn load(&self, page: Page, version: Version) -> Result<Option<PageView>, AnalyticsError> {
        // Ticket and snapshot under one read lock.
        let (ticket, criteria) = {
            let criteria = self.criteria.read().await;
            (self.generation.fetch_add(1, Ordering::SeqCst) + 1, criteria.clone())
        };
        let records = self.source.fetch_records().await;

        if !self.is_current(ticket) {
            tracing::debug!(%page, %version, ticket, "Discarding superseded page load");
            return Ok(None);
        }

        let view = assemble(page, version, &records, &criteria, &self.options)?;
        if !self.is_current(ticket) {
            tracing::debug!(%page, %version, ticket, "Discarding superseded page load");
            return Ok(None);
        }

        tracing::info!(
            %page,
            %version,
            records = view.record_count,
            filtered = criteria.has_active_filters(),
            "Page loaded"
        );
        Ok(Some(view))
    }
}
