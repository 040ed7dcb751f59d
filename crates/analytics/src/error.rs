use storelens_core::{RecordError, YearMonth};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] RecordError),
    #[error("Cohort {cohort} starts after the data horizon {horizon}")]
    CohortAfterHorizon { cohort: YearMonth, horizon: YearMonth },
}
