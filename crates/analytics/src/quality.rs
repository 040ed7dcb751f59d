use serde::Serialize;
use std::collections::BTreeMap;
use storelens_core::{RecordField, TransactionRecord};

use crate::error::AnalyticsError;

/// Diagnostics over a record collection: how many rows are complete and
/// which attributes are missing how often.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub total: usize,
    pub complete: usize,
    pub missing: BTreeMap<RecordField, usize>,
}

impl QualityReport {
    pub fn incomplete(&self) -> usize {
        self.total - self.complete
    }
}

pub fn audit(records: &[TransactionRecord]) -> QualityReport {
    let mut report = QualityReport {
        total: records.len(),
        ..Default::default()
    };
    for r in records {
        let missing = r.missing_fields();
        if missing.is_empty() {
            report.complete += 1;
        }
        for field in missing {
            *report.missing.entry(field).or_insert(0) += 1;
        }
    }
    if report.incomplete() > 0 {
        tracing::debug!(
            incomplete = report.incomplete(),
            total = report.total,
            "records with missing attributes"
        );
    }
    report
}

/// Rejects the collection on the first record that breaks a value invariant.
pub fn check_invariants(records: &[TransactionRecord]) -> Result<(), AnalyticsError> {
    for (index, r) in records.iter().enumerate() {
        r.validate(index)?;
    }
    Ok(())
}
