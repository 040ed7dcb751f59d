//! Cohort retention.
//!
//! A buyer's cohort is the month of their first purchase anywhere in the
//! full history, so it never moves when filters change. The filtered
//! records decide who is a member (buyers with at least one matching
//! record) and which months count as active.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use storelens_core::{whole_percent, TransactionRecord, YearMonth};

use crate::error::AnalyticsError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortRow {
    pub cohort_month: YearMonth,
    pub cohort_size: usize,
    /// Month index (0 = cohort month) to integer retention percentage.
    /// Indices past the data horizon are absent.
    pub retention_by_month: BTreeMap<u32, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerMix {
    pub month: YearMonth,
    pub new_buyers: usize,
    pub returning_buyers: usize,
}

/// Month of each buyer's earliest dated record.
pub fn first_purchase_months(history: &[TransactionRecord]) -> HashMap<&str, YearMonth> {
    let mut first: HashMap<&str, YearMonth> = HashMap::new();
    for r in history {
        let (Some(buyer), Some(date)) = (r.buyer_id.as_deref(), r.date) else {
            continue;
        };
        let month = YearMonth::of(date);
        first
            .entry(buyer)
            .and_modify(|m| *m = (*m).min(month))
            .or_insert(month);
    }
    first
}

/// Months in which each buyer has at least one dated record.
fn active_months(records: &[TransactionRecord]) -> HashMap<&str, BTreeSet<YearMonth>> {
    let mut active: HashMap<&str, BTreeSet<YearMonth>> = HashMap::new();
    let mut skipped = 0usize;
    for r in records {
        let (Some(buyer), Some(date)) = (r.buyer_id.as_deref(), r.date) else {
            skipped += 1;
            continue;
        };
        active.entry(buyer).or_default().insert(YearMonth::of(date));
    }
    if skipped > 0 {
        tracing::debug!(skipped, "cohort: records without buyer or date");
    }
    active
}

/// Retention matrix, one row per cohort month in ascending order.
///
/// `horizon` is the last month with data; it defaults to the latest month in
/// `history`. A cohort starting after the horizon is rejected.
pub fn cohort_retention(
    history: &[TransactionRecord],
    filtered: &[TransactionRecord],
    horizon: Option<YearMonth>,
) -> Result<Vec<CohortRow>, AnalyticsError> {
    let first = first_purchase_months(history);
    let latest = history.iter().filter_map(|r| r.date).max().map(YearMonth::of);
    let Some(horizon) = horizon.or(latest) else {
        return Ok(Vec::new());
    };

    let active = active_months(filtered);
    let mut cohorts: BTreeMap<YearMonth, Vec<&BTreeSet<YearMonth>>> = BTreeMap::new();
    for (buyer, months) in &active {
        match first.get(buyer) {
            Some(cohort) => cohorts.entry(*cohort).or_default().push(months),
            None => tracing::debug!(buyer, "cohort: buyer missing from history"),
        }
    }

    let mut rows = Vec::with_capacity(cohorts.len());
    for (cohort, members) in cohorts {
        let span = horizon.months_since(cohort);
        if span < 0 {
            return Err(AnalyticsError::CohortAfterHorizon { cohort, horizon });
        }
        let size = members.len();
        let retention_by_month = (0..=span as u32)
            .map(|i| {
                let month = cohort.plus(i);
                let retained = members.iter().filter(|m| m.contains(&month)).count();
                (i, whole_percent(retained, size))
            })
            .collect();
        rows.push(CohortRow {
            cohort_month: cohort,
            cohort_size: size,
            retention_by_month,
        });
    }
    Ok(rows)
}

/// Active buyers per month split into first-time and returning buyers,
/// judged against the full history.
pub fn new_vs_returning(history: &[TransactionRecord], filtered: &[TransactionRecord]) -> Vec<BuyerMix> {
    let first = first_purchase_months(history);
    let mut by_month: BTreeMap<YearMonth, BTreeSet<&str>> = BTreeMap::new();
    for r in filtered {
        if let (Some(buyer), Some(date)) = (r.buyer_id.as_deref(), r.date) {
            by_month.entry(YearMonth::of(date)).or_default().insert(buyer);
        }
    }

    by_month
        .into_iter()
        .map(|(month, buyers)| {
            let new_buyers = buyers
                .iter()
                .filter(|b| first.get(*b).map_or(true, |m| *m == month))
                .count();
            BuyerMix {
                month,
                new_buyers,
                returning_buyers: buyers.len() - new_buyers,
            }
        })
        .collect()
}
