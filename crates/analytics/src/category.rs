use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use storelens_core::{percent, DateRange, Granularity, Money, TransactionRecord};

use crate::trend::resolve_span;

/// Window length used for growth when no date range is active.
pub const DEFAULT_GROWTH_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: String,
    pub gmv: Money,
    pub order_count: usize,
    /// Share of total gmv, in percent.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGrowth {
    pub category: String,
    pub current_gmv: Money,
    pub previous_gmv: Money,
    pub growth_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAov {
    pub category: String,
    pub aov: Money,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTrendPoint {
    pub date: NaiveDate,
    pub values: BTreeMap<String, Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTrends {
    pub granularity: Granularity,
    pub categories: Vec<String>,
    pub points: Vec<CategoryTrendPoint>,
}

/// Gmv and order count per category, skipping rows without category or amount.
fn totals_by_category(records: &[TransactionRecord]) -> BTreeMap<&str, (Money, usize)> {
    let mut totals: BTreeMap<&str, (Money, usize)> = BTreeMap::new();
    let mut skipped = 0usize;
    for r in records {
        let (Some(category), Some(amount)) = (r.category.as_deref(), r.amount) else {
            skipped += 1;
            continue;
        };
        let slot = totals.entry(category).or_insert((Money::zero(), 0));
        slot.0 += amount;
        slot.1 += 1;
    }
    if skipped > 0 {
        tracing::debug!(skipped, "category: records without category or amount");
    }
    totals
}

/// Gmv by category, largest first.
pub fn category_breakdown(records: &[TransactionRecord]) -> Vec<CategoryShare> {
    let totals = totals_by_category(records);
    let total_gmv: Money = totals.values().map(|(gmv, _)| *gmv).sum();

    let mut shares: Vec<CategoryShare> = totals
        .into_iter()
        .map(|(category, (gmv, order_count))| CategoryShare {
            category: category.to_string(),
            gmv,
            order_count,
            percentage: percent(gmv.amount(), total_gmv.amount()),
        })
        .collect();
    // BTreeMap order already breaks ties by name; sort_by is stable.
    shares.sort_by(|a, b| b.gmv.cmp(&a.gmv));
    shares
}

/// The period growth is measured over: the active range, or the trailing
/// window ending at the latest record.
pub fn growth_window(
    records: &[TransactionRecord],
    range: Option<DateRange>,
    window_days: u32,
) -> Option<DateRange> {
    range.or_else(|| {
        records
            .iter()
            .filter_map(|r| r.date)
            .max()
            .map(|latest| DateRange::trailing(latest, window_days))
    })
}

/// Period-over-period growth per category, fastest growing first.
///
/// `records` must not be restricted to `current` already: the preceding
/// window is read from the same collection.
pub fn category_growth(records: &[TransactionRecord], current: DateRange) -> Vec<CategoryGrowth> {
    let previous = current.preceding();
    let mut sums: BTreeMap<&str, (Money, Money)> = BTreeMap::new();

    for r in records {
        let (Some(date), Some(category), Some(amount)) = (r.date, r.category.as_deref(), r.amount)
        else {
            continue;
        };
        if current.contains(date) {
            sums.entry(category).or_default().0 += amount;
        } else if previous.is_some_and(|p| p.contains(date)) {
            sums.entry(category).or_default().1 += amount;
        }
    }

    let mut growth: Vec<CategoryGrowth> = sums
        .into_iter()
        .filter(|(_, (_, prev))| !prev.is_zero())
        .map(|(category, (cur, prev))| CategoryGrowth {
            category: category.to_string(),
            current_gmv: cur,
            previous_gmv: prev,
            growth_rate: percent((cur - prev).amount(), prev.amount()),
        })
        .collect();
    growth.sort_by(|a, b| b.growth_rate.cmp(&a.growth_rate));
    growth
}

/// Average order value per category, highest first.
pub fn category_aov(records: &[TransactionRecord]) -> Vec<CategoryAov> {
    let mut ranking: Vec<CategoryAov> = totals_by_category(records)
        .into_iter()
        .map(|(category, (gmv, order_count))| CategoryAov {
            category: category.to_string(),
            aov: gmv.per(order_count as u64),
            order_count,
        })
        .collect();
    ranking.sort_by(|a, b| b.aov.cmp(&a.aov));
    ranking
}

/// Gmv per bucket split by category, every category present in every bucket.
pub fn category_trends(records: &[TransactionRecord], range: Option<DateRange>) -> CategoryTrends {
    let Some(span) = resolve_span(records, range) else {
        return CategoryTrends {
            granularity: Granularity::Day,
            categories: Vec::new(),
            points: Vec::new(),
        };
    };
    let granularity = Granularity::for_span(span);

    let categories: BTreeSet<&str> = records
        .iter()
        .filter(|r| r.date.is_some_and(|d| span.contains(d)) && r.amount.is_some())
        .filter_map(|r| r.category.as_deref())
        .collect();
    let zeroed: BTreeMap<String, Money> = categories
        .iter()
        .map(|c| (c.to_string(), Money::zero()))
        .collect();

    let mut buckets: BTreeMap<NaiveDate, BTreeMap<String, Money>> = granularity
        .buckets(span)
        .into_iter()
        .map(|d| (d, zeroed.clone()))
        .collect();

    for r in records {
        let (Some(date), Some(category), Some(amount)) = (r.date, r.category.as_deref(), r.amount)
        else {
            continue;
        };
        if !span.contains(date) {
            continue;
        }
        if let Some(slot) = buckets
            .get_mut(&granularity.bucket_start(date))
            .and_then(|values| values.get_mut(category))
        {
            *slot += amount;
        }
    }

    CategoryTrends {
        granularity,
        categories: categories.into_iter().map(str::to_string).collect(),
        points: buckets
            .into_iter()
            .map(|(date, values)| CategoryTrendPoint { date, values })
            .collect(),
    }
}
