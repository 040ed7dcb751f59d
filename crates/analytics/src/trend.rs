use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use storelens_core::{DateRange, Granularity, Money, TransactionRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// First day of the bucket.
    pub date: NaiveDate,
    pub gmv: Money,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub granularity: Granularity,
    pub points: Vec<TrendPoint>,
}

/// The window a series should cover: the active range when there is one,
/// otherwise the span of the dated records.
pub(crate) fn resolve_span(
    records: &[TransactionRecord],
    range: Option<DateRange>,
) -> Option<DateRange> {
    range.or_else(|| DateRange::spanning(records.iter().filter_map(|r| r.date)))
}

/// Sums amount and order count per bucket over `span`, zero-filling gaps.
pub(crate) fn bucket_totals(
    records: &[TransactionRecord],
    span: DateRange,
    granularity: Granularity,
) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, (Money, usize)> = granularity
        .buckets(span)
        .into_iter()
        .map(|d| (d, (Money::zero(), 0)))
        .collect();

    let mut skipped = 0usize;
    for r in records {
        let (Some(date), Some(amount)) = (r.date, r.amount) else {
            skipped += 1;
            continue;
        };
        if !span.contains(date) {
            continue;
        }
        if let Some(slot) = buckets.get_mut(&granularity.bucket_start(date)) {
            slot.0 += amount;
            slot.1 += 1;
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "trend: records without date or amount");
    }

    buckets
        .into_iter()
        .map(|(date, (gmv, orders))| TrendPoint { date, gmv, orders })
        .collect()
}

/// GMV over time, bucketed by the granularity that fits the span.
pub fn trend_series(records: &[TransactionRecord], range: Option<DateRange>) -> TrendSeries {
    match resolve_span(records, range) {
        Some(span) => {
            let granularity = Granularity::for_span(span);
            TrendSeries {
                granularity,
                points: bucket_totals(records, span, granularity),
            }
        }
        None => TrendSeries {
            granularity: Granularity::Day,
            points: Vec::new(),
        },
    }
}

/// One point per calendar day, whatever the span.
pub fn daily_activity(records: &[TransactionRecord], range: Option<DateRange>) -> Vec<TrendPoint> {
    resolve_span(records, range)
        .map(|span| bucket_totals(records, span, Granularity::Day))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, rec, scenario};

    #[test]
    fn scenario_trend_is_daily_and_continuous() {
        // 2024-01-05 .. 2024-02-10 is 37 days, so daily buckets.
        let series = trend_series(&scenario(), None);
        assert_eq!(series.granularity, Granularity::Day);
        assert_eq!(series.points.len(), 37);
        assert_eq!(series.points[0].date, date(2024, 1, 5));
        assert_eq!(series.points[0].gmv, Money::from_major(100));
        assert_eq!(series.points[1].gmv, Money::zero());
        assert_eq!(series.points[1].orders, 0);
        let last = series.points.last().unwrap();
        assert_eq!(last.date, date(2024, 2, 10));
        assert_eq!(last.gmv, Money::from_major(50));
    }

    #[test]
    fn active_range_pads_both_ends() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31));
        let series = trend_series(&scenario(), Some(range));
        assert_eq!(series.points.len(), 31);
        assert_eq!(series.points[0].date, date(2024, 1, 1));
        assert_eq!(series.points[0].gmv, Money::zero());
        // February purchase lies outside the range.
        let total: Money = series.points.iter().map(|p| p.gmv).sum();
        assert_eq!(total, Money::from_major(130));
    }

    #[test]
    fn long_spans_use_monthly_buckets() {
        let records = vec![
            rec(date(2023, 1, 15), "A", "x", 10, 1),
            rec(date(2023, 1, 20), "B", "x", 5, 1),
            rec(date(2024, 6, 1), "A", "x", 7, 1),
        ];
        let series = trend_series(&records, None);
        assert_eq!(series.granularity, Granularity::Month);
        assert_eq!(series.points.len(), 18);
        assert_eq!(series.points[0].date, date(2023, 1, 1));
        assert_eq!(series.points[0].gmv, Money::from_major(15));
        assert_eq!(series.points[0].orders, 2);
        assert_eq!(series.points[17].gmv, Money::from_major(7));
        assert!(series.points.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn medium_spans_use_weekly_buckets() {
        let records = vec![
            rec(date(2024, 1, 3), "A", "x", 10, 1), // Wednesday
            rec(date(2024, 4, 1), "B", "x", 5, 1),
        ];
        let series = trend_series(&records, None);
        assert_eq!(series.granularity, Granularity::Week);
        assert_eq!(series.points[0].date, date(2024, 1, 1));
        assert_eq!(series.points.last().unwrap().date, date(2024, 4, 1));
    }

    #[test]
    fn undated_records_are_skipped() {
        let mut records = scenario();
        records[0].date = None;
        let total: Money = trend_series(&records, None).points.iter().map(|p| p.gmv).sum();
        assert_eq!(total, Money::from_major(80));
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let series = trend_series(&[], None);
        assert!(series.points.is_empty());
        assert!(daily_activity(&[], None).is_empty());
    }

    #[test]
    fn empty_input_with_range_is_zero_filled() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 3));
        let days = daily_activity(&[], Some(range));
        assert_eq!(days.len(), 3);
        assert!(days.iter().all(|p| p.gmv.is_zero() && p.orders == 0));
    }

    #[test]
    fn daily_activity_ignores_span_length() {
        let records = vec![
            rec(date(2023, 1, 1), "A", "x", 1, 1),
            rec(date(2023, 12, 31), "A", "x", 1, 1),
        ];
        assert_eq!(daily_activity(&records, None).len(), 365);
    }

    #[test]
    fn range_at_calendar_end_does_not_overflow() {
        let last = DateRange::new(NaiveDate::MAX, NaiveDate::MAX);
        let records = vec![rec(NaiveDate::MAX, "A", "x", 7, 1)];
        let series = trend_series(&records, Some(last));
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].gmv, Money::from_major(7));
        assert_eq!(daily_activity(&[], Some(last)).len(), 1);
    }
}
