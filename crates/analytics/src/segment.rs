use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use storelens_core::{count_percent, Money, TransactionRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub segment: String,
    /// Buyers for demographic segments, orders for payment segments.
    pub count: usize,
    pub percentage: Decimal,
    pub gmv: Money,
}

/// Groups buyers by an attribute taken from their first record that carries
/// it. Gmv counts every record of the buyer. Sorted by the key's ordering.
fn buyer_segments<K, F>(records: &[TransactionRecord], key: F) -> Vec<Segment>
where
    K: Ord + ToString,
    F: Fn(&TransactionRecord) -> Option<K>,
{
    let mut assigned: HashMap<&str, K> = HashMap::new();
    let mut spend: HashMap<&str, Money> = HashMap::new();
    for r in records {
        let Some(buyer) = r.buyer_id.as_deref() else {
            continue;
        };
        *spend.entry(buyer).or_default() += r.amount.unwrap_or_default();
        if !assigned.contains_key(buyer) {
            if let Some(k) = key(r) {
                assigned.insert(buyer, k);
            }
        }
    }

    let unassigned = spend.len() - assigned.len();
    if unassigned > 0 {
        tracing::debug!(unassigned, "segment: buyers without the attribute");
    }

    let total = assigned.len();
    let mut groups: BTreeMap<K, (usize, Money)> = BTreeMap::new();
    for (buyer, k) in assigned {
        let slot = groups.entry(k).or_insert((0, Money::zero()));
        slot.0 += 1;
        slot.1 += spend.get(buyer).copied().unwrap_or_default();
    }

    groups
        .into_iter()
        .map(|(k, (count, gmv))| Segment {
            segment: k.to_string(),
            count,
            percentage: count_percent(count, total),
            gmv,
        })
        .collect()
}

fn by_count_desc(mut segments: Vec<Segment>) -> Vec<Segment> {
    segments.sort_by(|a, b| b.count.cmp(&a.count));
    segments
}

/// Buyers per gender, largest first.
pub fn gender_segments(records: &[TransactionRecord]) -> Vec<Segment> {
    by_count_desc(buyer_segments(records, |r| r.gender.clone()))
}

/// Buyers per age group in canonical age order.
pub fn age_segments(records: &[TransactionRecord]) -> Vec<Segment> {
    buyer_segments(records, |r| r.age_group.clone())
}

/// Orders per payment method, largest first.
pub fn payment_segments(records: &[TransactionRecord]) -> Vec<Segment> {
    let mut groups: BTreeMap<_, (usize, Money)> = BTreeMap::new();
    let mut skipped = 0usize;
    for r in records {
        let Some(method) = r.payment_method.as_ref() else {
            skipped += 1;
            continue;
        };
        let slot = groups.entry(method).or_insert((0, Money::zero()));
        slot.0 += 1;
        slot.1 += r.amount.unwrap_or_default();
    }
    if skipped > 0 {
        tracing::debug!(skipped, "segment: orders without payment method");
    }

    let total: usize = groups.values().map(|(n, _)| n).sum();
    by_count_desc(
        groups
            .into_iter()
            .map(|(method, (count, gmv))| Segment {
                segment: method.to_string(),
                count,
                percentage: count_percent(count, total),
                gmv,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, rec, scenario};
    use storelens_core::{AgeGroup, Gender};

    #[test]
    fn gender_counts_buyers_not_orders() {
        let segments = gender_segments(&scenario());
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.count == 1));
        assert!(segments.iter().all(|s| s.percentage == Decimal::from(50)));
        let male = segments.iter().find(|s| s.segment == "Male").unwrap();
        assert_eq!(male.gmv, Money::from_major(150));
    }

    #[test]
    fn age_segments_follow_canonical_order() {
        let records = vec![
            rec(date(2024, 1, 1), "A", "x", 10, 1).with_demographics(Gender::Male, AgeGroup::Over55),
            rec(date(2024, 1, 1), "B", "x", 10, 1).with_demographics(Gender::Male, AgeGroup::From18To24),
            rec(date(2024, 1, 1), "C", "x", 10, 1).with_demographics(Gender::Male, AgeGroup::From18To24),
        ];
        let segments = age_segments(&records);
        let labels: Vec<&str> = segments.iter().map(|s| s.segment.as_str()).collect();
        assert_eq!(labels, vec!["18-24", "55+"]);
        assert_eq!(segments[0].count, 2);
        assert_eq!(segments[0].percentage, Decimal::new(6667, 2));
    }

    #[test]
    fn buyer_keeps_first_seen_attribute() {
        let records = vec![
            rec(date(2024, 1, 1), "A", "x", 10, 1).with_demographics(Gender::Female, AgeGroup::From25To34),
            rec(date(2024, 2, 1), "A", "x", 5, 1).with_demographics(Gender::Male, AgeGroup::From25To34),
        ];
        let segments = gender_segments(&records);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].segment, "Female");
        assert_eq!(segments[0].gmv, Money::from_major(15));
        assert_eq!(segments[0].percentage, Decimal::from(100));
    }

    #[test]
    fn buyers_without_attribute_are_left_out_of_denominator() {
        let mut records = scenario();
        records[2].gender = None;
        let segments = gender_segments(&records);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].percentage, Decimal::from(100));
    }

    #[test]
    fn payment_segments_count_orders() {
        let segments = payment_segments(&scenario());
        assert_eq!(segments[0].segment, "Alipay");
        assert_eq!(segments[0].count, 2);
        assert_eq!(segments[0].gmv, Money::from_major(80));
        assert_eq!(segments[0].percentage, Decimal::new(6667, 2));
        assert_eq!(segments[1].segment, "Credit Card");
        assert_eq!(segments[1].count, 1);
    }

    #[test]
    fn empty_input_gives_no_segments() {
        assert!(gender_segments(&[]).is_empty());
        assert!(age_segments(&[]).is_empty());
        assert!(payment_segments(&[]).is_empty());
    }
}
