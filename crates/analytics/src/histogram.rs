use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use storelens_core::{AgeGroup, TransactionRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub label: String,
    pub count: usize,
}

/// Fixed-width binning; the last bin is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinSpec {
    pub order_bin_width: u32,
    pub max_bins: usize,
}

impl Default for BinSpec {
    fn default() -> Self {
        Self {
            order_bin_width: 100,
            max_bins: 10,
        }
    }
}

impl BinSpec {
    fn normalized(self) -> (Decimal, usize) {
        let width = self.order_bin_width.max(1);
        (Decimal::from(width), self.max_bins.max(1))
    }

    fn label(self, index: usize) -> String {
        let (width, bins) = self.normalized();
        let lower = width * Decimal::from(index as u64);
        if index + 1 == bins {
            format!("{lower}+")
        } else {
            format!("{lower}-{}", lower + width)
        }
    }
}

/// Orders per amount band. Every band is present, empty ones with zero.
pub fn order_value_distribution(records: &[TransactionRecord], spec: BinSpec) -> Vec<HistogramBin> {
    let (width, bins) = spec.normalized();
    let mut counts = vec![0usize; bins];
    for amount in records.iter().filter_map(|r| r.amount) {
        let index = (amount.amount() / width)
            .floor()
            .to_usize()
            .unwrap_or(bins - 1)
            .min(bins - 1);
        counts[index] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            label: spec.label(i),
            count,
        })
        .collect()
}

/// Orders per age group. The standard groups are always present; labels
/// outside them follow in sorted order.
pub fn age_distribution(records: &[TransactionRecord]) -> Vec<HistogramBin> {
    let mut counts: BTreeMap<AgeGroup, usize> =
        AgeGroup::KNOWN.into_iter().map(|g| (g, 0)).collect();
    for group in records.iter().filter_map(|r| r.age_group.clone()) {
        *counts.entry(group).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(group, count)| HistogramBin {
            label: group.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, rec, scenario};

    #[test]
    fn order_values_fall_into_fixed_bins() {
        let spec = BinSpec {
            order_bin_width: 50,
            max_bins: 4,
        };
        let bins = order_value_distribution(&scenario(), spec);
        let labels: Vec<&str> = bins.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["0-50", "50-100", "100-150", "150+"]);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        // 30 -> first, 50 -> second (lower bound inclusive), 100 -> third.
        assert_eq!(counts, vec![1, 1, 1, 0]);
    }

    #[test]
    fn large_orders_land_in_open_last_bin() {
        let records = vec![rec(date(2024, 1, 1), "A", "x", 1_000_000, 1)];
        let bins = order_value_distribution(&records, BinSpec::default());
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[9].label, "900+");
        assert_eq!(bins[9].count, 1);
    }

    #[test]
    fn degenerate_spec_is_normalized() {
        let spec = BinSpec {
            order_bin_width: 0,
            max_bins: 0,
        };
        let bins = order_value_distribution(&scenario(), spec);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
    }

    #[test]
    fn empty_input_gives_zeroed_bins() {
        let bins = order_value_distribution(&[], BinSpec::default());
        assert_eq!(bins.len(), 10);
        assert!(bins.iter().all(|b| b.count == 0));

        let ages = age_distribution(&[]);
        assert_eq!(ages.len(), 5);
        assert!(ages.iter().all(|b| b.count == 0));
    }

    #[test]
    fn age_distribution_counts_orders() {
        let mut records = scenario();
        records.push(
            rec(date(2024, 3, 1), "C", "x", 1, 1)
                .with_demographics(storelens_core::Gender::Male, AgeGroup::Other("65+".into())),
        );
        let bins = age_distribution(&records);
        assert_eq!(bins.len(), 6);
        assert_eq!(bins[1].label, "25-34");
        assert_eq!(bins[1].count, 2);
        assert_eq!(bins[2].count, 1);
        assert_eq!(bins[5].label, "65+");
    }
}
