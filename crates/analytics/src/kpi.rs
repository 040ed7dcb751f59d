use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use storelens_core::{count_percent, Money, TransactionRecord};

/// Headline numbers of the dashboard. Every record is one order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub gmv: Money,
    pub order_count: usize,
    pub unique_buyers: usize,
    pub total_items_sold: u64,
    /// Average order value over the orders that carry an amount.
    pub aov: Money,
    /// Average item price.
    pub ipv: Money,
    /// Share of buyers with more than one order, in percent.
    pub repurchase_rate: Decimal,
}

pub fn kpi_summary(records: &[TransactionRecord]) -> KpiSummary {
    let mut gmv = Money::zero();
    let mut priced_orders = 0u64;
    let mut items = 0u64;
    let mut orders_by_buyer: HashMap<&str, usize> = HashMap::new();

    for r in records {
        if let Some(amount) = r.amount {
            gmv += amount;
            priced_orders += 1;
        }
        if let Some(n) = r.item_count {
            items += u64::from(n);
        }
        if let Some(buyer) = r.buyer_id.as_deref() {
            *orders_by_buyer.entry(buyer).or_insert(0) += 1;
        }
    }

    let skipped = records.len() as u64 - priced_orders;
    if skipped > 0 {
        tracing::debug!(skipped, "kpi: orders without amount left out of gmv");
    }

    let unique_buyers = orders_by_buyer.len();
    let repeat_buyers = orders_by_buyer.values().filter(|n| **n > 1).count();

    KpiSummary {
        gmv,
        order_count: records.len(),
        unique_buyers,
        total_items_sold: items,
        aov: gmv.per(priced_orders),
        ipv: gmv.per(items),
        repurchase_rate: count_percent(repeat_buyers, unique_buyers),
    }
}
