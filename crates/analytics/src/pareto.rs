use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use storelens_core::{count_percent, percent, Money, TransactionRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParetoPoint {
    pub rank: usize,
    pub buyer_id: String,
    pub gmv: Money,
    pub cumulative_buyer_pct: Decimal,
    pub cumulative_gmv_pct: Decimal,
}

/// Buyers ranked by spend with running shares of buyers and gmv.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParetoCurve {
    pub points: Vec<ParetoPoint>,
}

impl ParetoCurve {
    /// Gmv share held by the top `buyer_pct` percent of buyers (rounded up to
    /// whole buyers).
    pub fn top_share(&self, buyer_pct: Decimal) -> Decimal {
        let n = self.points.len();
        if n == 0 || buyer_pct <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let k = (Decimal::from(n as u64) * buyer_pct / Decimal::ONE_HUNDRED)
            .ceil()
            .to_usize()
            .unwrap_or(n)
            .clamp(1, n);
        self.points[k - 1].cumulative_gmv_pct
    }
}

pub fn buyer_pareto(records: &[TransactionRecord]) -> ParetoCurve {
    let mut spend: HashMap<&str, Money> = HashMap::new();
    for r in records {
        if let (Some(buyer), Some(amount)) = (r.buyer_id.as_deref(), r.amount) {
            *spend.entry(buyer).or_default() += amount;
        }
    }

    let mut ranked: Vec<(&str, Money)> = spend.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let n = ranked.len();
    let total: Money = ranked.iter().map(|(_, m)| *m).sum();
    let mut running = Money::zero();
    let mut points = Vec::with_capacity(n);
    for (i, (buyer, gmv)) in ranked.into_iter().enumerate() {
        running += gmv;
        let last = i + 1 == n;
        // The final point is pinned so rounding never leaves it short of 100.
        let (buyer_pct, gmv_pct) = if last {
            (Decimal::ONE_HUNDRED, Decimal::ONE_HUNDRED)
        } else {
            (count_percent(i + 1, n), percent(running.amount(), total.amount()))
        };
        points.push(ParetoPoint {
            rank: i + 1,
            buyer_id: buyer.to_string(),
            gmv,
            cumulative_buyer_pct: buyer_pct,
            cumulative_gmv_pct: gmv_pct,
        });
    }
    ParetoCurve { points }
}
