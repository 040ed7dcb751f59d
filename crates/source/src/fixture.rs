use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use storelens_core::{AgeGroup, Gender, Money, PaymentMethod, TransactionRecord};

const CATEGORIES: [&str; 8] = [
    "Electronics",
    "Clothing",
    "Home & Garden",
    "Beauty",
    "Sports",
    "Books",
    "Grocery",
    "Toys",
];

/// Records per simulated buyer, so most buyers purchase more than once.
const ORDERS_PER_BUYER: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSettings {
    pub seed: u64,
    pub records: usize,
    pub start: NaiveDate,
    pub days: u32,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            records: 5000,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN),
            days: 365,
        }
    }
}

/// Deterministic stand-in for the remote feed: the same settings always
/// produce the same collection.
#[derive(Debug, Clone, Default)]
pub struct FixtureGenerator {
    settings: FixtureSettings,
}

impl FixtureGenerator {
    pub fn new(settings: FixtureSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FixtureSettings {
        &self.settings
    }

    /// Complete, valid records sorted by date.
    pub fn generate(&self) -> Vec<TransactionRecord> {
        let s = &self.settings;
        let mut rng = StdRng::seed_from_u64(s.seed);
        let buyers = (s.records / ORDERS_PER_BUYER).max(1);
        let days = u64::from(s.days.max(1));

        // Demographics belong to the buyer, not the order.
        let profiles: Vec<(Gender, AgeGroup)> = (0..buyers)
            .map(|_| {
                let gender = if rng.gen_bool(0.5) {
                    Gender::Male
                } else {
                    Gender::Female
                };
                let age = AgeGroup::KNOWN[rng.gen_range(0..AgeGroup::KNOWN.len())].clone();
                (gender, age)
            })
            .collect();

        let mut records: Vec<TransactionRecord> = (0..s.records)
            .map(|_| {
                let buyer = rng.gen_range(0..buyers);
                let date = s
                    .start
                    .checked_add_days(Days::new(rng.gen_range(0..days)))
                    .unwrap_or(s.start);
                let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
                let method = PaymentMethod::KNOWN[rng.gen_range(0..PaymentMethod::KNOWN.len())].clone();
                let items = rng.gen_range(1..=5u32);
                let amount = Money::from_cents(rng.gen_range(500..=60_000i64));
                let (gender, age) = profiles[buyer].clone();

                TransactionRecord::new(date, &format!("U{buyer:05}"), category, amount, items)
                    .with_payment_method(method)
                    .with_demographics(gender, age)
            })
            .collect();

        records.sort_by_key(|r| r.date);
        tracing::debug!(count = records.len(), seed = s.seed, "fixture: records generated");
        records
    }
}
