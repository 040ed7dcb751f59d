use chrono::NaiveDate;
use storelens_core::{AgeGroup, Gender, Money, PaymentMethod, TransactionRecord};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn rec(day: NaiveDate, buyer: &str, category: &str, amount: i64, items: u32) -> TransactionRecord {
    TransactionRecord::new(day, buyer, category, Money::from_major(amount), items)
}

/// Two buyers: A buys electronics in January and February, B buys grocery in January.
pub fn scenario() -> Vec<TransactionRecord> {
    vec![
        rec(date(2024, 1, 5), "A", "electronics", 100, 1)
            .with_payment_method(PaymentMethod::CreditCard)
            .with_demographics(Gender::Male, AgeGroup::From25To34),
        rec(date(2024, 2, 10), "A", "electronics", 50, 1)
            .with_payment_method(PaymentMethod::Alipay)
            .with_demographics(Gender::Male, AgeGroup::From25To34),
        rec(date(2024, 1, 20), "B", "grocery", 30, 2)
            .with_payment_method(PaymentMethod::Alipay)
            .with_demographics(Gender::Female, AgeGroup::From35To44),
    ]
}
