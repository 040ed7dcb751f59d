use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn from_major(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Rounds half away from zero to whole cents.
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Average over `count` units, or zero when there are none.
    pub fn per(self, count: u64) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money::from_decimal(self.0 / Decimal::from(count))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_and_major_agree() {
        assert_eq!(Money::from_cents(12_300), Money::from_major(123));
    }

    #[test]
    fn display_has_two_decimals() {
        assert_eq!(Money::from_major(5).to_string(), "5.00");
        assert_eq!(Money::from_cents(1999).to_string(), "19.99");
    }

    #[test]
    fn from_decimal_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(Decimal::new(1005, 3)), Money::from_cents(101));
        assert_eq!(Money::from_decimal(Decimal::new(1004, 3)), Money::from_cents(100));
    }

    #[test]
    fn per_divides_and_guards_zero() {
        assert_eq!(Money::from_major(180).per(3), Money::from_major(60));
        assert_eq!(Money::from_major(180).per(0), Money::zero());
        assert_eq!(Money::from_major(10).per(3), Money::from_cents(333));
    }

    #[test]
    fn sum_over_iterator() {
        let total: Money = [Money::from_major(1), Money::from_cents(50)].iter().sum();
        assert_eq!(total, Money::from_cents(150));
    }

    #[test]
    fn negative_detection() {
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::zero().is_negative());
        assert!(!Money::from_cents(1).is_negative());
    }

    #[test]
    fn deserializes_from_json_number_and_string() {
        let m: Money = serde_json::from_str("42.5").unwrap();
        assert_eq!(m, Money::from_cents(4250));
        let m: Money = serde_json::from_str("\"42.50\"").unwrap();
        assert_eq!(m, Money::from_cents(4250));
    }
}
