use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on every reported percentage.
pub const PERCENT_DP: u32 = 2;

/// `part / whole * 100`, rounded to [`PERCENT_DP`]; zero when `whole` is zero.
pub fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(PERCENT_DP, RoundingStrategy::MidpointAwayFromZero)
}

pub fn count_percent(part: usize, whole: usize) -> Decimal {
    percent(Decimal::from(part), Decimal::from(whole))
}

/// Integer percentage rounded half-up. Zero when `whole` is zero.
pub fn whole_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part as u64;
    let whole = whole as u64;
    ((part * 200 + whole) / (whole * 2)) as u32
}
