// Pro-rata payout math for resolved markets
//
// A winning position is paid its fraction of the winning pool, applied to
// the entire market pool (all options' stakes combined). Winners therefore
// recover their own stake plus a share of every losing stake.

use rust_decimal::Decimal;

/// Quantize a monetary value to 6 decimal places
pub fn fixed6(value: Decimal) -> Decimal {
    let mut fixed = value.round_dp(6);
    fixed.rescale(6);
    fixed
}

/// Payout for a single winning position:
/// (stake / winning_pool) x total_pool
///
/// A zero or missing winning pool cannot coexist with a winning position,
/// but the divisor must never reach zero, so it falls back to 1.
pub fn position_payout(stake: Decimal, winning_pool: Decimal, total_pool: Decimal) -> Decimal {
    let divisor = if winning_pool > Decimal::ZERO {
        winning_pool
    } else {
        Decimal::ONE
    };
    stake / divisor * total_pool
}
