//! Operator fee computation.

use crate::types::Amount;

/// Fee rate denominator: 10000 basis points = 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Result of splitting an amount into operator fee and seller remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub fee: Amount,
    pub remainder: Amount,
}

/// Split `amount` at `rate_bps` basis points. `rate_bps` must be at
/// most 10000; [`crate::MarketConfig`] enforces this at construction.
///
/// `fee = floor(amount * rate_bps / 10000)` and the remainder is exactly
/// `amount - fee`, so `fee + remainder == amount` always holds. The fee
/// is computed in two parts so the intermediate product stays within
/// `u128` even at `Amount::MAX`:
/// `floor(a*r/d) == (a/d)*r + floor((a%d)*r/d)`.
pub fn split_fee(amount: Amount, rate_bps: u16) -> FeeSplit {
    debug_assert!(u128::from(rate_bps) <= BPS_DENOMINATOR);
    let rate = u128::from(rate_bps);
    let fee = (amount / BPS_DENOMINATOR) * rate
        + (amount % BPS_DENOMINATOR) * rate / BPS_DENOMINATOR;
    FeeSplit {
        fee,
        remainder: amount - fee,
    }
}
