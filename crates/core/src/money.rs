//! Money representation.
//!
//! Amounts are `rust_decimal::Decimal` values with a fixed scale of two
//! fractional digits, matching the `NUMERIC(14,2)` storage columns.

use rust_decimal::RoundingStrategy;

pub use rust_decimal::Decimal;

/// Number of fractional digits kept for every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(14,2)` column holds: 999 999 999 999.99.
pub const MAX_MONEY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, MONEY_SCALE);

/// Round an amount to [`MONEY_SCALE`] digits, half away from zero.
pub fn normalize_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
