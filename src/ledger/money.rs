//! Fixed-point money helpers
//!
//! Balances, traded amounts and rates all live on whole cents. Rounding
//! direction depends on who bears the remainder: costs round up, proceeds
//! and whole-balance purchase sizes round down.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places carried by balances, amounts and rates
pub const MONEY_DP: u32 = 2;

/// Smallest tradable amount and lowest allowed rate (0.01)
pub const MIN_UNIT: Decimal = Decimal::from_parts(1, 0, 0, false, MONEY_DP);
pub const MIN_RATE: Decimal = MIN_UNIT;

/// Domestic cost of a purchase, rounded up to the cent
pub fn round_cost(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::AwayFromZero)
}

/// Domestic proceeds of a sale, rounded down to the cent
pub fn round_proceeds(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::ToZero)
}

/// Largest whole-cent amount not exceeding `value`
pub fn floor_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::ToZero)
}

/// True when `value` carries no more than two significant decimal places
pub fn has_money_precision(value: Decimal) -> bool {
    value.normalize().scale() <= MONEY_DP
}

/// Normalise a value to exactly two decimal places for storage and display
pub fn to_cents(value: Decimal) -> Decimal {
    let mut v = value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    v.rescale(MONEY_DP);
    v
}
