// Random-walk rate model

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::money::{to_cents, MIN_RATE, MONEY_DP};

const CENTS_PER_UNIT: Decimal = Decimal::ONE_HUNDRED;

/// Uniform bounded drift over whole cents, floored at `MIN_RATE`
#[derive(Debug, Clone, PartialEq)]
pub struct RateModel {
    delta: Decimal,
    floor: Decimal,
}

impl RateModel {
    pub fn new(delta: Decimal) -> Self {
        Self {
            delta: delta.abs(),
            floor: MIN_RATE,
        }
    }

    /// Draw the next rate from `[current - delta, current + delta]`.
    ///
    /// The draw is uniform over the whole-cent values inside the interval and
    /// is then clamped to the floor, so the result always lies in
    /// `[max(floor, current - delta), current + delta]`.
    pub fn next_rate<R: Rng + ?Sized>(&self, current: Decimal, rng: &mut R) -> Decimal {
        let low = ((current - self.delta) * CENTS_PER_UNIT).ceil().to_i64();
        let high = ((current + self.delta) * CENTS_PER_UNIT).floor().to_i64();

        let drawn = match (low, high) {
            (Some(low), Some(high)) if low <= high => {
                Decimal::new(rng.gen_range(low..=high), MONEY_DP)
            }
            // No whole cent inside the interval
            _ => to_cents(current),
        };

        drawn.max(self.floor)
    }
}
