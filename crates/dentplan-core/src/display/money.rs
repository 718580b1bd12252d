//! Currency amount formatting.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

/// Formats an amount with exactly two decimal places, rounding half away
/// from zero.
///
/// ```rust
/// use dentplan_core::display::Money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(Money(&Decimal::new(6005, 1)).to_string(), "600.50");
/// ```
pub struct Money<'a>(pub &'a Decimal);

impl fmt::Display for Money<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{rounded:.2}")
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_money_pads_and_rounds() {
        assert_eq!(Money(&dec!(600)).to_string(), "600.00");
        assert_eq!(Money(&dec!(12.345)).to_string(), "12.35");
        assert_eq!(Money(&dec!(-3.5)).to_string(), "-3.50");
    }
}
