//! Plan-level money arithmetic.
//!
//! All functions are pure: they take a [`CostSnapshot`] and return the next
//! one, leaving persistence to the caller. Every returned snapshot satisfies
//! `final_cost == total_cost - discount_amount` and
//! `discount_amount <= total_cost`.

use rust_decimal::Decimal;

use crate::{
    error::{codes, PlannerError, Result},
    models::{CostSnapshot, LedgerChange},
};

/// Sign of a single-amount adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Add,
    Subtract,
}

/// Rejects negative money input.
pub fn ensure_non_negative(field: &str, amount: Decimal) -> Result<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PlannerError::validation(
            codes::NEGATIVE_AMOUNT,
            format!("{field} must not be negative (got {amount})"),
        ));
    }
    Ok(())
}

/// Enforces `discount <= total`.
pub fn ensure_discount_within(total: Decimal, discount: Decimal) -> Result<()> {
    if discount > total {
        return Err(PlannerError::validation(
            codes::DISCOUNT_EXCEEDS_TOTAL,
            format!("Discount {discount} exceeds total cost {total}"),
        ));
    }
    Ok(())
}

/// Opening ledger for a new plan.
pub fn open(total: Decimal, discount: Decimal) -> Result<CostSnapshot> {
    ensure_non_negative("total_cost", total)?;
    ensure_non_negative("discount_amount", discount)?;
    ensure_discount_within(total, discount)?;
    Ok(CostSnapshot {
        total_cost: total,
        discount_amount: discount,
        final_cost: total - discount,
    })
}

/// Moves `total_cost` and `final_cost` together by `amount`.
///
/// Used for skip, unskip and delete. A subtraction that would push the total
/// below the discount is refused, since the discount can then no longer be
/// honoured.
pub fn apply_delta(
    costs: CostSnapshot,
    amount: Decimal,
    direction: Direction,
) -> Result<LedgerChange> {
    ensure_non_negative("amount", amount)?;
    let signed = match direction {
        Direction::Add => amount,
        Direction::Subtract => -amount,
    };
    shift(costs, signed)
}

/// Adds newly created items: total grows by their sum and final is recomputed
/// from the current discount.
pub fn add_items(costs: CostSnapshot, prices: &[Decimal]) -> Result<LedgerChange> {
    for price in prices {
        ensure_non_negative("price", *price)?;
    }
    let sum: Decimal = prices.iter().copied().sum();
    let total_cost = costs.total_cost + sum;
    Ok(LedgerChange {
        before: costs,
        after: CostSnapshot {
            total_cost,
            discount_amount: costs.discount_amount,
            final_cost: total_cost - costs.discount_amount,
        },
    })
}

/// Applies the signed difference of a single item price change.
pub fn reprice(costs: CostSnapshot, old_price: Decimal, new_price: Decimal) -> Result<LedgerChange> {
    ensure_non_negative("price", new_price)?;
    shift(costs, new_price - old_price)
}

/// Finance adjustment: the total is re-summed from scratch and the discount is
/// replaced when one is supplied.
pub fn resum(
    costs: CostSnapshot,
    billable_prices: &[Decimal],
    new_discount: Option<Decimal>,
) -> Result<LedgerChange> {
    let total_cost: Decimal = billable_prices.iter().copied().sum();
    let discount_amount = new_discount.unwrap_or(costs.discount_amount);
    let after = open(total_cost, discount_amount)?;
    Ok(LedgerChange {
        before: costs,
        after,
    })
}

fn shift(costs: CostSnapshot, signed: Decimal) -> Result<LedgerChange> {
    let total_cost = costs.total_cost + signed;
    ensure_non_negative("total_cost", total_cost)?;
    ensure_discount_within(total_cost, costs.discount_amount)?;
    Ok(LedgerChange {
        before: costs,
        after: CostSnapshot {
            total_cost,
            discount_amount: costs.discount_amount,
            final_cost: total_cost - costs.discount_amount,
        },
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::error::ErrorKind;

    fn costs(total: Decimal, discount: Decimal) -> CostSnapshot {
        open(total, discount).unwrap()
    }

    fn assert_balanced(snapshot: CostSnapshot) {
        assert_eq!(
            snapshot.final_cost,
            snapshot.total_cost - snapshot.discount_amount
        );
        assert!(snapshot.discount_amount <= snapshot.total_cost);
    }

    #[test]
    fn test_open_rejects_discount_above_total() {
        let err = open(dec!(100), dec!(100.01)).unwrap_err();
        assert_eq!(err.code(), Some(codes::DISCOUNT_EXCEEDS_TOTAL));
        assert!(open(dec!(100), dec!(100)).is_ok());
    }

    #[test]
    fn test_open_rejects_negative_amounts() {
        let err = open(dec!(-1), dec!(0)).unwrap_err();
        assert_eq!(err.code(), Some(codes::NEGATIVE_AMOUNT));
        let err = open(dec!(10), dec!(-1)).unwrap_err();
        assert_eq!(err.code(), Some(codes::NEGATIVE_AMOUNT));
    }

    #[test]
    fn test_skip_and_unskip_roundtrip() {
        let start = costs(dec!(600), dec!(50));
        let skipped = apply_delta(start, dec!(200), Direction::Subtract).unwrap();
        assert_eq!(skipped.after.total_cost, dec!(400));
        assert_eq!(skipped.after.final_cost, dec!(350));
        assert_balanced(skipped.after);

        let restored = apply_delta(skipped.after, dec!(200), Direction::Add).unwrap();
        assert_eq!(restored.after, start);
    }

    #[test]
    fn test_subtract_below_discount_is_refused() {
        let start = costs(dec!(300), dec!(250));
        let err = apply_delta(start, dec!(100), Direction::Subtract).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), Some(codes::DISCOUNT_EXCEEDS_TOTAL));
    }

    #[test]
    fn test_add_items_recomputes_final_from_discount() {
        let start = costs(dec!(100), dec!(10));
        let change = add_items(start, &[dec!(200), dec!(300)]).unwrap();
        assert_eq!(change.before, start);
        assert_eq!(change.after.total_cost, dec!(600));
        assert_eq!(change.after.final_cost, dec!(590));
        assert_balanced(change.after);
    }

    #[test]
    fn test_add_no_items_is_noop() {
        let start = costs(dec!(100), dec!(0));
        assert!(add_items(start, &[]).unwrap().is_noop());
    }

    #[test]
    fn test_reprice_applies_signed_difference() {
        let start = costs(dec!(600), dec!(0));
        let up = reprice(start, dec!(200), dec!(250.50)).unwrap();
        assert_eq!(up.after.total_cost, dec!(650.50));
        let down = reprice(up.after, dec!(250.50), dec!(50)).unwrap();
        assert_eq!(down.after.total_cost, dec!(450));
        assert_balanced(down.after);
    }

    #[test]
    fn test_reprice_rejects_negative_price() {
        let start = costs(dec!(600), dec!(0));
        let err = reprice(start, dec!(200), dec!(-5)).unwrap_err();
        assert_eq!(err.code(), Some(codes::NEGATIVE_AMOUNT));
    }

    #[test]
    fn test_resum_replaces_total_and_discount() {
        let start = costs(dec!(999), dec!(9));
        let change = resum(start, &[dec!(100), dec!(300)], Some(dec!(40))).unwrap();
        assert_eq!(change.after.total_cost, dec!(400));
        assert_eq!(change.after.discount_amount, dec!(40));
        assert_eq!(change.after.final_cost, dec!(360));

        let kept = resum(start, &[dec!(100)], None).unwrap();
        assert_eq!(kept.after.discount_amount, dec!(9));
        assert_eq!(kept.after.final_cost, dec!(91));
    }

    #[test]
    fn test_resum_validates_discount() {
        let start = costs(dec!(100), dec!(0));
        let err = resum(start, &[dec!(100)], Some(dec!(150))).unwrap_err();
        assert_eq!(err.code(), Some(codes::DISCOUNT_EXCEEDS_TOTAL));
    }

    #[test]
    fn test_mixed_sequence_stays_balanced() {
        let mut snapshot = costs(dec!(0), dec!(0));
        snapshot = add_items(snapshot, &[dec!(100), dec!(200), dec!(300)])
            .unwrap()
            .after;
        snapshot = apply_delta(snapshot, dec!(200), Direction::Subtract)
            .unwrap()
            .after;
        snapshot = reprice(snapshot, dec!(300), dec!(320)).unwrap().after;
        snapshot = apply_delta(snapshot, dec!(200), Direction::Add).unwrap().after;
        snapshot = apply_delta(snapshot, dec!(100), Direction::Subtract)
            .unwrap()
            .after;
        assert_eq!(snapshot.total_cost, dec!(520));
        assert_balanced(snapshot);
    }
}
