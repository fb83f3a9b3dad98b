//! Property-Based Test Generators
//!
//! Proptest strategies for random test data that respects domain invariants.

use core_kernel::{Currency, Money, Rate};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for the supported currencies
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::CAD),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::JPY),
        Just(Currency::AUD),
    ]
}

/// Strategy for positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000_000i64
}

/// Strategy for positive CAD amounts
pub fn cad_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|minor| Money::from_minor(minor, Currency::CAD))
}

/// Strategy for non-negative CAD amounts
pub fn cad_money_or_zero_strategy() -> impl Strategy<Value = Money> {
    (0i64..10_000_000i64).prop_map(|minor| Money::from_minor(minor, Currency::CAD))
}

/// Strategy for quantities with up to three decimal places
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64, 0u32..=3u32).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

/// Strategy for whole-number quantities
pub fn whole_quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1u32..50u32).prop_map(Decimal::from)
}

/// Strategy for tax-like rates between 0% and 30% with up to three decimals
pub fn rate_strategy() -> impl Strategy<Value = Rate> {
    (0i64..=30_000i64).prop_map(|thousandths| Rate::from_percentage(Decimal::new(thousandths, 3)))
}

/// Strategy for discount percentages between 0% and 100%
pub fn percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=10_000u32).prop_map(|n| Decimal::new(i64::from(n), 2))
}

/// Strategy for invoice lines as (unit price, quantity)
pub fn line_strategy() -> impl Strategy<Value = (Money, Decimal)> {
    (cad_money_strategy(), whole_quantity_strategy())
}

/// Strategy for a non-empty set of invoice lines
pub fn lines_strategy(max: usize) -> impl Strategy<Value = Vec<(Money, Decimal)>> {
    proptest::collection::vec(line_strategy(), 1..=max.max(1))
}
