//! Discounts

use serde::{Deserialize, Serialize};

use core_kernel::{DiscountId, Money};

use crate::adjustment::AdjustmentKind;
use crate::error::BillingError;

/// What a discount is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountScope {
    /// Each line's subtotal
    PerItem,
    /// Once, on the invoice subtotal after line discounts
    PerOrder,
}

/// A discount attached to a line item or to the whole invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub id: DiscountId,
    pub name: String,
    pub kind: AdjustmentKind,
    pub scope: DiscountScope,
    /// Base below which the discount does not apply
    pub minimum_amount: Option<Money>,
    pub is_active: bool,
}

impl Discount {
    /// Creates an active discount
    pub fn new(
        name: impl Into<String>,
        kind: AdjustmentKind,
        scope: DiscountScope,
    ) -> Result<Self, BillingError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BillingError::InvalidAdjustment("Discount name is required".to_string()));
        }
        kind.validate()?;
        Ok(Self {
            id: DiscountId::new_v7(),
            name,
            kind,
            scope,
            minimum_amount: None,
            is_active: true,
        })
    }

    /// Sets the minimum base amount
    pub fn with_minimum(mut self, minimum: Money) -> Self {
        self.minimum_amount = Some(minimum);
        self
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Returns true if the discount applies to `base`
    pub fn applies_to(&self, base: Money) -> bool {
        self.is_active
            && self
                .minimum_amount
                .map_or(true, |min| base.amount() >= min.amount())
    }

    /// The discount amount for `base`, never more than the base
    pub fn amount_for(&self, base: Money) -> Money {
        if !self.applies_to(base) {
            return Money::zero(base.currency());
        }
        self.kind.evaluate_capped(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, Rate};
    use rust_decimal_macros::dec;

    fn ten_percent() -> Discount {
        Discount::new(
            "Loyalty",
            AdjustmentKind::Percentage { rate: Rate::new(dec!(0.10)) },
            DiscountScope::PerItem,
        )
        .unwrap()
    }

    #[test]
    fn test_minimum_amount() {
        let discount = ten_percent().with_minimum(Money::new(dec!(100), Currency::CAD));

        assert!(discount.amount_for(Money::new(dec!(99.99), Currency::CAD)).is_zero());
        assert_eq!(
            discount.amount_for(Money::new(dec!(100), Currency::CAD)).amount(),
            dec!(10)
        );
    }

    #[test]
    fn test_inactive_discount_is_zero() {
        let mut discount = ten_percent();
        discount.deactivate();
        assert!(discount.amount_for(Money::new(dec!(500), Currency::CAD)).is_zero());
    }

    #[test]
    fn test_requires_name() {
        let result = Discount::new(
            "",
            AdjustmentKind::Percentage { rate: Rate::new(dec!(0.1)) },
            DiscountScope::PerOrder,
        );
        assert!(result.is_err());
    }
}
