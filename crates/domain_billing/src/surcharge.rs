//! Surcharges (e.g. card processing fees)

use serde::{Deserialize, Serialize};

use core_kernel::{Money, SurchargeId};

use crate::adjustment::AdjustmentKind;
use crate::error::BillingError;

/// An additive charge applied to the discounted invoice subtotal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surcharge {
    pub id: SurchargeId,
    pub name: String,
    pub kind: AdjustmentKind,
    pub is_active: bool,
}

impl Surcharge {
    /// Creates an active surcharge
    pub fn new(name: impl Into<String>, kind: AdjustmentKind) -> Result<Self, BillingError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BillingError::InvalidAdjustment("Surcharge name is required".to_string()));
        }
        kind.validate()?;
        Ok(Self {
            id: SurchargeId::new_v7(),
            name,
            kind,
            is_active: true,
        })
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// The surcharge amount for `base`
    pub fn amount_for(&self, base: Money) -> Money {
        if !self.is_active {
            return Money::zero(base.currency());
        }
        self.kind.evaluate_uncapped(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, Rate};
    use rust_decimal_macros::dec;

    #[test]
    fn test_card_fee() {
        let fee = Surcharge::new(
            "Credit card fee",
            AdjustmentKind::Both {
                rate: Rate::new(dec!(0.029)),
                amount: Money::new(dec!(0.30), Currency::CAD),
            },
        )
        .unwrap();

        let amount = fee.amount_for(Money::new(dec!(100), Currency::CAD));
        assert_eq!(amount.amount(), dec!(3.20));
    }

    #[test]
    fn test_inactive_surcharge() {
        let mut fee = Surcharge::new(
            "Rush",
            AdjustmentKind::FixedAmount { amount: Money::new(dec!(25), Currency::CAD) },
        )
        .unwrap();
        fee.deactivate();
        assert!(fee.amount_for(Money::new(dec!(100), Currency::CAD)).is_zero());
    }
}
