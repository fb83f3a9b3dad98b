//! Price adjustments shared by discounts and surcharges
//!
//! An adjustment is a percentage of a base amount, a fixed amount, or both.
//! Discounts evaluate it capped so they never exceed the base; surcharges
//! evaluate it uncapped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, Rate};

use crate::error::BillingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdjustmentKind {
    Percentage { rate: Rate },
    FixedAmount { amount: Money },
    Both { rate: Rate, amount: Money },
}

fn cap(value: Money, base: Money) -> Money {
    if value.amount() > base.amount() {
        base
    } else {
        value
    }
}

impl AdjustmentKind {
    /// Rejects negative rates and amounts, and values beyond the money limits
    pub fn validate(&self) -> Result<(), BillingError> {
        let negative_rate = |r: &Rate| r.as_decimal() < Decimal::ZERO;
        self.ensure_within_limits()?;
        match self {
            AdjustmentKind::Percentage { rate } if negative_rate(rate) => {
                Err(BillingError::InvalidAdjustment(format!("negative rate {rate}")))
            }
            AdjustmentKind::FixedAmount { amount } if amount.is_negative() => {
                Err(BillingError::InvalidAdjustment(format!("negative amount {amount}")))
            }
            AdjustmentKind::Both { rate, amount } if negative_rate(rate) || amount.is_negative() => {
                Err(BillingError::InvalidAdjustment(format!(
                    "negative rate {rate} or amount {amount}"
                )))
            }
            _ => Ok(()),
        }
    }

    fn ensure_within_limits(&self) -> Result<(), BillingError> {
        match self {
            AdjustmentKind::Percentage { rate } => {
                Rate::try_new(rate.as_decimal().abs())?;
            }
            AdjustmentKind::FixedAmount { amount } => amount.ensure_within_limit()?,
            AdjustmentKind::Both { rate, amount } => {
                Rate::try_new(rate.as_decimal().abs())?;
                amount.ensure_within_limit()?;
            }
        }
        Ok(())
    }

    /// The currency of the fixed part, if any
    pub fn currency(&self) -> Option<Currency> {
        match self {
            AdjustmentKind::Percentage { .. } => None,
            AdjustmentKind::FixedAmount { amount } | AdjustmentKind::Both { amount, .. } => {
                Some(amount.currency())
            }
        }
    }

    /// Fails unless the fixed part is in `currency`
    pub fn ensure_currency(&self, currency: Currency) -> Result<(), BillingError> {
        match self.currency() {
            Some(c) if c != currency => Err(core_kernel::MoneyError::CurrencyMismatch(
                currency.to_string(),
                c.to_string(),
            )
            .into()),
            _ => Ok(()),
        }
    }

    /// Evaluates against `base`; each part and the sum are capped at the base
    pub fn evaluate_capped(&self, base: Money) -> Money {
        let base = base.floor_zero();
        let value = match self {
            AdjustmentKind::Percentage { rate } => cap(rate.apply(&base), base),
            AdjustmentKind::FixedAmount { amount } => cap(*amount, base),
            AdjustmentKind::Both { rate, amount } => {
                cap(rate.apply(&base), base) + cap(*amount, base)
            }
        };
        cap(value, base)
    }

    /// Evaluates against `base` without capping
    pub fn evaluate_uncapped(&self, base: Money) -> Money {
        let base = base.floor_zero();
        match self {
            AdjustmentKind::Percentage { rate } => rate.apply(&base),
            AdjustmentKind::FixedAmount { amount } => *amount,
            AdjustmentKind::Both { rate, amount } => rate.apply(&base) + *amount,
        }
    }
}
