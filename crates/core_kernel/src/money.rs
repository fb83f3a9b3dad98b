//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for exact calculations without floating-point errors.
//! Amounts are never rounded implicitly: invoice totals must recompute to the
//! same value every time, so rounding is an explicit, presentation-level step.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub, Mul, Neg};
use thiserror::Error;

/// Largest magnitude accepted for a single price, charge, payment or refund
pub const MAX_AMOUNT: Decimal = dec!(1_000_000_000_000);

/// Largest quantity accepted on an invoice line
pub const MAX_QUANTITY: Decimal = dec!(1_000_000_000);

/// Largest rate accepted, as a fraction (10 is 1000%)
pub const MAX_RATE: Decimal = dec!(10);

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    CAD,
    USD,
    EUR,
    GBP,
    JPY,
    AUD,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::CAD => "C$",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::AUD => "A$",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::CAD => "CAD",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::AUD => "AUD",
        }
    }

    /// Parses an ISO 4217 code (case-insensitive)
    pub fn parse(code: &str) -> Result<Self, MoneyError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "CAD" => Ok(Currency::CAD),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "AUD" => Ok(Currency::AUD),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount with associated currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates Money from an integer amount in minor units (e.g., cents)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        Self::new(Decimal::new(minor_units, currency.decimal_places()), currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Clamps negative amounts to zero
    pub fn floor_zero(&self) -> Self {
        if self.is_negative() {
            Self::zero(self.currency)
        } else {
            *self
        }
    }

    /// Fails when the magnitude exceeds [`MAX_AMOUNT`]
    pub fn ensure_within_limit(&self) -> Result<(), MoneyError> {
        if self.amount.abs() > MAX_AMOUNT {
            return Err(MoneyError::OutOfRange(format!(
                "{self} exceeds the limit of {MAX_AMOUNT}"
            )));
        }
        Ok(())
    }

    /// Rounds to the currency's standard decimal places, half to even
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp(self.currency.decimal_places()),
            currency: self.currency,
        }
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self.amount.checked_add(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self.amount.checked_sub(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Checked multiplication by a scalar
    pub fn checked_mul(&self, factor: Decimal) -> Result<Money, MoneyError> {
        let amount = self.amount.checked_mul(factor).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Allocates money according to given ratios
    ///
    /// Every share but the last is rounded to the currency; the last share
    /// takes the remainder so the allocations always sum to the original.
    pub fn allocate_by_ratios(&self, ratios: &[Decimal]) -> Result<Vec<Money>, MoneyError> {
        if ratios.is_empty() {
            return Err(MoneyError::InvalidAmount("Empty ratios".to_string()));
        }
        if ratios.iter().any(|r| r.is_sign_negative() && !r.is_zero()) {
            return Err(MoneyError::InvalidAmount("Negative ratio".to_string()));
        }

        let total_ratio: Decimal = ratios.iter().sum();
        if total_ratio.is_zero() {
            return Err(MoneyError::InvalidAmount("Total ratio is zero".to_string()));
        }

        let dp = self.currency.decimal_places();
        let mut allocated = Money::zero(self.currency);
        let mut allocations = Vec::with_capacity(ratios.len());

        for (i, ratio) in ratios.iter().enumerate() {
            if i == ratios.len() - 1 {
                let remainder = self.checked_sub(&allocated)?;
                allocations.push(remainder);
            } else {
                let allocation = Self::new(
                    (self.amount * *ratio / total_ratio).round_dp(dp),
                    self.currency,
                );
                allocated = allocated.checked_add(&allocation)?;
                allocations.push(allocation);
            }
        }

        Ok(allocations)
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(())
    }
}

impl PartialOrd for Money {
    /// Amounts in different currencies are not comparable
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        self.amount.partial_cmp(&other.amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.amount,
            dp = dp as usize
        )
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in Money::sub")
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }
}

/// Represents a fractional rate (tax rate, discount percentage, fee percentage)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.05 for 5%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.05 for 5%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate, rejecting negative values and values above [`MAX_RATE`]
    pub fn try_new(value: Decimal) -> Result<Self, MoneyError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MoneyError::InvalidAmount(format!("Rate cannot be negative: {}", value)));
        }
        if value > MAX_RATE {
            return Err(MoneyError::OutOfRange(format!("Rate {value} exceeds {MAX_RATE}")));
        }
        Ok(Self { value })
    }

    /// A zero rate
    pub fn zero() -> Self {
        Self { value: Decimal::ZERO }
    }

    /// Creates a rate from a percentage (e.g., 5.0 for 5%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Applies this rate to a money amount
    pub fn apply(&self, money: &Money) -> Money {
        *money * self.value
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(100.50), Currency::CAD);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::CAD);
    }

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050, Currency::CAD);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_keeps_full_precision() {
        let m = Money::new(dec!(10), Currency::CAD) * dec!(0.09975);
        assert_eq!(m.amount(), dec!(0.99750));
    }

    #[test]
    fn test_currency_mismatch() {
        let cad = Money::new(dec!(100.00), Currency::CAD);
        let usd = Money::new(dec!(100.00), Currency::USD);

        let result = cad.checked_add(&usd);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
        assert_eq!(cad.partial_cmp(&usd), None);
    }

    #[test]
    fn test_floor_zero() {
        let m = Money::new(dec!(-5), Currency::CAD);
        assert!(m.floor_zero().is_zero());
        assert_eq!(Money::new(dec!(5), Currency::CAD).floor_zero().amount(), dec!(5));
    }

    #[test]
    fn test_rate_application() {
        let rate = Rate::from_percentage(dec!(5.0));
        let amount = Money::new(dec!(1000.00), Currency::CAD);

        let charge = rate.apply(&amount);
        assert_eq!(charge.amount(), dec!(50.00));
    }

    #[test]
    fn test_rate_rejects_negative() {
        assert!(Rate::try_new(dec!(-0.01)).is_err());
        assert!(Rate::try_new(dec!(0)).is_ok());
    }

    #[test]
    fn test_rate_rejects_above_limit() {
        assert!(Rate::try_new(MAX_RATE).is_ok());
        assert!(matches!(
            Rate::try_new(MAX_RATE + dec!(0.01)),
            Err(MoneyError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_checked_mul_reports_overflow() {
        let m = Money::new(Decimal::MAX, Currency::CAD);
        assert_eq!(m.checked_mul(dec!(2)), Err(MoneyError::Overflow));
        assert_eq!(
            Money::new(dec!(2.5), Currency::CAD).checked_mul(dec!(4)).unwrap().amount(),
            dec!(10)
        );
    }

    #[test]
    fn test_within_limit() {
        assert!(Money::new(MAX_AMOUNT, Currency::CAD).ensure_within_limit().is_ok());
        assert!(Money::new(-MAX_AMOUNT, Currency::CAD).ensure_within_limit().is_ok());
        assert!(matches!(
            Money::new(MAX_AMOUNT + dec!(0.01), Currency::CAD).ensure_within_limit(),
            Err(MoneyError::OutOfRange(_))
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ratio_allocation_sum_equals_original(
            amount in 1i64..1_000_000_000i64,
            ratios in proptest::collection::vec(1u32..10_000u32, 1..12)
        ) {
            let money = Money::from_minor(amount, Currency::CAD);
            let ratios: Vec<Decimal> = ratios.into_iter().map(Decimal::from).collect();
            let allocations = money.allocate_by_ratios(&ratios).unwrap();

            let total: Decimal = allocations.iter().map(|m| m.amount()).sum();
            prop_assert_eq!(total, money.amount());
        }
    }
}
