//! Effective-dated unit prices

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{latest_in_effect, Effective, EffectivePeriod, Money};

use crate::error::CatalogError;

/// A unit price valid for a date window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPrice {
    pub unit_price: Money,
    pub period: EffectivePeriod,
}

impl Effective for ItemPrice {
    fn period(&self) -> &EffectivePeriod {
        &self.period
    }
}

/// The price history of an item
///
/// Records are kept in insertion order; overlapping windows are allowed and
/// resolved by [`latest_in_effect`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSchedule {
    prices: Vec<ItemPrice>,
}

impl PriceSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a price record
    pub fn add_price(
        &mut self,
        unit_price: Money,
        effective_date: NaiveDate,
        expiration_date: Option<NaiveDate>,
    ) -> Result<&ItemPrice, CatalogError> {
        if unit_price.is_negative() {
            return Err(CatalogError::NegativePrice(unit_price.to_string()));
        }
        unit_price.ensure_within_limit()?;
        let period = EffectivePeriod::new(effective_date, expiration_date)?;
        self.prices.push(ItemPrice { unit_price, period });
        Ok(&self.prices[self.prices.len() - 1])
    }

    /// The record in effect on `date`, if any
    pub fn price_on(&self, date: NaiveDate) -> Option<&ItemPrice> {
        latest_in_effect(&self.prices, date)
    }

    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.price_on(date).is_some()
    }

    /// The unit price in effect on `date`, if any
    pub fn unit_price_on(&self, date: NaiveDate) -> Option<Money> {
        self.price_on(date).map(|p| p.unit_price)
    }

    pub fn prices(&self) -> &[ItemPrice] {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
