//! Invoice line items
//!
//! A line item is created from a snapshot of a catalog item taken at the
//! invoice date. Later catalog changes never reach an existing line.
//!
//! All amounts are exact; nothing is rounded here. For every line
//! `total() == subtotal() - discount_total() + tax_total()`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, DiscountId, ItemId, LineItemId, Money, Rate, TaxId, MAX_QUANTITY};
use domain_catalog::{AppliedTaxRate, ItemType, TaxTreatment};

use crate::discount::{Discount, DiscountScope};
use crate::error::BillingError;

/// The catalog data a line was priced from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub item_id: ItemId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Money,
    pub unit_type: Option<String>,
    pub item_type: ItemType,
    pub item_category: Option<String>,
    pub tax_code: Option<String>,
    pub tax_treatment: TaxTreatment,
}

/// Tax charged by one rate on a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLine {
    pub tax_id: TaxId,
    pub tax_code: String,
    pub tax_name: String,
    pub rate: Rate,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub item: ItemSnapshot,
    quantity: Decimal,
    applied_taxes: Vec<AppliedTaxRate>,
    discounts: Vec<Discount>,
    sort_order: u32,
}

fn ensure_valid_quantity(quantity: Decimal) -> Result<(), BillingError> {
    if quantity <= Decimal::ZERO || quantity > MAX_QUANTITY {
        return Err(BillingError::InvalidQuantity(quantity.to_string()));
    }
    Ok(())
}

impl LineItem {
    /// Creates an untaxed, undiscounted line
    ///
    /// The quantity must be in (0, [`MAX_QUANTITY`]] and the unit price
    /// non-negative and within [`core_kernel::MAX_AMOUNT`].
    pub fn new(item: ItemSnapshot, quantity: Decimal) -> Result<Self, BillingError> {
        ensure_valid_quantity(quantity)?;
        if item.unit_price.is_negative() {
            return Err(BillingError::InvalidAmount(format!(
                "unit price cannot be negative, got {}",
                item.unit_price
            )));
        }
        item.unit_price.ensure_within_limit()?;
        Ok(Self {
            id: LineItemId::new_v7(),
            item,
            quantity,
            applied_taxes: Vec::new(),
            discounts: Vec::new(),
            sort_order: 0,
        })
    }

    pub fn currency(&self) -> Currency {
        self.item.unit_price.currency()
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn sort_order(&self) -> u32 {
        self.sort_order
    }

    pub(crate) fn set_sort_order(&mut self, sort_order: u32) {
        self.sort_order = sort_order;
    }

    pub fn applied_taxes(&self) -> &[AppliedTaxRate] {
        &self.applied_taxes
    }

    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    pub fn change_quantity(&mut self, quantity: Decimal) -> Result<(), BillingError> {
        ensure_valid_quantity(quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    /// Replaces the applied tax rates; the unit price is untouched
    pub fn apply_taxes(&mut self, rates: Vec<AppliedTaxRate>) -> Result<(), BillingError> {
        for applied in &rates {
            Rate::try_new(applied.rate.as_decimal())?;
        }
        self.applied_taxes = rates;
        Ok(())
    }

    /// Re-checks the inputs the arithmetic depends on
    pub(crate) fn ensure_within_limits(&self) -> Result<(), BillingError> {
        ensure_valid_quantity(self.quantity)?;
        self.item.unit_price.ensure_within_limit()?;
        for applied in &self.applied_taxes {
            Rate::try_new(applied.rate.as_decimal())?;
        }
        Ok(())
    }

    /// Attaches a per-item discount
    pub fn add_discount(&mut self, discount: Discount) -> Result<DiscountId, BillingError> {
        if discount.scope != DiscountScope::PerItem {
            return Err(BillingError::InvalidAdjustment(format!(
                "discount '{}' is not a per-item discount",
                discount.name
            )));
        }
        discount.kind.ensure_currency(self.currency())?;
        let id = discount.id;
        self.discounts.push(discount);
        Ok(id)
    }

    pub fn remove_discount(&mut self, discount_id: DiscountId) -> Result<Discount, BillingError> {
        let index = self
            .discounts
            .iter()
            .position(|d| d.id == discount_id)
            .ok_or_else(|| BillingError::DiscountNotFound(discount_id.to_string()))?;
        Ok(self.discounts.remove(index))
    }

    /// Unit price × quantity
    pub fn subtotal(&self) -> Money {
        self.item.unit_price * self.quantity
    }

    /// Sum of active discounts on the subtotal, capped at the subtotal
    pub fn discount_total(&self) -> Money {
        let subtotal = self.subtotal();
        let total = self
            .discounts
            .iter()
            .fold(Money::zero(self.currency()), |acc, d| acc + d.amount_for(subtotal));
        if total.amount() > subtotal.amount() {
            subtotal
        } else {
            total
        }
    }

    /// Subtotal after discounts, never negative
    pub fn discounted_base(&self) -> Money {
        (self.subtotal() - self.discount_total()).floor_zero()
    }

    /// Per-rate tax amounts, each on the same discounted base
    pub fn tax_breakdown(&self) -> Vec<TaxLine> {
        let base = self.discounted_base();
        self.applied_taxes
            .iter()
            .map(|t| TaxLine {
                tax_id: t.tax_id,
                tax_code: t.tax_code.clone(),
                tax_name: t.tax_name.clone(),
                rate: t.rate,
                amount: t.rate.apply(&base),
            })
            .collect()
    }

    pub fn tax_total(&self) -> Money {
        let base = self.discounted_base();
        self.applied_taxes
            .iter()
            .fold(Money::zero(self.currency()), |acc, t| acc + t.rate.apply(&base))
    }

    pub fn total(&self) -> Money {
        self.discounted_base() + self.tax_total()
    }
}
