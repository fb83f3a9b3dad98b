//! Catalog items
//!
//! An item is a closed set of variants sharing a common core: identity, SKU,
//! naming, tax classification and an effective-dated price schedule. Variant
//! specific data lives in [`ItemKind`].
//!
//! # Item Types
//!
//! - **Product**: a physical good, optionally with manufacturer and weight
//! - **Service**: labour or a subscription billed per hour, per day or at a fixed fee

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, ItemId, Money, MoneyError};

use crate::error::CatalogError;
use crate::pricing::{ItemPrice, PriceSchedule};
use crate::tax::TaxTreatment;

/// Variant tag used to look up line-item factories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Product,
    Service,
}

/// How a service is billed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingBasis {
    Hourly,
    Daily,
    Fixed,
}

impl BillingBasis {
    /// The unit a quantity of this service is expressed in
    pub fn unit_label(&self) -> &'static str {
        match self {
            BillingBasis::Hourly => "hour",
            BillingBasis::Daily => "day",
            BillingBasis::Fixed => "each",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub manufacturer: Option<String>,
    pub weight_kg: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetails {
    pub billing_basis: BillingBasis,
}

/// Variant-specific item data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Product(ProductDetails),
    Service(ServiceDetails),
}

impl ItemKind {
    pub fn item_type(&self) -> ItemType {
        match self {
            ItemKind::Product(_) => ItemType::Product,
            ItemKind::Service(_) => ItemType::Service,
        }
    }
}

/// A sellable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tax_code: Option<String>,
    pub tax_treatment: TaxTreatment,
    pub unit_type: Option<String>,
    pub currency: Currency,
    pub kind: ItemKind,
    prices: PriceSchedule,
}

impl Item {
    /// Creates a product with no prices
    pub fn product(
        sku: impl Into<String>,
        name: impl Into<String>,
        currency: Currency,
    ) -> Result<Self, CatalogError> {
        Self::new(sku.into(), name.into(), currency, ItemKind::Product(ProductDetails::default()))
    }

    /// Creates a service with no prices
    pub fn service(
        sku: impl Into<String>,
        name: impl Into<String>,
        billing_basis: BillingBasis,
        currency: Currency,
    ) -> Result<Self, CatalogError> {
        Self::new(
            sku.into(),
            name.into(),
            currency,
            ItemKind::Service(ServiceDetails { billing_basis }),
        )
    }

    fn new(
        sku: String,
        name: String,
        currency: Currency,
        kind: ItemKind,
    ) -> Result<Self, CatalogError> {
        if sku.trim().is_empty() {
            return Err(CatalogError::InvalidItem("SKU is required".to_string()));
        }
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidItem("Name is required".to_string()));
        }

        Ok(Self {
            id: ItemId::new_v7(),
            sku,
            name,
            description: None,
            category: None,
            tax_code: None,
            tax_treatment: TaxTreatment::Standard,
            unit_type: None,
            currency,
            kind,
            prices: PriceSchedule::new(),
        })
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the tax classification
    pub fn with_tax_treatment(mut self, treatment: TaxTreatment) -> Self {
        self.tax_treatment = treatment;
        self
    }

    /// Sets the tax code reported on invoices
    pub fn with_tax_code(mut self, code: impl Into<String>) -> Self {
        self.tax_code = Some(code.into());
        self
    }

    /// Sets the unit of measure
    pub fn with_unit_type(mut self, unit_type: impl Into<String>) -> Self {
        self.unit_type = Some(unit_type.into());
        self
    }

    /// Sets product details; ignored for services
    pub fn with_product_details(mut self, details: ProductDetails) -> Self {
        if let ItemKind::Product(_) = self.kind {
            self.kind = ItemKind::Product(details);
        }
        self
    }

    /// Adds a price and returns the item, for fixture-style construction
    pub fn with_price(
        mut self,
        unit_price: Money,
        effective_date: NaiveDate,
        expiration_date: Option<NaiveDate>,
    ) -> Result<Self, CatalogError> {
        self.add_price(unit_price, effective_date, expiration_date)?;
        Ok(self)
    }

    pub fn item_type(&self) -> ItemType {
        self.kind.item_type()
    }

    /// The unit of measure, falling back to the service billing basis
    pub fn unit_label(&self) -> String {
        match (&self.unit_type, &self.kind) {
            (Some(unit), _) => unit.clone(),
            (None, ItemKind::Service(details)) => details.billing_basis.unit_label().to_string(),
            (None, ItemKind::Product(_)) => "each".to_string(),
        }
    }

    /// Adds a price record in the item's currency
    pub fn add_price(
        &mut self,
        unit_price: Money,
        effective_date: NaiveDate,
        expiration_date: Option<NaiveDate>,
    ) -> Result<&ItemPrice, CatalogError> {
        if unit_price.currency() != self.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                unit_price.currency().to_string(),
            )
            .into());
        }
        self.prices.add_price(unit_price, effective_date, expiration_date)
    }

    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.prices.is_available_on(date)
    }

    /// The unit price in effect on `date`
    pub fn unit_price_on(&self, date: NaiveDate) -> Result<Money, CatalogError> {
        self.prices
            .unit_price_on(date)
            .ok_or_else(|| CatalogError::NotPriced {
                item: self.sku.clone(),
                date,
            })
    }

    pub fn prices(&self) -> &[ItemPrice] {
        self.prices.prices()
    }
}
