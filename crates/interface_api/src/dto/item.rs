//! Catalog item DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ItemId, Money};
use domain_catalog::{BillingBasis, Item, ItemType, TaxTreatment};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 64, message = "SKU is required"))]
    pub sku: String,
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub item_type: ItemType,
    /// Required for services
    pub billing_basis: Option<BillingBasis>,
    #[serde(default)]
    pub tax_treatment: TaxTreatment,
    #[validate(custom(function = "crate::dto::non_negative"))]
    pub unit_price: Decimal,
    pub effective_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PriceResponse {
    pub unit_price: Money,
    pub effective_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ItemResponse {
    pub id: ItemId,
    pub sku: String,
    pub name: String,
    pub item_type: ItemType,
    pub unit: String,
    pub tax_treatment: TaxTreatment,
    pub prices: Vec<PriceResponse>,
}

impl From<&Item> for ItemResponse {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            sku: item.sku.clone(),
            name: item.name.clone(),
            item_type: item.item_type(),
            unit: item.unit_label(),
            tax_treatment: item.tax_treatment,
            prices: item
                .prices()
                .iter()
                .map(|p| PriceResponse {
                    unit_price: p.unit_price,
                    effective_date: p.period.effective_date,
                    expiration_date: p.period.expiration_date,
                })
                .collect(),
        }
    }
}
