//! Invoice DTOs
//!
//! Amounts arrive as bare decimals and are read in the service's currency.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{Currency, CustomerId, ItemId, LineItemId, Money, PaymentId, Rate};
use domain_billing::{
    AdjustmentKind, CreateInvoiceRequest, InvoiceItemRequest, ShippingRequest,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateInvoiceDto {
    pub customer_id: CustomerId,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    #[validate(nested)]
    #[serde(default)]
    pub items: Vec<InvoiceItemDto>,
    #[validate(nested)]
    pub shipping: Option<ShippingDto>,
    #[validate(length(max = 2000, message = "Notes are limited to 2000 characters"))]
    pub notes: Option<String>,
}

impl CreateInvoiceDto {
    pub fn into_request(self, currency: Currency) -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            customer_id: self.customer_id,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            items: self.items.into_iter().map(InvoiceItemDto::into_request).collect(),
            shipping: self.shipping.map(|s| s.into_request(currency)),
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct InvoiceItemDto {
    pub item_id: ItemId,
    #[validate(custom(function = "crate::dto::positive", message = "Quantity must be positive"))]
    pub quantity: Decimal,
}

impl InvoiceItemDto {
    pub fn into_request(self) -> InvoiceItemRequest {
        InvoiceItemRequest {
            item_id: self.item_id,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ShippingDto {
    #[validate(custom(function = "crate::dto::non_negative", message = "Shipping cost cannot be negative"))]
    pub cost: Decimal,
    pub method: Option<String>,
}

impl ShippingDto {
    pub fn into_request(self, currency: Currency) -> ShippingRequest {
        ShippingRequest {
            cost: Money::new(self.cost, currency),
            method: self.method,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct QuantityDto {
    #[validate(custom(function = "crate::dto::positive", message = "Quantity must be positive"))]
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ReorderDto {
    #[validate(length(min = 1, message = "Order must list every line item"))]
    pub line_item_ids: Vec<LineItemId>,
}

/// A discount or surcharge; at least one of `percentage` and `amount` is required
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AdjustmentDto {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    /// Whole percent, e.g. `10` for 10%
    pub percentage: Option<Decimal>,
    pub amount: Option<Decimal>,
    /// Discounts only: the base must reach this amount
    pub minimum_amount: Option<Decimal>,
}

impl AdjustmentDto {
    pub fn kind(&self, currency: Currency) -> Result<AdjustmentKind, ApiError> {
        let rate = self.percentage.map(Rate::from_percentage);
        let amount = self.amount.map(|a| Money::new(a, currency));
        match (rate, amount) {
            (Some(rate), Some(amount)) => Ok(AdjustmentKind::Both { rate, amount }),
            (Some(rate), None) => Ok(AdjustmentKind::Percentage { rate }),
            (None, Some(amount)) => Ok(AdjustmentKind::FixedAmount { amount }),
            (None, None) => Err(ApiError::Validation(
                "either percentage or amount is required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct PaymentDto {
    #[validate(custom(function = "crate::dto::positive", message = "Amount must be positive"))]
    pub amount: Decimal,
    /// Method code such as `credit_card` or `cheque`
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub method: String,
    #[validate(length(max = 100, message = "Reference is limited to 100 characters"))]
    #[serde(default)]
    pub reference_number: String,
    pub payment_date: Option<NaiveDate>,
    pub gateway_name: Option<String>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RefundDto {
    #[validate(custom(function = "crate::dto::positive", message = "Amount must be positive"))]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 500, message = "Reason is required"))]
    pub reason: String,
    pub original_payment_id: Option<PaymentId>,
    pub refund_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OverdueDto {
    /// Defaults to the server's current date
    pub today: Option<NaiveDate>,
}
