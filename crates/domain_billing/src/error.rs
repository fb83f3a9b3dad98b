//! Billing domain errors

use chrono::NaiveDate;
use thiserror::Error;

use core_kernel::{ErrorKind, MoneyError, PortError};
use domain_catalog::CatalogError;
use domain_party::PartyError;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Line item not found on the invoice
    #[error("Line item not found: {0}")]
    LineItemNotFound(String),

    /// Payment not found on the invoice
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    /// Discount not found
    #[error("Discount not found: {0}")]
    DiscountNotFound(String),

    /// Surcharge not found
    #[error("Surcharge not found: {0}")]
    SurchargeNotFound(String),

    /// Quantity must be positive
    #[error("Invalid quantity: {0} (must be > 0)")]
    InvalidQuantity(String),

    /// Amount failed validation
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Request data failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown payment method code
    #[error("Unknown payment method: '{0}'")]
    InvalidPaymentMethod(String),

    /// Discount or surcharge definition failed validation
    #[error("Invalid adjustment: {0}")]
    InvalidAdjustment(String),

    /// The item has no price on the invoice date
    #[error("Item {sku} has no price in effect on {date}")]
    ItemNotPriced { sku: String, date: NaiveDate },

    /// No registered factory accepts the item
    #[error("No line item factory accepts item type {0}")]
    NoFactory(String),

    /// Status transition not allowed by the invoice lifecycle
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    /// The invoice can no longer be edited
    #[error("Invoice cannot be modified in status {0}")]
    InvoiceNotEditable(String),

    /// Refund larger than what remains refundable
    #[error("Refund of {amount} exceeds refundable amount of {refundable}")]
    RefundExceedsRefundable { amount: String, refundable: String },

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Party(#[from] PartyError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl BillingError {
    /// Creates an InvalidOperation error with a message
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        BillingError::InvalidOperation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BillingError::InvoiceNotFound(_)
            | BillingError::LineItemNotFound(_)
            | BillingError::PaymentNotFound(_)
            | BillingError::DiscountNotFound(_)
            | BillingError::SurchargeNotFound(_) => ErrorKind::NotFound,

            BillingError::InvalidQuantity(_)
            | BillingError::InvalidAmount(_)
            | BillingError::InvalidAdjustment(_)
            | BillingError::InvalidPaymentMethod(_)
            | BillingError::InvalidRequest(_)
            | BillingError::ItemNotPriced { .. } => ErrorKind::InvalidArgument,

            BillingError::NoFactory(_)
            | BillingError::InvalidStateTransition { .. }
            | BillingError::InvoiceNotEditable(_)
            | BillingError::RefundExceedsRefundable { .. }
            | BillingError::InvalidOperation(_) => ErrorKind::InvalidOperation,

            BillingError::Catalog(e) => e.kind(),
            BillingError::Party(e) => e.kind(),
            BillingError::Port(e) => e.kind(),
            BillingError::Money(MoneyError::CurrencyMismatch(..)) => ErrorKind::InvalidOperation,
            BillingError::Money(MoneyError::Overflow) => ErrorKind::Internal,
            BillingError::Money(_) => ErrorKind::InvalidArgument,
        }
    }
}
