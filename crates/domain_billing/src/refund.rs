//! Refunds

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, PaymentId, RefundId};

use crate::allocation::RefundAllocation;
use crate::error::BillingError;

/// Money returned to the customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: RefundId,
    pub amount: Money,
    pub refund_date: NaiveDate,
    pub reason: String,
    /// The payment being returned, when the refund targets one
    pub original_payment_id: Option<PaymentId>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    /// How the amount splits across the invoice's charges
    pub allocation: Option<RefundAllocation>,
}

impl Refund {
    pub fn new(
        amount: Money,
        reason: impl Into<String>,
        refund_date: NaiveDate,
    ) -> Result<Self, BillingError> {
        if !amount.is_positive() {
            return Err(BillingError::InvalidAmount(format!(
                "refund amount must be positive, got {amount}"
            )));
        }
        amount.ensure_within_limit()?;
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(BillingError::InvalidRequest("refund reason is required".to_string()));
        }

        Ok(Self {
            id: RefundId::new_v7(),
            amount,
            refund_date,
            reason,
            original_payment_id: None,
            reference_number: None,
            notes: None,
            allocation: None,
        })
    }

    /// Targets a specific payment
    pub fn for_payment(mut self, payment_id: PaymentId) -> Self {
        self.original_payment_id = Some(payment_id);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference_number = Some(reference.into());
        self
    }

    pub fn with_allocation(mut self, allocation: RefundAllocation) -> Self {
        self.allocation = Some(allocation);
        self
    }
}
