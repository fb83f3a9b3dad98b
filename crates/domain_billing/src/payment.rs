//! Payments
//!
//! Payments are recorded against an invoice and settle immediately when the
//! invoice accepts them; there is no gateway round-trip.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Money, PaymentId};

use crate::error::BillingError;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    /// Cheque
    Cheque,
    CreditCard,
    DebitCard,
    BankTransfer,
    DigitalWallet,
}

impl PaymentMethod {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::DigitalWallet => "digital_wallet",
        }
    }

    /// Parses a method code, case-insensitive
    pub fn parse(code: &str) -> Result<Self, BillingError> {
        match code.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "cheque" | "check" => Ok(PaymentMethod::Cheque),
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "digital_wallet" => Ok(PaymentMethod::DigitalWallet),
            _ => Err(BillingError::InvalidPaymentMethod(code.to_string())),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PaymentMethod {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::parse(s)
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment is being processed
    Pending,
    /// Payment completed successfully
    Completed,
    /// Payment failed
    Failed,
    /// Cancelled before settlement
    Cancelled,
    /// Fully refunded
    Refunded,
    /// Partially refunded
    PartiallyRefunded,
}

/// Card or wallet processor details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayInfo {
    pub gateway_name: String,
    pub transaction_id: String,
}

/// A payment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    status: PaymentStatus,
    /// External reference (bank ref, cheque number)
    pub reference_number: String,
    pub gateway: Option<GatewayInfo>,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Creates a pending payment
    pub fn new(
        amount: Money,
        method: PaymentMethod,
        reference_number: impl Into<String>,
        payment_date: NaiveDate,
    ) -> Result<Self, BillingError> {
        if !amount.is_positive() {
            return Err(BillingError::InvalidAmount(format!(
                "payment amount must be positive, got {amount}"
            )));
        }
        amount.ensure_within_limit()?;

        Ok(Self {
            id: PaymentId::new_v7(),
            amount,
            payment_date,
            method,
            status: PaymentStatus::Pending,
            reference_number: reference_number.into(),
            gateway: None,
            notes: None,
            completed_at: None,
        })
    }

    /// Sets the processor details
    pub fn with_gateway(
        mut self,
        gateway_name: impl Into<String>,
        transaction_id: impl Into<String>,
    ) -> Self {
        self.gateway = Some(GatewayInfo {
            gateway_name: gateway_name.into(),
            transaction_id: transaction_id.into(),
        });
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    fn ensure_pending(&self, action: &str) -> Result<(), BillingError> {
        if self.status != PaymentStatus::Pending {
            return Err(BillingError::invalid_operation(format!(
                "cannot {action} payment {} in status {:?}",
                self.id, self.status
            )));
        }
        Ok(())
    }

    /// Marks the payment as completed
    pub fn complete(&mut self) -> Result<(), BillingError> {
        self.ensure_pending("complete")?;
        self.status = PaymentStatus::Completed;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Marks the payment as failed
    pub fn fail(&mut self, reason: &str) -> Result<(), BillingError> {
        self.ensure_pending("fail")?;
        self.status = PaymentStatus::Failed;
        self.notes = Some(reason.to_string());
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), BillingError> {
        self.ensure_pending("cancel")?;
        self.status = PaymentStatus::Cancelled;
        Ok(())
    }

    /// Records that part or all of this payment was refunded
    pub fn record_refund(&mut self, fully: bool) -> Result<(), BillingError> {
        if !self.is_settled() {
            return Err(BillingError::invalid_operation(format!(
                "cannot refund unsettled payment {}",
                self.id
            )));
        }
        self.status = if fully {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::PartiallyRefunded
        };
        Ok(())
    }

    /// Returns true once the money has been received
    pub fn is_settled(&self) -> bool {
        matches!(
            self.status,
            PaymentStatus::Completed | PaymentStatus::PartiallyRefunded | PaymentStatus::Refunded
        )
    }
}
