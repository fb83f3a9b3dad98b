//! Core Kernel - Foundational types and utilities for the invoicing system
//!
//! This crate provides the building blocks used across all domain modules:
//! - Money and rate types with exact decimal arithmetic
//! - Effective-date windows for prices and tax rates
//! - Typed identifiers and province codes
//! - The shared error taxonomy and port plumbing

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod region;
pub mod error;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate, MAX_AMOUNT, MAX_QUANTITY, MAX_RATE};
pub use temporal::{EffectivePeriod, Effective, TemporalError, latest_in_effect};
pub use identifiers::{
    InvoiceId, LineItemId, PaymentId, RefundId, DiscountId, SurchargeId,
    ItemId, TaxId, TaxRateId, CustomerId, AddressId,
};
pub use region::{ProvinceCode, RegionError};
pub use error::ErrorKind;
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckable, HealthCheckResult,
};
