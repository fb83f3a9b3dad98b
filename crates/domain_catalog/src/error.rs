//! Catalog domain errors

use chrono::NaiveDate;
use thiserror::Error;

use core_kernel::{ErrorKind, MoneyError, RegionError, TemporalError};

/// Errors that can occur in the catalog domain
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Item not found
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Item data failed validation
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Unit price below zero
    #[error("Unit price out of range: {0} (must be >= 0)")]
    NegativePrice(String),

    /// No price record covers the requested date
    #[error("Item {item} is not priced on {date}")]
    NotPriced { item: String, date: NaiveDate },

    /// Tax rate below zero
    #[error("Tax rate out of range: {0} (must be >= 0)")]
    NegativeTaxRate(String),

    /// Tax rate not found on a tax
    #[error("Tax rate not found: {0}")]
    TaxRateNotFound(String),

    /// Province not known to the catalog
    #[error("Province not found: {0}")]
    ProvinceNotFound(String),

    /// Built-in reference data is malformed
    #[error("Invalid reference data: {0}")]
    InvalidReferenceData(String),

    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::ItemNotFound(_)
            | CatalogError::TaxRateNotFound(_)
            | CatalogError::ProvinceNotFound(_) => ErrorKind::NotFound,
            CatalogError::NotPriced { .. } => ErrorKind::InvalidOperation,
            CatalogError::Money(MoneyError::CurrencyMismatch(..)) => ErrorKind::InvalidOperation,
            CatalogError::Money(MoneyError::Overflow)
            | CatalogError::InvalidReferenceData(_) => ErrorKind::Internal,
            CatalogError::InvalidItem(_)
            | CatalogError::NegativePrice(_)
            | CatalogError::NegativeTaxRate(_)
            | CatalogError::Temporal(_)
            | CatalogError::Region(_)
            | CatalogError::Money(_) => ErrorKind::InvalidArgument,
        }
    }
}
