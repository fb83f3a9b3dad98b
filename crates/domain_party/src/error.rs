//! Party domain errors

use thiserror::Error;

use core_kernel::{ErrorKind, RegionError};

/// Errors that can occur in the party domain
#[derive(Debug, Error)]
pub enum PartyError {
    /// Customer with the given ID was not found
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Invalid customer data provided
    #[error("Invalid customer data: {0}")]
    InvalidData(String),

    /// Email address failed validation
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    /// Address not found on the customer
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// The customer has no address to bill to
    #[error("Customer {0} has no billing address")]
    NoBillingAddress(String),

    /// Cannot bill an inactive customer
    #[error("Customer {0} is inactive")]
    InactiveCustomer(String),

    #[error(transparent)]
    Region(#[from] RegionError),
}

impl PartyError {
    /// Creates a CustomerNotFound error from any ID type
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        PartyError::CustomerNotFound(id.to_string())
    }

    /// Creates an InvalidData error with a message
    pub fn invalid(message: impl Into<String>) -> Self {
        PartyError::InvalidData(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PartyError::CustomerNotFound(_) | PartyError::AddressNotFound(_) => {
                ErrorKind::NotFound
            }
            PartyError::NoBillingAddress(_) | PartyError::InactiveCustomer(_) => {
                ErrorKind::InvalidOperation
            }
            PartyError::InvalidData(_) | PartyError::InvalidEmail(_) | PartyError::Region(_) => {
                ErrorKind::InvalidArgument
            }
        }
    }
}
