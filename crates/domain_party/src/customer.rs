//! Customer entity
//!
//! A customer owns its addresses; they are changed only through
//! [`Customer::add_address`] and [`Customer::remove_address`] so the
//! single-primary rule holds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AddressId, CustomerId, ProvinceCode};

use crate::address::{Address, AddressType};
use crate::email::Email;
use crate::error::PartyError;

/// Whether sales tax is charged to the customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaxStatus {
    Taxable,
    /// Exempt, backed by an exemption certificate number
    Exempt { certificate: String },
}

/// A billable customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Option<Email>,
    addresses: Vec<Address>,
    pub tax_status: TaxStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Creates an active, taxable customer with no addresses
    pub fn new(name: impl Into<String>) -> Result<Self, PartyError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PartyError::invalid("Customer name is required"));
        }
        Ok(Self {
            id: CustomerId::new_v7(),
            name,
            email: None,
            addresses: Vec::new(),
            tax_status: TaxStatus::Taxable,
            is_active: true,
            created_at: Utc::now(),
        })
    }

    pub fn with_email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    /// Marks the customer tax exempt
    pub fn with_exemption(mut self, certificate: impl Into<String>) -> Self {
        self.tax_status = TaxStatus::Exempt {
            certificate: certificate.into(),
        };
        self
    }

    pub fn is_tax_exempt(&self) -> bool {
        matches!(self.tax_status, TaxStatus::Exempt { .. })
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Adds an address; a new primary address demotes any existing primary
    /// of the same type
    pub fn add_address(&mut self, address: Address) -> AddressId {
        if address.is_primary {
            for existing in self
                .addresses
                .iter_mut()
                .filter(|a| a.address_type == address.address_type)
            {
                existing.is_primary = false;
            }
        }
        let id = address.id;
        self.addresses.push(address);
        id
    }

    /// Removes an address by ID
    pub fn remove_address(&mut self, id: AddressId) -> Result<Address, PartyError> {
        let index = self
            .addresses
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| PartyError::AddressNotFound(id.to_string()))?;
        Ok(self.addresses.remove(index))
    }

    /// The address invoices are billed to
    ///
    /// Preference order: primary billing address, any billing address,
    /// any primary address, then the first address on file.
    pub fn billing_address(&self) -> Option<&Address> {
        let billing = |a: &&Address| a.address_type == AddressType::Billing;
        self.addresses
            .iter()
            .filter(billing)
            .find(|a| a.is_primary)
            .or_else(|| self.addresses.iter().find(billing))
            .or_else(|| self.addresses.iter().find(|a| a.is_primary))
            .or_else(|| self.addresses.first())
    }

    /// The province used to resolve sales tax
    pub fn billing_province(&self) -> Result<ProvinceCode, PartyError> {
        self.billing_address()
            .map(|a| a.province)
            .ok_or_else(|| PartyError::NoBillingAddress(self.id.to_string()))
    }

    /// Fails if the customer cannot be invoiced
    pub fn ensure_active(&self) -> Result<(), PartyError> {
        if !self.is_active {
            return Err(PartyError::InactiveCustomer(self.id.to_string()));
        }
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
