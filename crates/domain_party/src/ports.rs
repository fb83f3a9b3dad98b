//! Party Domain Ports
//!
//! The billing service reads customers through [`CustomerRepository`]; the
//! storage behind it is an adapter concern.

use async_trait::async_trait;

use core_kernel::{CustomerId, DomainPort, HealthCheckable, PortError};

use crate::customer::Customer;

/// Customer lookup and storage
#[async_trait]
pub trait CustomerRepository: DomainPort + HealthCheckable {
    /// Retrieves a customer by ID, or `PortError::NotFound`
    async fn get_customer(&self, id: CustomerId) -> Result<Customer, PortError>;

    /// Inserts or replaces a customer
    async fn save_customer(&self, customer: Customer) -> Result<(), PortError>;
}
