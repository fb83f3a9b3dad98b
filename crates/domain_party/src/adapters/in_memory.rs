//! In-memory customer storage

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{CustomerId, DomainPort, HealthCheckResult, HealthCheckable, PortError};

use crate::customer::Customer;
use crate::ports::CustomerRepository;

/// Customer storage backed by a hash map
#[derive(Debug, Default, Clone)]
pub struct InMemoryCustomerRepository {
    customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the repository
    pub async fn with_customers(customers: Vec<Customer>) -> Self {
        let repo = Self::new();
        {
            let mut guard = repo.customers.write().await;
            for customer in customers {
                guard.insert(customer.id, customer);
            }
        }
        repo
    }
}

impl DomainPort for InMemoryCustomerRepository {}

#[async_trait]
impl HealthCheckable for InMemoryCustomerRepository {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("in-memory-customers")
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn get_customer(&self, id: CustomerId) -> Result<Customer, PortError> {
        self.customers
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Customer", id))
    }

    async fn save_customer(&self, customer: Customer) -> Result<(), PortError> {
        debug!(customer_id = %customer.id, "Saving customer");
        self.customers.write().await.insert(customer.id, customer);
        Ok(())
    }
}
