//! In-memory invoice storage

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, PortError};

use crate::invoice::Invoice;
use crate::ports::InvoiceRepository;

/// Invoice storage backed by a hash map
#[derive(Debug, Default, Clone)]
pub struct InMemoryInvoiceRepository {
    invoices: Arc<RwLock<HashMap<InvoiceId, Invoice>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored invoices
    pub async fn len(&self) -> usize {
        self.invoices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.invoices.read().await.is_empty()
    }
}

impl DomainPort for InMemoryInvoiceRepository {}

#[async_trait]
impl HealthCheckable for InMemoryInvoiceRepository {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("in-memory-invoices")
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        self.invoices
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Invoice", id))
    }

    async fn save_invoice(&self, mut invoice: Invoice) -> Result<Invoice, PortError> {
        let mut invoices = self.invoices.write().await;

        let stored_version = invoices.get(&invoice.id).map(|i| i.version());
        match stored_version {
            Some(stored) if stored != invoice.version() => {
                warn!(
                    invoice_id = %invoice.id,
                    stored,
                    loaded = invoice.version(),
                    "Rejected stale invoice write"
                );
                return Err(PortError::conflict(format!(
                    "invoice {} was modified concurrently (stored version {}, loaded version {})",
                    invoice.id,
                    stored,
                    invoice.version()
                )));
            }
            None if invoice.version() != 0 => {
                return Err(PortError::not_found("Invoice", invoice.id));
            }
            _ => {}
        }

        invoice.set_version(invoice.version() + 1);
        debug!(invoice_id = %invoice.id, version = invoice.version(), "Saved invoice");
        invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn next_invoice_number(&self) -> Result<String, PortError> {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("INV-{next:06}"))
    }
}
