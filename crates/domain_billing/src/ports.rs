//! Billing Domain Ports
//!
//! Invoices are persisted through [`InvoiceRepository`]. Each invoice is a
//! unit of consistency: the service loads it, changes a copy and saves the
//! copy back. Concurrent writers are detected by the invoice version.

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, InvoiceId, PortError};

use crate::invoice::Invoice;

/// Invoice storage with optimistic concurrency
#[async_trait]
pub trait InvoiceRepository: DomainPort + HealthCheckable {
    /// Retrieves an invoice by ID, or `PortError::NotFound`
    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    /// Stores an invoice and returns the stored copy with its new version
    ///
    /// Fails with `PortError::Conflict` when the stored version differs from
    /// the version the caller loaded.
    async fn save_invoice(&self, invoice: Invoice) -> Result<Invoice, PortError>;

    /// Allocates the next human-readable invoice number
    async fn next_invoice_number(&self) -> Result<String, PortError>;
}
