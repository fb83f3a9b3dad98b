//! Adapters for the billing ports

pub mod in_memory;

pub use in_memory::InMemoryInvoiceRepository;
