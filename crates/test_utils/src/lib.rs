//! Shared test support for the invoicing crates
//!
//! - `fixtures`: canned money, dates, provinces and tax rates
//! - `builders`: customers, catalog items and invoices with sensible defaults
//! - `world`: an [`InvoiceService`](domain_billing::InvoiceService) wired to
//!   seeded in-memory adapters
//! - `assertions`: money and invoice-identity checks
//! - `generators`: proptest strategies

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;
pub mod world;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
pub use world::*;
