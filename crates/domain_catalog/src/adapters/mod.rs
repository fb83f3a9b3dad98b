//! Adapters for the catalog ports
//!
//! - **InMemoryItemRepository**: item storage keyed by ID
//! - **InMemoryTaxProvider**: taxes and province assignments held in memory
//! - **InMemoryProvinceRepository**: province reference data
//!
//! The server seeds the tax and province adapters from [`crate::seed`].

pub mod in_memory;

pub use in_memory::{InMemoryItemRepository, InMemoryTaxProvider, InMemoryProvinceRepository};
