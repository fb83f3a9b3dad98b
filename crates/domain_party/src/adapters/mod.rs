//! Adapters for the party ports

pub mod in_memory;

pub use in_memory::InMemoryCustomerRepository;
