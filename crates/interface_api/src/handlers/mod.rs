//! Request handlers

pub mod customer;
pub mod health;
pub mod invoice;
pub mod item;
