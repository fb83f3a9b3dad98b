//! Party Domain
//!
//! Customers an invoice is billed to. The billing core needs three things
//! from a customer: whether it is active, whether it is tax exempt, and the
//! province of its billing address (which selects the tax rates).
//!
//! # Examples
//!
//! ```rust
//! use core_kernel::ProvinceCode;
//! use domain_party::{Address, AddressType, Customer, Email};
//!
//! let mut customer = Customer::new("Northwind Traders").unwrap()
//!     .with_email(Email::parse("billing@northwind.example").unwrap());
//!
//! customer.add_address(
//!     Address::new(
//!         AddressType::Billing,
//!         "100 King St W",
//!         "Toronto",
//!         ProvinceCode::parse("ON").unwrap(),
//!         "M5X 1A9",
//!     )
//!     .primary(),
//! );
//!
//! assert_eq!(customer.billing_province().unwrap().as_str(), "ON");
//! ```

pub mod customer;
pub mod address;
pub mod email;
pub mod error;
pub mod ports;
pub mod adapters;

pub use customer::{Customer, TaxStatus};
pub use address::{Address, AddressType};
pub use email::Email;
pub use error::PartyError;
pub use ports::CustomerRepository;
pub use adapters::InMemoryCustomerRepository;
