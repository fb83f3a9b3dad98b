//! Catalog Domain
//!
//! This crate owns everything an invoice line is priced and taxed from:
//!
//! - **Items**: a closed set of variants (`Product`, `Service`) sharing SKU,
//!   naming, tax classification and an effective-dated price schedule
//! - **Pricing**: time-bounded unit prices resolved for an invoice date
//! - **Taxes**: named taxes (GST, PST, HST, QST) with effective-dated rates
//! - **Provinces**: the jurisdictions tax rates are looked up for
//!
//! # Price resolution
//!
//! A price record is in effect on a date when
//! `effective_date <= date <= expiration_date` (open-ended when no expiration).
//! When several records are in effect, the one with the latest effective date
//! wins; records sharing an effective date resolve to the one added last.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use core_kernel::{Currency, Money};
//! use domain_catalog::Item;
//! use rust_decimal_macros::dec;
//!
//! let mut item = Item::product("WIDGET-1", "Widget", Currency::CAD).unwrap();
//! let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let jul = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
//! item.add_price(Money::new(dec!(100), Currency::CAD), jan, None).unwrap();
//! item.add_price(Money::new(dec!(110), Currency::CAD), jul, None).unwrap();
//!
//! let aug = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
//! assert_eq!(item.unit_price_on(aug).unwrap().amount(), dec!(110));
//! ```

pub mod item;
pub mod pricing;
pub mod tax;
pub mod province;
pub mod seed;
pub mod error;
pub mod ports;
pub mod adapters;

pub use item::{Item, ItemKind, ItemType, ProductDetails, ServiceDetails, BillingBasis};
pub use pricing::{ItemPrice, PriceSchedule};
pub use tax::{Tax, TaxRate, TaxTreatment, AppliedTaxRate};
pub use province::Province;
pub use seed::{canadian_provinces, canadian_taxes, CanadianTaxSeed};
pub use error::CatalogError;
pub use ports::{ItemRepository, TaxProvider, ProvinceRepository};
pub use adapters::{InMemoryItemRepository, InMemoryTaxProvider, InMemoryProvinceRepository};
