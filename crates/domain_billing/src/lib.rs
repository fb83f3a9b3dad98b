//! Billing Domain - Invoices, line items, payments and refunds
//!
//! This crate computes everything an invoice owes and has been paid:
//!
//! - **Line items** snapshot a catalog item at its effective price and carry
//!   the tax rates that applied on the invoice date
//! - **Adjustments** (discounts and surcharges) are percentage, fixed or both
//! - **Totals** are always derived from the invoice's collections, never stored
//! - **Payments and refunds** move the invoice through its lifecycle
//!
//! # Invoice Lifecycle
//!
//! ```text
//! Draft ──► Pending ──► Sent ──► Overdue
//!   │          │         │  ╲       │
//!   ▼          ▼         ▼   ╲      ▼
//! Cancelled ◄──┴─────────┘    ──► Paid ──► PartiallyRefunded ──► Refunded
//! ```
//!
//! Refunds may also move a Sent or Overdue invoice that holds payments to
//! PartiallyRefunded or Refunded.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use core_kernel::{Currency, CustomerId, Money, ProvinceCode};
//! use domain_billing::{Invoice, LineItem, ItemSnapshot};
//! use domain_catalog::{ItemType, TaxTreatment};
//! use rust_decimal_macros::dec;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let mut invoice = Invoice::new(
//!     "INV-000001",
//!     CustomerId::new(),
//!     ProvinceCode::parse("ON").unwrap(),
//!     Currency::CAD,
//!     date,
//! );
//!
//! let snapshot = ItemSnapshot {
//!     item_id: core_kernel::ItemId::new(),
//!     sku: "W-1".into(),
//!     name: "Widget".into(),
//!     description: None,
//!     unit_price: Money::new(dec!(100), Currency::CAD),
//!     unit_type: None,
//!     item_type: ItemType::Product,
//!     item_category: None,
//!     tax_code: None,
//!     tax_treatment: TaxTreatment::Standard,
//! };
//! invoice.add_line_item(LineItem::new(snapshot, dec!(2)).unwrap()).unwrap();
//!
//! assert_eq!(invoice.subtotal(), Money::new(dec!(200), Currency::CAD));
//! ```

pub mod adjustment;
pub mod discount;
pub mod surcharge;
pub mod line_item;
pub mod factory;
pub mod invoice;
pub mod payment;
pub mod refund;
pub mod allocation;
pub mod summary;
pub mod error;
pub mod ports;
pub mod adapters;
pub mod services;

pub use adjustment::AdjustmentKind;
pub use discount::{Discount, DiscountScope};
pub use surcharge::Surcharge;
pub use line_item::{ItemSnapshot, LineItem, TaxLine};
pub use factory::{LineItemFactory, LineItemFactoryRegistry};
pub use invoice::{Invoice, InvoiceStatus};
pub use payment::{GatewayInfo, Payment, PaymentMethod, PaymentStatus};
pub use refund::Refund;
pub use allocation::{create_proportional_refund, LineRefundShare, RefundAllocation};
pub use summary::{InvoiceSummary, LineItemSummary, PaymentSummary, RefundSummary};
pub use error::BillingError;
pub use ports::InvoiceRepository;
pub use adapters::InMemoryInvoiceRepository;
pub use services::{
    CreateInvoiceRequest, InvoiceItemRequest, InvoiceService, ProcessPaymentRequest,
    ProcessRefundRequest, ShippingRequest,
};
