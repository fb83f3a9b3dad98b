//! Catalog Domain Ports
//!
//! The billing core resolves items, tax rates and provinces through these
//! traits. Adapters may be backed by a database, an external catalog or the
//! in-memory implementations in [`crate::adapters`].
//!
//! ```rust,ignore
//! pub struct InvoiceService {
//!     items: Arc<dyn ItemRepository>,
//!     taxes: Arc<dyn TaxProvider>,
//! }
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, HealthCheckable, ItemId, PortError, ProvinceCode};

use crate::item::Item;
use crate::province::Province;
use crate::tax::AppliedTaxRate;

/// Catalog item lookup and storage
#[async_trait]
pub trait ItemRepository: DomainPort + HealthCheckable {
    /// Retrieves an item by ID, or `PortError::NotFound`
    async fn get_item(&self, id: ItemId) -> Result<Item, PortError>;

    /// Inserts or replaces an item
    async fn save_item(&self, item: Item) -> Result<(), PortError>;
}

/// Resolves the tax rates a province levies on a date
#[async_trait]
pub trait TaxProvider: DomainPort + HealthCheckable {
    /// Returns one applied rate per tax in effect, in registration order.
    /// A province with no tax in effect yields an empty list.
    async fn get_tax_rates(
        &self,
        province: ProvinceCode,
        as_of: NaiveDate,
    ) -> Result<Vec<AppliedTaxRate>, PortError>;
}

/// Province lookup
#[async_trait]
pub trait ProvinceRepository: DomainPort + HealthCheckable {
    async fn get_province(&self, code: ProvinceCode) -> Result<Province, PortError>;
}
