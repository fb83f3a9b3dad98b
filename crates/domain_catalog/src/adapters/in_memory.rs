//! In-memory catalog adapters

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, ItemId, PortError, ProvinceCode, TaxId,
};

use crate::item::Item;
use crate::ports::{ItemRepository, ProvinceRepository, TaxProvider};
use crate::province::Province;
use crate::seed::CanadianTaxSeed;
use crate::tax::{AppliedTaxRate, Tax};

/// Item storage backed by a hash map
#[derive(Debug, Default, Clone)]
pub struct InMemoryItemRepository {
    items: Arc<RwLock<HashMap<ItemId, Item>>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the repository
    pub async fn with_items(items: Vec<Item>) -> Self {
        let repo = Self::new();
        {
            let mut guard = repo.items.write().await;
            for item in items {
                guard.insert(item.id, item);
            }
        }
        repo
    }
}

impl DomainPort for InMemoryItemRepository {}

#[async_trait]
impl HealthCheckable for InMemoryItemRepository {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("in-memory-items")
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn get_item(&self, id: ItemId) -> Result<Item, PortError> {
        self.items
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Item", id))
    }

    async fn save_item(&self, item: Item) -> Result<(), PortError> {
        debug!(item_id = %item.id, sku = %item.sku, "Saving item");
        self.items.write().await.insert(item.id, item);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct TaxTables {
    taxes: HashMap<TaxId, Tax>,
    assignments: HashMap<ProvinceCode, Vec<TaxId>>,
}

/// Taxes and the provinces that levy them, held in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaxProvider {
    tables: Arc<RwLock<TaxTables>>,
}

impl InMemoryTaxProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a provider from seed data
    pub fn from_seed(seed: &CanadianTaxSeed) -> Self {
        let mut tables = TaxTables::default();
        for tax in &seed.taxes {
            tables.taxes.insert(tax.id, tax.clone());
        }
        for (province, tax_id) in &seed.assignments {
            tables.assignments.entry(*province).or_default().push(*tax_id);
        }
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Registers a tax and makes the given provinces levy it
    pub async fn register_tax(&self, tax: Tax, provinces: &[ProvinceCode]) -> TaxId {
        let id = tax.id;
        let mut tables = self.tables.write().await;
        tables.taxes.insert(id, tax);
        for province in provinces {
            tables.assignments.entry(*province).or_default().push(id);
        }
        id
    }

    /// Replaces a registered tax, e.g. after adding or deactivating a rate
    pub async fn update_tax(&self, tax: Tax) -> Result<(), PortError> {
        let mut tables = self.tables.write().await;
        match tables.taxes.get_mut(&tax.id) {
            Some(existing) => {
                *existing = tax;
                Ok(())
            }
            None => Err(PortError::not_found("Tax", tax.id)),
        }
    }
}

impl DomainPort for InMemoryTaxProvider {}

#[async_trait]
impl HealthCheckable for InMemoryTaxProvider {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("in-memory-tax-provider")
    }
}

#[async_trait]
impl TaxProvider for InMemoryTaxProvider {
    async fn get_tax_rates(
        &self,
        province: ProvinceCode,
        as_of: NaiveDate,
    ) -> Result<Vec<AppliedTaxRate>, PortError> {
        let tables = self.tables.read().await;
        let rates: Vec<AppliedTaxRate> = tables
            .assignments
            .get(&province)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| tables.taxes.get(id))
                    .filter_map(|tax| tax.applied_rate_on(as_of))
                    .collect()
            })
            .unwrap_or_default();

        debug!(%province, %as_of, count = rates.len(), "Resolved tax rates");
        Ok(rates)
    }
}

/// Province reference data
#[derive(Debug, Default, Clone)]
pub struct InMemoryProvinceRepository {
    provinces: Arc<RwLock<HashMap<ProvinceCode, Province>>>,
}

impl InMemoryProvinceRepository {
    pub fn new(provinces: Vec<Province>) -> Self {
        let map = provinces.into_iter().map(|p| (p.code, p)).collect();
        Self {
            provinces: Arc::new(RwLock::new(map)),
        }
    }
}

impl DomainPort for InMemoryProvinceRepository {}

#[async_trait]
impl HealthCheckable for InMemoryProvinceRepository {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("in-memory-provinces")
    }
}

#[async_trait]
impl ProvinceRepository for InMemoryProvinceRepository {
    async fn get_province(&self, code: ProvinceCode) -> Result<Province, PortError> {
        self.provinces
            .read()
            .await
            .get(&code)
            .cloned()
            .ok_or_else(|| PortError::not_found("Province", code))
    }
}
