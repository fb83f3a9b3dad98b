//! Line item factories
//!
//! Each item variant has a factory that snapshots a catalog item into a line
//! priced at the invoice date. The registry picks the factory registered for
//! the item's type and falls back to any factory that accepts it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use domain_catalog::{CatalogError, Item, ItemKind, ItemType};

use crate::error::BillingError;
use crate::line_item::{ItemSnapshot, LineItem};

/// A factory for one item variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemFactory {
    Product,
    Service,
}

impl LineItemFactory {
    pub fn item_type(&self) -> ItemType {
        match self {
            LineItemFactory::Product => ItemType::Product,
            LineItemFactory::Service => ItemType::Service,
        }
    }

    pub fn can_create(&self, item: &Item) -> bool {
        item.item_type() == self.item_type()
    }

    /// Creates a line priced at `invoice_date`
    pub fn create(
        &self,
        item: &Item,
        invoice_date: NaiveDate,
        quantity: Decimal,
    ) -> Result<LineItem, BillingError> {
        if !self.can_create(item) {
            return Err(BillingError::NoFactory(format!("{:?}", item.item_type())));
        }
        if quantity <= Decimal::ZERO {
            return Err(BillingError::InvalidQuantity(quantity.to_string()));
        }

        let unit_price = item.unit_price_on(invoice_date).map_err(|e| match e {
            CatalogError::NotPriced { item, date } => BillingError::ItemNotPriced { sku: item, date },
            other => BillingError::Catalog(other),
        })?;

        let unit_type = match (self, &item.kind) {
            (LineItemFactory::Service, ItemKind::Service(_)) => Some(item.unit_label()),
            _ => item.unit_type.clone(),
        };

        let snapshot = ItemSnapshot {
            item_id: item.id,
            sku: item.sku.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            unit_price,
            unit_type,
            item_type: item.item_type(),
            item_category: item.category.clone(),
            tax_code: item.tax_code.clone(),
            tax_treatment: item.tax_treatment,
        };

        debug!(sku = %item.sku, %unit_price, %quantity, "Created line item");
        LineItem::new(snapshot, quantity)
    }
}

/// Factories keyed by item type
#[derive(Debug, Clone, Default)]
pub struct LineItemFactoryRegistry {
    factories: Vec<LineItemFactory>,
}

impl LineItemFactoryRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the product and service factories
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(LineItemFactory::Product);
        registry.register(LineItemFactory::Service);
        registry
    }

    /// Registers a factory, replacing any factory for the same item type
    pub fn register(&mut self, factory: LineItemFactory) {
        self.factories.retain(|f| f.item_type() != factory.item_type());
        self.factories.push(factory);
    }

    pub fn factory_for(&self, item_type: ItemType) -> Option<&LineItemFactory> {
        self.factories.iter().find(|f| f.item_type() == item_type)
    }

    /// Creates a line using the factory for the item's type, or any factory
    /// that accepts the item
    pub fn create(
        &self,
        item: &Item,
        invoice_date: NaiveDate,
        quantity: Decimal,
    ) -> Result<LineItem, BillingError> {
        let factory = self
            .factory_for(item.item_type())
            .filter(|f| f.can_create(item))
            .or_else(|| self.factories.iter().find(|f| f.can_create(item)))
            .ok_or_else(|| BillingError::NoFactory(format!("{:?}", item.item_type())))?;

        factory.create(item, invoice_date, quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, ErrorKind, Money};
    use domain_catalog::BillingBasis;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn product() -> Item {
        Item::product("W-1", "Widget", Currency::CAD)
            .unwrap()
            .with_price(Money::new(dec!(100), Currency::CAD), date(2024, 1, 1), None)
            .unwrap()
    }

    fn service() -> Item {
        Item::service("S-1", "Install", BillingBasis::Hourly, Currency::CAD)
            .unwrap()
            .with_price(Money::new(dec!(85), Currency::CAD), date(2024, 1, 1), None)
            .unwrap()
    }

    #[test]
    fn test_product_factory_snapshots_price() {
        let line = LineItemFactory::Product
            .create(&product(), date(2024, 5, 1), dec!(2))
            .unwrap();

        assert_eq!(line.item.sku, "W-1");
        assert_eq!(line.subtotal().amount(), dec!(200));
        assert_eq!(line.item.item_type, ItemType::Product);
    }

    #[test]
    fn test_service_factory_derives_unit_type() {
        let line = LineItemFactory::Service
            .create(&service(), date(2024, 5, 1), dec!(3))
            .unwrap();
        assert_eq!(line.item.unit_type.as_deref(), Some("hour"));
    }

    #[test]
    fn test_not_priced_is_invalid_argument() {
        let err = LineItemFactory::Product
            .create(&product(), date(2023, 12, 31), dec!(1))
            .unwrap_err();
        assert!(matches!(err, BillingError::ItemNotPriced { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_factory_rejects_other_variant() {
        assert!(!LineItemFactory::Product.can_create(&service()));
        assert!(LineItemFactory::Product
            .create(&service(), date(2024, 5, 1), dec!(1))
            .is_err());
    }

    #[test]
    fn test_registry_dispatches_by_type() {
        let registry = LineItemFactoryRegistry::with_defaults();
        let line = registry.create(&service(), date(2024, 5, 1), dec!(1)).unwrap();
        assert_eq!(line.item.item_type, ItemType::Service);
    }

    #[test]
    fn test_registry_without_matching_factory() {
        let mut registry = LineItemFactoryRegistry::new();
        registry.register(LineItemFactory::Product);

        let err = registry.create(&service(), date(2024, 5, 1), dec!(1)).unwrap_err();
        assert!(matches!(err, BillingError::NoFactory(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_register_replaces_same_type() {
        let mut registry = LineItemFactoryRegistry::with_defaults();
        registry.register(LineItemFactory::Product);
        assert_eq!(registry.factories.len(), 2);
    }
}
