//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults. Tests
//! specify only the relevant fields and take defaults for everything else.

use chrono::NaiveDate;
use core_kernel::{Currency, CustomerId, ItemId, Money, ProvinceCode};
use domain_billing::{Invoice, ItemSnapshot, LineItem};
use domain_catalog::{AppliedTaxRate, BillingBasis, Item, ItemType, TaxTreatment};
use domain_party::{Address, AddressType, Customer};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{DateFixtures, IdFixtures, MoneyFixtures, ProvinceFixtures};

/// Builder for customers with a primary billing address
pub struct CustomerBuilder {
    name: String,
    province: ProvinceCode,
    exemption: Option<String>,
}

impl Default for CustomerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerBuilder {
    pub fn new() -> Self {
        Self {
            name: IdFixtures::company_name(),
            province: ProvinceFixtures::on(),
            exemption: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn in_province(mut self, province: ProvinceCode) -> Self {
        self.province = province;
        self
    }

    /// Makes the customer tax exempt
    pub fn exempt(mut self, certificate: impl Into<String>) -> Self {
        self.exemption = Some(certificate.into());
        self
    }

    pub fn build(self) -> Customer {
        let mut customer = Customer::new(self.name).expect("valid customer name");
        if let Some(certificate) = self.exemption {
            customer = customer.with_exemption(certificate);
        }
        customer.add_address(
            Address::new(
                AddressType::Billing,
                "1 Test Street",
                "Testville",
                self.province,
                "A1A 1A1",
            )
            .primary(),
        );
        customer
    }
}

/// Builder for catalog items with one open-ended price
pub struct ItemBuilder {
    sku: String,
    name: String,
    billing_basis: Option<BillingBasis>,
    treatment: TaxTreatment,
    price: Money,
    effective_date: NaiveDate,
    expiration_date: Option<NaiveDate>,
}

impl Default for ItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemBuilder {
    pub fn new() -> Self {
        Self {
            sku: "WID-100".to_string(),
            name: "Widget".to_string(),
            billing_basis: None,
            treatment: TaxTreatment::Standard,
            price: MoneyFixtures::cad_100(),
            effective_date: DateFixtures::catalog_start(),
            expiration_date: None,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = sku.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builds a service billed on the given basis instead of a product
    pub fn service(mut self, basis: BillingBasis) -> Self {
        self.billing_basis = Some(basis);
        self
    }

    pub fn with_treatment(mut self, treatment: TaxTreatment) -> Self {
        self.treatment = treatment;
        self
    }

    pub fn with_price(mut self, price: Money) -> Self {
        self.price = price;
        self
    }

    pub fn effective(mut self, from: NaiveDate, until: Option<NaiveDate>) -> Self {
        self.effective_date = from;
        self.expiration_date = until;
        self
    }

    pub fn build(self) -> Item {
        let currency = self.price.currency();
        let item = match self.billing_basis {
            Some(basis) => Item::service(self.sku, self.name, basis, currency),
            None => Item::product(self.sku, self.name, currency),
        }
        .expect("valid item");

        item.with_tax_treatment(self.treatment)
            .with_price(self.price, self.effective_date, self.expiration_date)
            .expect("valid price")
    }
}

/// Builder for invoices assembled directly from line items
///
/// Bypasses the service, so tests can exercise the aggregate on its own.
pub struct InvoiceBuilder {
    province: ProvinceCode,
    currency: Currency,
    invoice_date: NaiveDate,
    due_date: Option<NaiveDate>,
    lines: Vec<(Money, Decimal)>,
    taxes: Vec<AppliedTaxRate>,
    shipping: Option<Money>,
    send: bool,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    pub fn new() -> Self {
        Self {
            province: ProvinceFixtures::on(),
            currency: Currency::CAD,
            invoice_date: DateFixtures::invoice_date(),
            due_date: Some(DateFixtures::due_date()),
            lines: Vec::new(),
            taxes: Vec::new(),
            shipping: None,
            send: false,
        }
    }

    pub fn in_province(mut self, province: ProvinceCode) -> Self {
        self.province = province;
        self
    }

    /// Adds a product line at the given unit price
    pub fn with_line(mut self, unit_price: Money, quantity: Decimal) -> Self {
        self.lines.push((unit_price, quantity));
        self
    }

    /// Tax rates applied to every line
    pub fn with_taxes(mut self, taxes: Vec<AppliedTaxRate>) -> Self {
        self.taxes = taxes;
        self
    }

    pub fn with_shipping(mut self, cost: Money) -> Self {
        self.shipping = Some(cost);
        self
    }

    /// Submits and sends the invoice so it accepts payments
    pub fn sent(mut self) -> Self {
        self.send = true;
        self
    }

    pub fn build(self) -> Invoice {
        let mut invoice = Invoice::new(
            "INV-TEST-0001",
            CustomerId::new(),
            self.province,
            self.currency,
            self.invoice_date,
        );
        invoice.set_due_date(self.due_date).expect("valid due date");

        let lines = if self.lines.is_empty() {
            vec![(MoneyFixtures::cad_100(), dec!(1))]
        } else {
            self.lines
        };
        for (index, (unit_price, quantity)) in lines.into_iter().enumerate() {
            let mut line = LineItem::new(snapshot(index, unit_price), quantity).expect("valid line");
            line.apply_taxes(self.taxes.clone()).expect("valid tax rates");
            invoice.add_line_item(line).expect("line in invoice currency");
        }

        if let Some(cost) = self.shipping {
            invoice.set_shipping(cost, Some("Ground".to_string())).expect("valid shipping");
        }

        if self.send {
            invoice.submit().expect("submittable invoice");
            invoice.mark_sent().expect("sendable invoice");
        }
        invoice
    }
}

/// A product snapshot as a line item would capture it
pub fn snapshot(index: usize, unit_price: Money) -> ItemSnapshot {
    ItemSnapshot {
        item_id: ItemId::new(),
        sku: format!("SKU-{index:03}"),
        name: format!("Item {index}"),
        description: None,
        unit_price,
        unit_type: None,
        item_type: ItemType::Product,
        item_category: None,
        tax_code: None,
        tax_treatment: TaxTreatment::Standard,
    }
}
