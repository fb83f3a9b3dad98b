//! Wired In-Memory Service
//!
//! [`TestWorld`] connects an [`InvoiceService`] to in-memory adapters seeded
//! with the Canadian tax tables, a small catalog and customers in three
//! provinces.

use std::sync::Arc;

use core_kernel::{CustomerId, InvoiceId, ItemId, Money};
use domain_billing::{
    CreateInvoiceRequest, InMemoryInvoiceRepository, InvoiceItemRequest, InvoiceService,
    ProcessPaymentRequest, ProcessRefundRequest, PaymentMethod,
};
use domain_catalog::{
    canadian_taxes, BillingBasis, InMemoryItemRepository, InMemoryProvinceRepository,
    InMemoryTaxProvider, TaxTreatment,
};
use domain_party::InMemoryCustomerRepository;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::builders::{CustomerBuilder, ItemBuilder};
use crate::fixtures::{DateFixtures, MoneyFixtures, ProvinceFixtures};

/// Seeded customers
#[derive(Debug, Clone, Copy)]
pub struct Customers {
    pub bc: CustomerId,
    pub on: CustomerId,
    pub qc: CustomerId,
    pub exempt: CustomerId,
}

/// Seeded catalog items
#[derive(Debug, Clone, Copy)]
pub struct Items {
    /// $100 product
    pub widget: ItemId,
    /// $500 product
    pub server: ItemId,
    /// $150/hour service
    pub consulting: ItemId,
    /// $5 zero-rated product
    pub bread: ItemId,
}

pub struct TestWorld {
    pub service: InvoiceService,
    pub invoices: InMemoryInvoiceRepository,
    pub catalog: InMemoryItemRepository,
    pub taxes: Arc<InMemoryTaxProvider>,
    pub customers: Customers,
    pub items: Items,
}

impl TestWorld {
    pub async fn new() -> Self {
        let seed = canadian_taxes().expect("seed data is valid");

        let bc = CustomerBuilder::new().in_province(ProvinceFixtures::bc()).build();
        let on = CustomerBuilder::new().in_province(ProvinceFixtures::on()).build();
        let qc = CustomerBuilder::new().in_province(ProvinceFixtures::qc()).build();
        let exempt = CustomerBuilder::new()
            .in_province(ProvinceFixtures::bc())
            .exempt("EX-0001")
            .build();
        let customers = Customers {
            bc: bc.id,
            on: on.id,
            qc: qc.id,
            exempt: exempt.id,
        };

        let widget = ItemBuilder::new().build();
        let server = ItemBuilder::new()
            .with_sku("SRV-500")
            .with_name("Rack server")
            .with_price(MoneyFixtures::cad(dec!(500)))
            .build();
        let consulting = ItemBuilder::new()
            .with_sku("CONS-HR")
            .with_name("Consulting")
            .service(BillingBasis::Hourly)
            .with_price(MoneyFixtures::cad(dec!(150)))
            .build();
        let bread = ItemBuilder::new()
            .with_sku("BREAD")
            .with_name("Bread")
            .with_treatment(TaxTreatment::ZeroRated)
            .with_price(MoneyFixtures::cad(dec!(5)))
            .build();
        let items = Items {
            widget: widget.id,
            server: server.id,
            consulting: consulting.id,
            bread: bread.id,
        };

        let invoices = InMemoryInvoiceRepository::new();
        let catalog = InMemoryItemRepository::with_items(vec![widget, server, consulting, bread]).await;
        let taxes = Arc::new(InMemoryTaxProvider::from_seed(&seed));
        let service = InvoiceService::new(
            Arc::new(invoices.clone()),
            Arc::new(InMemoryCustomerRepository::with_customers(vec![bc, on, qc, exempt]).await),
            Arc::new(catalog.clone()),
            taxes.clone(),
            Arc::new(InMemoryProvinceRepository::new(seed.provinces.clone())),
        );

        Self {
            service,
            invoices,
            catalog,
            taxes,
            customers,
            items,
        }
    }

    /// A request for the standard invoice and due dates
    pub fn request(&self, customer: CustomerId, items: &[(ItemId, Decimal)]) -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            customer_id: customer,
            invoice_date: DateFixtures::invoice_date(),
            due_date: Some(DateFixtures::due_date()),
            items: items
                .iter()
                .map(|&(item_id, quantity)| InvoiceItemRequest { item_id, quantity })
                .collect(),
            shipping: None,
            notes: None,
        }
    }

    /// Creates, submits and sends an invoice
    pub async fn sent_invoice(&self, customer: CustomerId, items: &[(ItemId, Decimal)]) -> InvoiceId {
        let id = self
            .service
            .create_invoice(self.request(customer, items))
            .await
            .expect("invoice created");
        self.service.submit_invoice(id).await.expect("invoice submitted");
        self.service.send_invoice(id).await.expect("invoice sent");
        id
    }

    pub fn payment(&self, invoice_id: InvoiceId, amount: Money) -> ProcessPaymentRequest {
        ProcessPaymentRequest {
            invoice_id,
            amount,
            method: PaymentMethod::BankTransfer,
            reference_number: "EFT-TEST".to_string(),
            payment_date: DateFixtures::invoice_date(),
            gateway: None,
        }
    }

    pub fn refund(&self, invoice_id: InvoiceId, amount: Money) -> ProcessRefundRequest {
        ProcessRefundRequest {
            invoice_id,
            original_payment_id: None,
            amount,
            reason: "Customer return".to_string(),
            refund_date: DateFixtures::past_due(),
        }
    }
}
