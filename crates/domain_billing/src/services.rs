//! Invoice application service
//!
//! Orchestrates the catalog, customer and tax ports around the invoice
//! aggregate. Every operation loads one invoice, changes a working copy and
//! saves it; nothing is saved when an operation fails.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use core_kernel::{
    Currency, CustomerId, DiscountId, InvoiceId, ItemId, LineItemId, Money, PaymentId,
    PortError, ProvinceCode, RefundId, SurchargeId,
};
use domain_catalog::{AppliedTaxRate, ItemRepository, ProvinceRepository, TaxProvider};
use domain_party::CustomerRepository;

use crate::allocation::create_proportional_refund;
use crate::discount::Discount;
use crate::error::BillingError;
use crate::factory::LineItemFactoryRegistry;
use crate::invoice::Invoice;
use crate::line_item::LineItem;
use crate::payment::{GatewayInfo, Payment, PaymentMethod};
use crate::ports::InvoiceRepository;
use crate::summary::InvoiceSummary;
use crate::surcharge::Surcharge;

/// One requested line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItemRequest {
    pub item_id: ItemId,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingRequest {
    pub cost: Money,
    pub method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    pub customer_id: CustomerId,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<InvoiceItemRequest>,
    pub shipping: Option<ShippingRequest>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessPaymentRequest {
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference_number: String,
    pub payment_date: NaiveDate,
    pub gateway: Option<GatewayInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRefundRequest {
    pub invoice_id: InvoiceId,
    pub original_payment_id: Option<PaymentId>,
    pub amount: Money,
    pub reason: String,
    pub refund_date: NaiveDate,
}

/// What tax applies to new lines on an invoice
struct TaxContext {
    exempt: bool,
    rates: Vec<AppliedTaxRate>,
}

/// Service for creating and settling invoices
pub struct InvoiceService {
    invoices: Arc<dyn InvoiceRepository>,
    customers: Arc<dyn CustomerRepository>,
    items: Arc<dyn ItemRepository>,
    taxes: Arc<dyn TaxProvider>,
    provinces: Arc<dyn ProvinceRepository>,
    factories: LineItemFactoryRegistry,
    currency: Currency,
}

impl InvoiceService {
    /// Creates a service billing in CAD with the default line item factories
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        customers: Arc<dyn CustomerRepository>,
        items: Arc<dyn ItemRepository>,
        taxes: Arc<dyn TaxProvider>,
        provinces: Arc<dyn ProvinceRepository>,
    ) -> Self {
        Self {
            invoices,
            customers,
            items,
            taxes,
            provinces,
            factories: LineItemFactoryRegistry::with_defaults(),
            currency: Currency::CAD,
        }
    }

    /// Replaces the factory registry
    pub fn with_factories(mut self, factories: LineItemFactoryRegistry) -> Self {
        self.factories = factories;
        self
    }

    /// Sets the currency new invoices are issued in
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    // ========================================================================
    // Invoice content
    // ========================================================================

    /// Creates a draft invoice for a customer
    ///
    /// The customer's billing province selects the tax rates, resolved once at
    /// the invoice date and applied to every taxable line.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
    ) -> Result<InvoiceId, BillingError> {
        let customer = self.customers.get_customer(request.customer_id).await?;
        customer.ensure_active()?;
        let province = customer.billing_province()?;
        self.provinces.get_province(province).await?;

        let context = self
            .tax_context(customer.is_tax_exempt(), province, request.invoice_date)
            .await?;

        let number = self.invoices.next_invoice_number().await?;
        let mut invoice = Invoice::new(
            number,
            customer.id,
            province,
            self.currency,
            request.invoice_date,
        );
        invoice.notes = request.notes;
        invoice.set_due_date(request.due_date)?;

        for line in &request.items {
            let line = self
                .build_line(&context, line.item_id, line.quantity, request.invoice_date)
                .await?;
            invoice.add_line_item(line)?;
        }

        if let Some(shipping) = request.shipping {
            invoice.set_shipping(shipping.cost, shipping.method)?;
        }

        let saved = self.invoices.save_invoice(invoice).await?;
        info!(
            invoice_id = %saved.id,
            invoice_number = %saved.invoice_number,
            %province,
            total = %saved.total(),
            "Invoice created"
        );
        Ok(saved.id)
    }

    #[instrument(skip(self))]
    pub async fn add_line_item(
        &self,
        invoice_id: InvoiceId,
        item_id: ItemId,
        quantity: Decimal,
    ) -> Result<LineItemId, BillingError> {
        let mut invoice = self.load(invoice_id).await?;
        let customer = self.customers.get_customer(invoice.customer_id).await?;
        let context = self
            .tax_context(customer.is_tax_exempt(), invoice.province, invoice.invoice_date)
            .await?;

        let line = self
            .build_line(&context, item_id, quantity, invoice.invoice_date)
            .await?;
        let line_id = invoice.add_line_item(line)?;

        self.save(invoice).await?;
        info!(%invoice_id, %line_id, "Line item added");
        Ok(line_id)
    }

    #[instrument(skip(self))]
    pub async fn remove_line_item(
        &self,
        invoice_id: InvoiceId,
        line_item_id: LineItemId,
    ) -> Result<(), BillingError> {
        self.update(invoice_id, |invoice| invoice.remove_line_item(line_item_id).map(|_| ()))
            .await
    }

    #[instrument(skip(self))]
    pub async fn change_line_item_quantity(
        &self,
        invoice_id: InvoiceId,
        line_item_id: LineItemId,
        quantity: Decimal,
    ) -> Result<(), BillingError> {
        self.update(invoice_id, |invoice| {
            invoice.change_line_item_quantity(line_item_id, quantity)
        })
        .await
    }

    #[instrument(skip(self, order))]
    pub async fn reorder_line_items(
        &self,
        invoice_id: InvoiceId,
        order: Vec<LineItemId>,
    ) -> Result<(), BillingError> {
        self.update(invoice_id, |invoice| invoice.reorder_line_items(&order))
            .await
    }

    #[instrument(skip(self, discount), fields(discount = %discount.name))]
    pub async fn add_line_item_discount(
        &self,
        invoice_id: InvoiceId,
        line_item_id: LineItemId,
        discount: Discount,
    ) -> Result<DiscountId, BillingError> {
        self.update(invoice_id, |invoice| {
            invoice.add_line_item_discount(line_item_id, discount)
        })
        .await
    }

    #[instrument(skip(self, discount), fields(discount = %discount.name))]
    pub async fn apply_order_discount(
        &self,
        invoice_id: InvoiceId,
        discount: Discount,
    ) -> Result<DiscountId, BillingError> {
        self.update(invoice_id, |invoice| invoice.apply_order_discount(discount))
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_order_discount(
        &self,
        invoice_id: InvoiceId,
        discount_id: DiscountId,
    ) -> Result<(), BillingError> {
        self.update(invoice_id, |invoice| {
            invoice.remove_order_discount(discount_id).map(|_| ())
        })
        .await
    }

    #[instrument(skip(self, surcharge), fields(surcharge = %surcharge.name))]
    pub async fn add_surcharge(
        &self,
        invoice_id: InvoiceId,
        surcharge: Surcharge,
    ) -> Result<SurchargeId, BillingError> {
        self.update(invoice_id, |invoice| invoice.add_surcharge(surcharge))
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove_surcharge(
        &self,
        invoice_id: InvoiceId,
        surcharge_id: SurchargeId,
    ) -> Result<(), BillingError> {
        self.update(invoice_id, |invoice| {
            invoice.remove_surcharge(surcharge_id).map(|_| ())
        })
        .await
    }

    #[instrument(skip(self, shipping))]
    pub async fn set_shipping(
        &self,
        invoice_id: InvoiceId,
        shipping: ShippingRequest,
    ) -> Result<(), BillingError> {
        self.update(invoice_id, |invoice| {
            invoice.set_shipping(shipping.cost, shipping.method)
        })
        .await
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn submit_invoice(&self, invoice_id: InvoiceId) -> Result<(), BillingError> {
        self.update(invoice_id, Invoice::submit).await
    }

    #[instrument(skip(self))]
    pub async fn send_invoice(&self, invoice_id: InvoiceId) -> Result<(), BillingError> {
        self.update(invoice_id, Invoice::mark_sent).await
    }

    #[instrument(skip(self))]
    pub async fn cancel_invoice(&self, invoice_id: InvoiceId) -> Result<(), BillingError> {
        self.update(invoice_id, Invoice::cancel).await
    }

    #[instrument(skip(self))]
    pub async fn mark_overdue(
        &self,
        invoice_id: InvoiceId,
        today: NaiveDate,
    ) -> Result<(), BillingError> {
        self.update(invoice_id, |invoice| invoice.mark_overdue(today))
            .await
    }

    // ========================================================================
    // Payments and refunds
    // ========================================================================

    #[instrument(skip(self, request), fields(invoice_id = %request.invoice_id, amount = %request.amount))]
    pub async fn process_payment(
        &self,
        request: ProcessPaymentRequest,
    ) -> Result<PaymentId, BillingError> {
        let mut payment = Payment::new(
            request.amount,
            request.method,
            request.reference_number,
            request.payment_date,
        )?;
        if let Some(gateway) = request.gateway {
            payment = payment.with_gateway(gateway.gateway_name, gateway.transaction_id);
        }

        let mut invoice = self.load(request.invoice_id).await?;
        let payment_id = invoice.process_payment(payment)?;
        let saved = self.save(invoice).await?;

        info!(
            %payment_id,
            status = %saved.status(),
            balance = %saved.balance(),
            "Payment processed"
        );
        Ok(payment_id)
    }

    /// Records a refund, spread proportionally over the invoice's charges
    #[instrument(skip(self, request), fields(invoice_id = %request.invoice_id, amount = %request.amount))]
    pub async fn process_refund(
        &self,
        request: ProcessRefundRequest,
    ) -> Result<RefundId, BillingError> {
        let mut invoice = self.load(request.invoice_id).await?;
        let refund = create_proportional_refund(
            &invoice,
            request.amount,
            request.reason,
            request.original_payment_id,
            request.refund_date,
        )?;
        let refund_id = invoice.process_refund(refund)?;
        let saved = self.save(invoice).await?;

        info!(
            %refund_id,
            status = %saved.status(),
            refunded = %saved.total_refunded(),
            "Refund processed"
        );
        Ok(refund_id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn get_invoice(&self, invoice_id: InvoiceId) -> Result<InvoiceSummary, BillingError> {
        let invoice = self.load(invoice_id).await?;
        Ok(InvoiceSummary::from(&invoice))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn load(&self, invoice_id: InvoiceId) -> Result<Invoice, BillingError> {
        self.invoices
            .get_invoice(invoice_id)
            .await
            .map_err(|e| match e {
                PortError::NotFound { .. } => BillingError::InvoiceNotFound(invoice_id.to_string()),
                other => BillingError::Port(other),
            })
    }

    async fn save(&self, invoice: Invoice) -> Result<Invoice, BillingError> {
        Ok(self.invoices.save_invoice(invoice).await?)
    }

    /// Loads, applies a synchronous change and saves
    async fn update<T>(
        &self,
        invoice_id: InvoiceId,
        change: impl FnOnce(&mut Invoice) -> Result<T, BillingError>,
    ) -> Result<T, BillingError> {
        let mut invoice = self.load(invoice_id).await?;
        let result = change(&mut invoice)?;
        let saved = self.save(invoice).await?;
        info!(%invoice_id, status = %saved.status(), version = saved.version(), "Invoice updated");
        Ok(result)
    }

    async fn tax_context(
        &self,
        exempt: bool,
        province: ProvinceCode,
        as_of: NaiveDate,
    ) -> Result<TaxContext, BillingError> {
        let rates = if exempt {
            Vec::new()
        } else {
            self.taxes.get_tax_rates(province, as_of).await?
        };
        Ok(TaxContext { exempt, rates })
    }

    async fn build_line(
        &self,
        context: &TaxContext,
        item_id: ItemId,
        quantity: Decimal,
        invoice_date: NaiveDate,
    ) -> Result<LineItem, BillingError> {
        let item = self.items.get_item(item_id).await?;
        let mut line = self.factories.create(&item, invoice_date, quantity)?;
        if !context.exempt && item.tax_treatment.is_taxable() {
            line.apply_taxes(context.rates.clone())?;
        }
        Ok(line)
    }
}
