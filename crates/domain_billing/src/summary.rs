//! Read model returned by the invoice service

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{
    Currency, CustomerId, InvoiceId, ItemId, LineItemId, Money, PaymentId, ProvinceCode, RefundId,
};

use crate::allocation::RefundAllocation;
use crate::invoice::{Invoice, InvoiceStatus};
use crate::line_item::{LineItem, TaxLine};
use crate::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::refund::Refund;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemSummary {
    pub id: LineItemId,
    pub item_id: ItemId,
    pub sku: String,
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Money,
    pub unit_type: Option<String>,
    pub subtotal: Money,
    pub discount_total: Money,
    pub tax_total: Money,
    pub total: Money,
    pub taxes: Vec<TaxLine>,
}

impl From<&LineItem> for LineItemSummary {
    fn from(line: &LineItem) -> Self {
        Self {
            id: line.id,
            item_id: line.item.item_id,
            sku: line.item.sku.clone(),
            name: line.item.name.clone(),
            quantity: line.quantity(),
            unit_price: line.item.unit_price,
            unit_type: line.item.unit_type.clone(),
            subtotal: line.subtotal(),
            discount_total: line.discount_total(),
            tax_total: line.tax_total(),
            total: line.total(),
            taxes: line.tax_breakdown(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub id: PaymentId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub payment_date: NaiveDate,
    pub reference_number: String,
}

impl From<&Payment> for PaymentSummary {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            amount: payment.amount,
            method: payment.method,
            status: payment.status(),
            payment_date: payment.payment_date,
            reference_number: payment.reference_number.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundSummary {
    pub id: RefundId,
    pub amount: Money,
    pub reason: String,
    pub refund_date: NaiveDate,
    pub original_payment_id: Option<PaymentId>,
    pub allocation: Option<RefundAllocation>,
}

impl From<&Refund> for RefundSummary {
    fn from(refund: &Refund) -> Self {
        Self {
            id: refund.id,
            amount: refund.amount,
            reason: refund.reason.clone(),
            refund_date: refund.refund_date,
            original_payment_id: refund.original_payment_id,
            allocation: refund.allocation.clone(),
        }
    }
}

/// An invoice with every derived total computed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub customer_id: CustomerId,
    pub province: ProvinceCode,
    pub currency: Currency,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub subtotal: Money,
    pub total_tax: Money,
    pub total_discounts: Money,
    pub total_surcharges: Money,
    pub shipping_cost: Money,
    pub total: Money,
    pub total_paid: Money,
    pub total_refunded: Money,
    pub balance: Money,
    pub amount_due: Money,
    pub items: Vec<LineItemSummary>,
    pub payments: Vec<PaymentSummary>,
    pub refunds: Vec<RefundSummary>,
    pub version: u64,
}

impl From<&Invoice> for InvoiceSummary {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id,
            invoice_number: invoice.invoice_number.clone(),
            customer_id: invoice.customer_id,
            province: invoice.province,
            currency: invoice.currency,
            invoice_date: invoice.invoice_date,
            due_date: invoice.due_date(),
            status: invoice.status(),
            subtotal: invoice.subtotal(),
            total_tax: invoice.total_tax(),
            total_discounts: invoice.total_discounts(),
            total_surcharges: invoice.total_surcharges(),
            shipping_cost: invoice.shipping_cost(),
            total: invoice.total(),
            total_paid: invoice.total_paid(),
            total_refunded: invoice.total_refunded(),
            balance: invoice.balance(),
            amount_due: invoice.amount_due(),
            items: invoice.line_items().iter().map(LineItemSummary::from).collect(),
            payments: invoice.payments().iter().map(PaymentSummary::from).collect(),
            refunds: invoice.refunds().iter().map(RefundSummary::from).collect(),
            version: invoice.version(),
        }
    }
}
