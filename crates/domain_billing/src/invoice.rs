//! Invoice aggregate
//!
//! The invoice owns its line items, order discounts, surcharges, payments and
//! refunds. Every total is derived from those collections on demand; nothing
//! computed is stored, so a reloaded invoice always reports the same figures.
//!
//! # Lifecycle
//!
//! ```text
//! Draft ──submit──▶ Pending ──mark_sent──▶ Sent ──┬──▶ Paid ──┬──▶ Refunded
//!   │                  │                      │    │          └──▶ PartiallyRefunded
//!   └──────────────────┴──────cancel──────────┤    │                 │  ▲
//!                                             ▼    │                 └──┘
//!                                         Cancelled└──▶ Overdue ──▶ Paid
//! ```
//!
//! Line items, discounts, surcharges and shipping may change while the
//! invoice is open (Draft, Pending, Sent or Overdue). An edit that would
//! leave the invoice total below the net amount already paid is rejected.
//! Payments and refunds are accepted once the invoice is issued (Sent,
//! Overdue, Paid or PartiallyRefunded). A refund moves the invoice to
//! Refunded when it returns everything paid, otherwise to PartiallyRefunded.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{
    Currency, CustomerId, DiscountId, InvoiceId, LineItemId, Money, MoneyError, PaymentId,
    ProvinceCode, RefundId, SurchargeId,
};

use crate::discount::{Discount, DiscountScope};
use crate::error::BillingError;
use crate::line_item::LineItem;
use crate::payment::{Payment, PaymentStatus};
use crate::refund::Refund;
use crate::surcharge::Surcharge;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Invoice is being drafted
    Draft,
    /// Submitted for sending
    Pending,
    /// Sent to the customer
    Sent,
    /// Balance settled
    Paid,
    /// Past due date with a balance remaining
    Overdue,
    /// Voided
    Cancelled,
    /// Everything paid has been refunded
    Refunded,
    /// Part of what was paid has been refunded
    PartiallyRefunded,
}

impl InvoiceStatus {
    /// Statuses in which the invoice content may change
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Draft | InvoiceStatus::Pending | InvoiceStatus::Sent | InvoiceStatus::Overdue
        )
    }

    /// Issued and not yet closed
    fn is_issued(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Sent
                | InvoiceStatus::Overdue
                | InvoiceStatus::Paid
                | InvoiceStatus::PartiallyRefunded
        )
    }

    /// Statuses that accept payments
    pub fn accepts_payments(&self) -> bool {
        self.is_issued()
    }

    /// Statuses that accept refunds; the refundable amount bounds the rest
    pub fn accepts_refunds(&self) -> bool {
        self.is_issued()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Cancelled | InvoiceStatus::Refunded)
    }

    pub fn can_transition_to(&self, target: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, target),
            (Draft, Pending)
                | (Pending, Sent)
                | (Sent, Paid)
                | (Sent, Overdue)
                | (Draft, Cancelled)
                | (Pending, Cancelled)
                | (Sent, Cancelled)
                | (Overdue, Paid)
                | (Sent, Refunded)
                | (Sent, PartiallyRefunded)
                | (Overdue, Refunded)
                | (Overdue, PartiallyRefunded)
                | (Paid, Refunded)
                | (Paid, PartiallyRefunded)
                | (PartiallyRefunded, Refunded)
                | (PartiallyRefunded, PartiallyRefunded)
                | (PartiallyRefunded, Paid)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
            InvoiceStatus::Refunded => "refunded",
            InvoiceStatus::PartiallyRefunded => "partially_refunded",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An invoice billed to a customer in a province
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Human-readable number
    pub invoice_number: String,
    pub customer_id: CustomerId,
    /// Jurisdiction the tax rates were resolved for
    pub province: ProvinceCode,
    pub currency: Currency,
    pub invoice_date: NaiveDate,
    due_date: Option<NaiveDate>,
    status: InvoiceStatus,
    line_items: Vec<LineItem>,
    order_discounts: Vec<Discount>,
    surcharges: Vec<Surcharge>,
    payments: Vec<Payment>,
    refunds: Vec<Refund>,
    shipping_cost: Money,
    shipping_method: Option<String>,
    pub notes: Option<String>,
    version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates an empty draft invoice
    pub fn new(
        invoice_number: impl Into<String>,
        customer_id: CustomerId,
        province: ProvinceCode,
        currency: Currency,
        invoice_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: InvoiceId::new_v7(),
            invoice_number: invoice_number.into(),
            customer_id,
            province,
            currency,
            invoice_date,
            due_date: None,
            status: InvoiceStatus::Draft,
            line_items: Vec::new(),
            order_discounts: Vec::new(),
            surcharges: Vec::new(),
            payments: Vec::new(),
            refunds: Vec::new(),
            shipping_cost: Money::zero(currency),
            shipping_method: None,
            notes: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Line items in display order
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn line_item(&self, id: LineItemId) -> Option<&LineItem> {
        self.line_items.iter().find(|l| l.id == id)
    }

    pub fn order_discounts(&self) -> &[Discount] {
        &self.order_discounts
    }

    pub fn surcharges(&self) -> &[Surcharge] {
        &self.surcharges
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn refunds(&self) -> &[Refund] {
        &self.refunds
    }

    pub fn shipping_method(&self) -> Option<&str> {
        self.shipping_method.as_deref()
    }

    /// Optimistic concurrency token, maintained by the repository
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    // ========================================================================
    // Derived totals
    // ========================================================================

    /// Sum of line subtotals
    pub fn subtotal(&self) -> Money {
        self.line_items
            .iter()
            .fold(Money::zero(self.currency), |acc, l| acc + l.subtotal())
    }

    /// Sum of per-item discounts
    pub fn line_item_discounts(&self) -> Money {
        self.line_items
            .iter()
            .fold(Money::zero(self.currency), |acc, l| acc + l.discount_total())
    }

    /// Order discounts, evaluated once on the subtotal after line discounts
    /// and capped at that amount
    pub fn order_discounts_total(&self) -> Money {
        let base = (self.subtotal() - self.line_item_discounts()).floor_zero();
        let total = self
            .order_discounts
            .iter()
            .fold(Money::zero(self.currency), |acc, d| acc + d.amount_for(base));
        if total.amount() > base.amount() {
            base
        } else {
            total
        }
    }

    pub fn total_discounts(&self) -> Money {
        self.line_item_discounts() + self.order_discounts_total()
    }

    /// Sum of line taxes
    pub fn total_tax(&self) -> Money {
        self.line_items
            .iter()
            .fold(Money::zero(self.currency), |acc, l| acc + l.tax_total())
    }

    /// Surcharges on the subtotal after all discounts
    pub fn total_surcharges(&self) -> Money {
        let base = (self.subtotal() - self.total_discounts()).floor_zero();
        self.surcharges
            .iter()
            .fold(Money::zero(self.currency), |acc, s| acc + s.amount_for(base))
    }

    pub fn shipping_cost(&self) -> Money {
        self.shipping_cost
    }

    /// subtotal − discounts + tax + surcharges + shipping
    pub fn total(&self) -> Money {
        self.subtotal() - self.total_discounts()
            + self.total_tax()
            + self.total_surcharges()
            + self.shipping_cost
    }

    /// Sum of settled payments
    pub fn total_paid(&self) -> Money {
        self.payments
            .iter()
            .filter(|p| p.is_settled())
            .fold(Money::zero(self.currency), |acc, p| acc + p.amount)
    }

    pub fn total_refunded(&self) -> Money {
        self.refunds
            .iter()
            .fold(Money::zero(self.currency), |acc, r| acc + r.amount)
    }

    /// total − paid + refunded, exact
    pub fn balance(&self) -> Money {
        self.total() - self.total_paid() + self.total_refunded()
    }

    /// The balance rounded to the currency, as a customer would pay it
    pub fn amount_due(&self) -> Money {
        self.balance().round_to_currency()
    }

    /// What can still be refunded: paid minus already refunded
    pub fn refundable_amount(&self) -> Money {
        self.total_paid() - self.total_refunded()
    }

    /// Returns true if the invoice is past due with a balance remaining
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(self.status, InvoiceStatus::Sent | InvoiceStatus::Overdue)
            && self.due_date.map_or(false, |due| due < today)
            && self.amount_due().is_positive()
    }

    // ========================================================================
    // Content changes
    // ========================================================================

    /// Sets the due date; it cannot precede the invoice date
    pub fn set_due_date(&mut self, due_date: Option<NaiveDate>) -> Result<(), BillingError> {
        if let Some(due) = due_date {
            if due < self.invoice_date {
                return Err(BillingError::InvalidRequest(format!(
                    "due date {due} is before invoice date {}",
                    self.invoice_date
                )));
            }
        }
        self.edit(|invoice| {
            invoice.due_date = due_date;
            Ok(())
        })
    }

    /// Adds a line at the end of the display order
    pub fn add_line_item(&mut self, mut line: LineItem) -> Result<LineItemId, BillingError> {
        self.ensure_currency(line.currency())?;
        line.ensure_within_limits()?;
        let next_order = self
            .line_items
            .iter()
            .map(|l| l.sort_order() + 1)
            .max()
            .unwrap_or(0);
        line.set_sort_order(next_order);
        let id = line.id;

        self.edit(|invoice| {
            invoice.line_items.push(line);
            Ok(id)
        })
    }

    pub fn remove_line_item(&mut self, id: LineItemId) -> Result<LineItem, BillingError> {
        self.edit(|invoice| {
            let index = invoice.line_index(id)?;
            Ok(invoice.line_items.remove(index))
        })
    }

    pub fn change_line_item_quantity(
        &mut self,
        id: LineItemId,
        quantity: Decimal,
    ) -> Result<(), BillingError> {
        self.edit(|invoice| {
            let index = invoice.line_index(id)?;
            invoice.line_items[index].change_quantity(quantity)
        })
    }

    /// Reorders lines; `order` must list every line exactly once
    pub fn reorder_line_items(&mut self, order: &[LineItemId]) -> Result<(), BillingError> {
        let is_permutation = order.len() == self.line_items.len()
            && self.line_items.iter().all(|l| order.contains(&l.id))
            && order
                .iter()
                .enumerate()
                .all(|(i, id)| !order[..i].contains(id));
        if !is_permutation {
            return Err(BillingError::InvalidRequest(
                "reorder must list every line item exactly once".to_string(),
            ));
        }

        self.edit(|invoice| {
            for line in invoice.line_items.iter_mut() {
                let position = order.iter().position(|id| *id == line.id).unwrap_or_default();
                line.set_sort_order(position as u32);
            }
            invoice.line_items.sort_by_key(|l| l.sort_order());
            Ok(())
        })
    }

    pub fn add_line_item_discount(
        &mut self,
        line_id: LineItemId,
        discount: Discount,
    ) -> Result<DiscountId, BillingError> {
        self.edit(|invoice| {
            let index = invoice.line_index(line_id)?;
            invoice.line_items[index].add_discount(discount)
        })
    }

    pub fn remove_line_item_discount(
        &mut self,
        line_id: LineItemId,
        discount_id: DiscountId,
    ) -> Result<(), BillingError> {
        self.edit(|invoice| {
            let index = invoice.line_index(line_id)?;
            invoice.line_items[index].remove_discount(discount_id).map(|_| ())
        })
    }

    /// Applies a per-order discount
    pub fn apply_order_discount(&mut self, discount: Discount) -> Result<DiscountId, BillingError> {
        if discount.scope != DiscountScope::PerOrder {
            return Err(BillingError::InvalidAdjustment(format!(
                "discount '{}' is not a per-order discount",
                discount.name
            )));
        }
        discount.kind.ensure_currency(self.currency)?;
        let id = discount.id;

        self.edit(|invoice| {
            invoice.order_discounts.push(discount);
            Ok(id)
        })
    }

    pub fn remove_order_discount(&mut self, id: DiscountId) -> Result<Discount, BillingError> {
        self.edit(|invoice| {
            let index = invoice
                .order_discounts
                .iter()
                .position(|d| d.id == id)
                .ok_or_else(|| BillingError::DiscountNotFound(id.to_string()))?;
            Ok(invoice.order_discounts.remove(index))
        })
    }

    pub fn add_surcharge(&mut self, surcharge: Surcharge) -> Result<SurchargeId, BillingError> {
        surcharge.kind.ensure_currency(self.currency)?;
        let id = surcharge.id;

        self.edit(|invoice| {
            invoice.surcharges.push(surcharge);
            Ok(id)
        })
    }

    pub fn remove_surcharge(&mut self, id: SurchargeId) -> Result<Surcharge, BillingError> {
        self.edit(|invoice| {
            let index = invoice
                .surcharges
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| BillingError::SurchargeNotFound(id.to_string()))?;
            Ok(invoice.surcharges.remove(index))
        })
    }

    /// Sets the shipping charge
    pub fn set_shipping(
        &mut self,
        cost: Money,
        method: Option<String>,
    ) -> Result<(), BillingError> {
        self.ensure_currency(cost.currency())?;
        if cost.is_negative() {
            return Err(BillingError::InvalidAmount(format!(
                "shipping cost cannot be negative, got {cost}"
            )));
        }
        cost.ensure_within_limit()?;

        self.edit(|invoice| {
            invoice.shipping_cost = cost;
            invoice.shipping_method = method;
            Ok(())
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Draft → Pending; an empty invoice cannot be submitted
    pub fn submit(&mut self) -> Result<(), BillingError> {
        if self.line_items.is_empty() {
            return Err(BillingError::invalid_operation(
                "cannot submit an invoice without line items",
            ));
        }
        self.transition(InvoiceStatus::Pending)
    }

    /// Pending → Sent
    pub fn mark_sent(&mut self) -> Result<(), BillingError> {
        self.transition(InvoiceStatus::Sent)
    }

    /// Sent → Overdue once the due date has passed with a balance remaining
    pub fn mark_overdue(&mut self, today: NaiveDate) -> Result<(), BillingError> {
        if self.status == InvoiceStatus::Sent && !self.is_overdue(today) {
            return Err(BillingError::invalid_operation(format!(
                "invoice {} is not past due on {today}",
                self.invoice_number
            )));
        }
        self.transition(InvoiceStatus::Overdue)
    }

    /// Voids the invoice; only before payment and only from Draft, Pending or Sent
    pub fn cancel(&mut self) -> Result<(), BillingError> {
        if !self.refundable_amount().is_zero() {
            return Err(BillingError::invalid_operation(format!(
                "invoice {} holds payments of {} and cannot be cancelled",
                self.invoice_number,
                self.refundable_amount()
            )));
        }
        self.transition(InvoiceStatus::Cancelled)
    }

    /// Records and settles a payment
    ///
    /// The payment must be pending and in the invoice currency. Overpayment is
    /// accepted and leaves a negative balance. The invoice becomes Paid once
    /// nothing remains due.
    pub fn process_payment(&mut self, mut payment: Payment) -> Result<PaymentId, BillingError> {
        if !self.status.accepts_payments() {
            return Err(BillingError::invalid_operation(format!(
                "invoice {} cannot accept payments in status {}",
                self.invoice_number, self.status
            )));
        }
        self.ensure_currency(payment.amount.currency())?;
        if !payment.amount.is_positive() {
            return Err(BillingError::InvalidAmount(format!(
                "payment amount must be positive, got {}",
                payment.amount
            )));
        }

        payment.complete()?;
        let id = payment.id;
        self.payments.push(payment);

        if !self.amount_due().is_positive() {
            self.status = InvoiceStatus::Paid;
        }
        self.touch();
        Ok(id)
    }

    /// Records a refund
    ///
    /// Fails without changing anything when the amount exceeds what remains
    /// refundable, or the targeted payment cannot cover it.
    pub fn process_refund(&mut self, refund: Refund) -> Result<RefundId, BillingError> {
        if !self.status.accepts_refunds() {
            return Err(BillingError::invalid_operation(format!(
                "invoice {} cannot be refunded in status {}",
                self.invoice_number, self.status
            )));
        }
        self.ensure_currency(refund.amount.currency())?;
        if !refund.amount.is_positive() {
            return Err(BillingError::InvalidAmount(format!(
                "refund amount must be positive, got {}",
                refund.amount
            )));
        }

        let refundable = self.refundable_amount();
        if refund.amount.amount() > refundable.amount() {
            return Err(BillingError::RefundExceedsRefundable {
                amount: refund.amount.to_string(),
                refundable: refundable.to_string(),
            });
        }

        let payment_update = match refund.original_payment_id {
            Some(payment_id) => {
                let payment = self
                    .payment(payment_id)
                    .ok_or_else(|| BillingError::PaymentNotFound(payment_id.to_string()))?;
                if !payment.is_settled() {
                    return Err(BillingError::invalid_operation(format!(
                        "payment {payment_id} has not settled"
                    )));
                }
                let already = self.refunded_against(payment_id);
                let remaining = payment.amount - already;
                if refund.amount.amount() > remaining.amount() {
                    return Err(BillingError::RefundExceedsRefundable {
                        amount: refund.amount.to_string(),
                        refundable: remaining.to_string(),
                    });
                }
                Some((payment_id, refund.amount.amount() == remaining.amount()))
            }
            None => None,
        };

        if let Some((payment_id, fully)) = payment_update {
            if let Some(payment) = self.payments.iter_mut().find(|p| p.id == payment_id) {
                payment.record_refund(fully)?;
            }
        }

        let id = refund.id;
        self.refunds.push(refund);
        self.status = if self.total_refunded() == self.total_paid() {
            InvoiceStatus::Refunded
        } else {
            InvoiceStatus::PartiallyRefunded
        };
        self.touch();
        Ok(id)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn refunded_against(&self, payment_id: PaymentId) -> Money {
        self.refunds
            .iter()
            .filter(|r| r.original_payment_id == Some(payment_id))
            .fold(Money::zero(self.currency), |acc, r| acc + r.amount)
    }

    fn line_index(&self, id: LineItemId) -> Result<usize, BillingError> {
        self.line_items
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| BillingError::LineItemNotFound(id.to_string()))
    }

    fn ensure_currency(&self, currency: Currency) -> Result<(), BillingError> {
        if currency != self.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                currency.to_string(),
            )
            .into());
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), BillingError> {
        if !self.status.is_open() {
            return Err(BillingError::InvoiceNotEditable(self.status.to_string()));
        }
        Ok(())
    }

    /// Applies a content change to a working copy and commits it only if the
    /// change succeeds and the total still covers the net amount paid
    fn edit<T>(
        &mut self,
        change: impl FnOnce(&mut Invoice) -> Result<T, BillingError>,
    ) -> Result<T, BillingError> {
        self.ensure_open()?;
        let mut working = self.clone();
        let result = change(&mut working)?;

        let net_paid = working.refundable_amount();
        if working.total().round_to_currency().amount() < net_paid.amount() {
            return Err(BillingError::invalid_operation(format!(
                "change would reduce the total below the {net_paid} already paid"
            )));
        }
        if net_paid.is_positive()
            && !working.amount_due().is_positive()
            && working.status.can_transition_to(InvoiceStatus::Paid)
        {
            working.status = InvoiceStatus::Paid;
        }

        working.touch();
        *self = working;
        Ok(result)
    }

    fn transition(&mut self, target: InvoiceStatus) -> Result<(), BillingError> {
        if !self.status.can_transition_to(target) {
            return Err(BillingError::InvalidStateTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        self.status = target;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::AdjustmentKind;
    use crate::line_item::ItemSnapshot;
    use crate::payment::PaymentMethod;
    use core_kernel::{ItemId, Rate, TaxId};
    use domain_catalog::{AppliedTaxRate, ItemType, TaxTreatment};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cad(amount: Decimal) -> Money {
        Money::new(amount, Currency::CAD)
    }

    fn line(price: Decimal, quantity: Decimal, rates: &[Decimal]) -> LineItem {
        let mut line = LineItem::new(
            ItemSnapshot {
                item_id: ItemId::new(),
                sku: "SKU".to_string(),
                name: "Thing".to_string(),
                description: None,
                unit_price: cad(price),
                unit_type: None,
                item_type: ItemType::Product,
                item_category: None,
                tax_code: None,
                tax_treatment: TaxTreatment::Standard,
            },
            quantity,
        )
        .unwrap();
        line.apply_taxes(
            rates
                .iter()
                .map(|r| AppliedTaxRate {
                    tax_id: TaxId::new(),
                    tax_code: "T".to_string(),
                    tax_name: "Tax".to_string(),
                    rate: Rate::new(*r),
                })
                .collect(),
        )
        .unwrap();
        line
    }

    fn invoice() -> Invoice {
        Invoice::new(
            "INV-000001",
            CustomerId::new(),
            ProvinceCode::parse("BC").unwrap(),
            Currency::CAD,
            date(2024, 5, 1),
        )
    }

    fn sent_invoice(price: Decimal) -> Invoice {
        let mut invoice = invoice();
        invoice.add_line_item(line(price, dec!(1), &[])).unwrap();
        invoice.submit().unwrap();
        invoice.mark_sent().unwrap();
        invoice
    }

    fn payment(amount: Decimal) -> Payment {
        Payment::new(cad(amount), PaymentMethod::CreditCard, "REF", date(2024, 5, 2)).unwrap()
    }

    fn refund(amount: Decimal) -> Refund {
        Refund::new(cad(amount), "Returned goods", date(2024, 5, 3)).unwrap()
    }

    #[test]
    fn test_new_invoice_is_empty_draft() {
        let invoice = invoice();
        assert_eq!(invoice.status(), InvoiceStatus::Draft);
        assert!(invoice.total().is_zero());
        assert!(invoice.balance().is_zero());
        assert_eq!(invoice.version(), 0);
    }

    #[test]
    fn test_totals_with_gst_and_pst() {
        let mut invoice = invoice();
        invoice
            .add_line_item(line(dec!(100), dec!(2), &[dec!(0.05), dec!(0.07)]))
            .unwrap();
        invoice.set_shipping(cad(dec!(15)), Some("Ground".into())).unwrap();

        assert_eq!(invoice.subtotal(), cad(dec!(200)));
        assert_eq!(invoice.total_tax(), cad(dec!(24)));
        assert_eq!(invoice.shipping_cost(), cad(dec!(15)));
        assert_eq!(invoice.total(), cad(dec!(239)));
        assert_eq!(invoice.shipping_method(), Some("Ground"));
    }

    #[test]
    fn test_order_discount_applied_once() {
        let mut invoice = invoice();
        invoice.add_line_item(line(dec!(100), dec!(1), &[])).unwrap();
        invoice.add_line_item(line(dec!(300), dec!(1), &[])).unwrap();
        invoice
            .apply_order_discount(
                Discount::new(
                    "Spring sale",
                    AdjustmentKind::FixedAmount { amount: cad(dec!(50)) },
                    DiscountScope::PerOrder,
                )
                .unwrap(),
            )
            .unwrap();

        assert_eq!(invoice.order_discounts_total(), cad(dec!(50)));
        assert_eq!(invoice.total(), cad(dec!(350)));
    }

    #[test]
    fn test_order_discount_capped() {
        let mut invoice = invoice();
        invoice.add_line_item(line(dec!(30), dec!(1), &[])).unwrap();
        for _ in 0..2 {
            invoice
                .apply_order_discount(
                    Discount::new(
                        "Coupon",
                        AdjustmentKind::FixedAmount { amount: cad(dec!(20)) },
                        DiscountScope::PerOrder,
                    )
                    .unwrap(),
                )
                .unwrap();
        }
        assert_eq!(invoice.order_discounts_total(), cad(dec!(30)));
        assert!(invoice.total().is_zero());
    }

    #[test]
    fn test_surcharge_on_discounted_subtotal() {
        let mut invoice = invoice();
        invoice.add_line_item(line(dec!(200), dec!(1), &[])).unwrap();
        invoice
            .apply_order_discount(
                Discount::new(
                    "Ten percent",
                    AdjustmentKind::Percentage { rate: Rate::new(dec!(0.10)) },
                    DiscountScope::PerOrder,
                )
                .unwrap(),
            )
            .unwrap();
        invoice
            .add_surcharge(
                Surcharge::new("Card fee", AdjustmentKind::Percentage { rate: Rate::new(dec!(0.02)) })
                    .unwrap(),
            )
            .unwrap();

        assert_eq!(invoice.total_surcharges(), cad(dec!(3.6)));
        assert_eq!(invoice.total(), cad(dec!(183.6)));
    }

    #[test]
    fn test_amounts_beyond_limits_rejected() {
        let mut invoice = sent_invoice(dec!(100));

        let err = invoice.set_shipping(cad(dec!(1_000_000_000_001)), None).unwrap_err();
        assert_eq!(err.kind(), core_kernel::ErrorKind::InvalidArgument);
        assert!(invoice.shipping_cost().is_zero());

        let err = Payment::new(cad(Decimal::MAX), PaymentMethod::Cash, "", date(2024, 5, 2))
            .unwrap_err();
        assert_eq!(err.kind(), core_kernel::ErrorKind::InvalidArgument);
        assert_eq!(invoice.total(), cad(dec!(100)));
    }

    #[test]
    fn test_line_item_currency_must_match() {
        let mut invoice = invoice();
        let mut usd_line = line(dec!(10), dec!(1), &[]);
        usd_line.item.unit_price = Money::new(dec!(10), Currency::USD);
        assert!(invoice.add_line_item(usd_line).is_err());
        assert!(invoice.line_items().is_empty());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut invoice = invoice();
        assert!(invoice.submit().is_err());
        invoice.add_line_item(line(dec!(10), dec!(1), &[])).unwrap();
        assert!(invoice.mark_sent().is_err());

        invoice.submit().unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Pending);
        invoice.mark_sent().unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Sent);
        assert!(invoice.submit().is_err());
    }

    #[test]
    fn test_full_payment_marks_paid() {
        let mut invoice = sent_invoice(dec!(100));
        invoice.process_payment(payment(dec!(100))).unwrap();

        assert_eq!(invoice.status(), InvoiceStatus::Paid);
        assert!(invoice.balance().is_zero());
        assert_eq!(invoice.payments()[0].status(), PaymentStatus::Completed);
    }

    #[test]
    fn test_partial_payment_keeps_status() {
        let mut invoice = sent_invoice(dec!(100));
        invoice.process_payment(payment(dec!(40))).unwrap();

        assert_eq!(invoice.status(), InvoiceStatus::Sent);
        assert_eq!(invoice.balance(), cad(dec!(60)));
    }

    #[test]
    fn test_payment_rules() {
        let mut draft = invoice();
        draft.add_line_item(line(dec!(100), dec!(1), &[])).unwrap();
        assert!(draft.process_payment(payment(dec!(10))).is_err());

        let mut invoice = sent_invoice(dec!(100));
        let usd = Payment::new(Money::new(dec!(10), Currency::USD), PaymentMethod::Cash, "", date(2024, 5, 2))
            .unwrap();
        assert!(invoice.process_payment(usd).is_err());
        assert!(invoice.payments().is_empty());
    }

    #[test]
    fn test_overpayment_leaves_credit_balance() {
        let mut invoice = sent_invoice(dec!(100));
        invoice.process_payment(payment(dec!(120))).unwrap();

        assert_eq!(invoice.status(), InvoiceStatus::Paid);
        assert_eq!(invoice.balance(), cad(dec!(-20)));
        assert_eq!(invoice.amount_due(), cad(dec!(-20)));

        invoice.process_refund(refund(dec!(20))).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::PartiallyRefunded);
        assert!(invoice.balance().is_zero());
    }

    #[test]
    fn test_payment_of_rounded_balance_settles() {
        let mut invoice = invoice();
        invoice.add_line_item(line(dec!(19.99), dec!(1), &[dec!(0.13)])).unwrap();
        invoice.submit().unwrap();
        invoice.mark_sent().unwrap();

        assert_eq!(invoice.total(), cad(dec!(22.5887)));
        assert_eq!(invoice.amount_due(), cad(dec!(22.59)));
        invoice.process_payment(payment(dec!(22.59))).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
    }

    #[test]
    fn test_partial_refund_then_full() {
        let mut invoice = sent_invoice(dec!(100));
        invoice.process_payment(payment(dec!(100))).unwrap();

        invoice.process_refund(refund(dec!(50))).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::PartiallyRefunded);
        assert_eq!(invoice.balance(), cad(dec!(50)));
        assert_eq!(invoice.refundable_amount(), cad(dec!(50)));

        invoice.process_refund(refund(dec!(50))).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Refunded);
        assert!(invoice.status().is_terminal());
    }

    #[test]
    fn test_refund_of_partial_payment_on_overdue_invoice() {
        let mut invoice = sent_invoice(dec!(100));
        invoice.set_due_date(Some(date(2024, 5, 31))).unwrap();
        invoice.process_payment(payment(dec!(40))).unwrap();
        invoice.mark_overdue(date(2024, 6, 1)).unwrap();

        invoice.process_refund(refund(dec!(10))).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::PartiallyRefunded);
        assert_eq!(invoice.balance(), cad(dec!(70)));

        invoice.process_payment(payment(dec!(70))).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
    }

    #[test]
    fn test_full_refund_of_partial_payment_on_sent_invoice() {
        let mut invoice = sent_invoice(dec!(100));
        invoice.process_payment(payment(dec!(40))).unwrap();

        invoice.process_refund(refund(dec!(40))).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Refunded);

        let mut unpaid = sent_invoice(dec!(100));
        let err = unpaid.process_refund(refund(dec!(1))).unwrap_err();
        assert!(matches!(err, BillingError::RefundExceedsRefundable { .. }));
        assert_eq!(unpaid.status(), InvoiceStatus::Sent);
    }

    #[test]
    fn test_refund_over_cap_leaves_state_unchanged() {
        let mut invoice = sent_invoice(dec!(100));
        invoice.process_payment(payment(dec!(100))).unwrap();
        let before = invoice.clone();

        let err = invoice.process_refund(refund(dec!(100.01))).unwrap_err();
        assert!(matches!(err, BillingError::RefundExceedsRefundable { .. }));
        assert_eq!(invoice, before);
    }

    #[test]
    fn test_refund_against_payment() {
        let mut invoice = sent_invoice(dec!(100));
        invoice.process_payment(payment(dec!(60))).unwrap();
        let second = invoice.process_payment(payment(dec!(40))).unwrap();

        let err = invoice
            .process_refund(refund(dec!(41)).for_payment(second))
            .unwrap_err();
        assert!(matches!(err, BillingError::RefundExceedsRefundable { .. }));

        invoice.process_refund(refund(dec!(15)).for_payment(second)).unwrap();
        assert_eq!(invoice.payment(second).unwrap().status(), PaymentStatus::PartiallyRefunded);

        invoice.process_refund(refund(dec!(25)).for_payment(second)).unwrap();
        assert_eq!(invoice.payment(second).unwrap().status(), PaymentStatus::Refunded);
        assert_eq!(invoice.status(), InvoiceStatus::PartiallyRefunded);
        assert_eq!(invoice.total_paid(), cad(dec!(100)));
    }

    #[test]
    fn test_refund_unknown_payment() {
        let mut invoice = sent_invoice(dec!(100));
        invoice.process_payment(payment(dec!(100))).unwrap();
        let err = invoice
            .process_refund(refund(dec!(10)).for_payment(PaymentId::new()))
            .unwrap_err();
        assert!(matches!(err, BillingError::PaymentNotFound(_)));
    }

    #[test]
    fn test_top_up_after_partial_refund() {
        let mut invoice = sent_invoice(dec!(100));
        invoice.process_payment(payment(dec!(100))).unwrap();
        invoice.process_refund(refund(dec!(30))).unwrap();

        invoice.process_payment(payment(dec!(30))).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
        assert!(invoice.balance().is_zero());
    }

    #[test]
    fn test_cancel_rules() {
        let mut draft = invoice();
        draft.cancel().unwrap();
        assert_eq!(draft.status(), InvoiceStatus::Cancelled);
        assert!(draft.add_line_item(line(dec!(1), dec!(1), &[])).is_err());

        let mut partly_paid = sent_invoice(dec!(100));
        partly_paid.process_payment(payment(dec!(10))).unwrap();
        assert!(partly_paid.cancel().is_err());

        let mut paid = sent_invoice(dec!(100));
        paid.process_payment(payment(dec!(100))).unwrap();
        assert!(matches!(paid.cancel(), Err(BillingError::InvalidOperation(_))));
    }

    #[test]
    fn test_mark_overdue() {
        let mut invoice = sent_invoice(dec!(100));
        assert!(invoice.mark_overdue(date(2024, 7, 1)).is_err());

        invoice.set_due_date(Some(date(2024, 5, 31))).unwrap();
        assert!(invoice.mark_overdue(date(2024, 5, 31)).is_err());
        assert!(invoice.is_overdue(date(2024, 6, 1)));

        invoice.mark_overdue(date(2024, 6, 1)).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Overdue);

        invoice.process_payment(payment(dec!(100))).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
    }

    #[test]
    fn test_due_date_not_before_invoice_date() {
        let mut invoice = invoice();
        assert!(invoice.set_due_date(Some(date(2024, 4, 30))).is_err());
        assert!(invoice.set_due_date(Some(date(2024, 5, 1))).is_ok());
    }

    #[test]
    fn test_edit_below_paid_rejected() {
        let mut invoice = sent_invoice(dec!(100));
        let extra = invoice.add_line_item(line(dec!(50), dec!(1), &[])).unwrap();
        invoice.process_payment(payment(dec!(120))).unwrap();

        let err = invoice.remove_line_item(extra).unwrap_err();
        assert_eq!(err.kind(), core_kernel::ErrorKind::InvalidOperation);
        assert_eq!(invoice.line_items().len(), 2);
    }

    #[test]
    fn test_edit_that_settles_balance_marks_paid() {
        let mut invoice = sent_invoice(dec!(100));
        let extra = invoice.add_line_item(line(dec!(50), dec!(1), &[])).unwrap();
        invoice.process_payment(payment(dec!(100))).unwrap();

        invoice.remove_line_item(extra).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
    }

    #[test]
    fn test_reorder_line_items() {
        let mut invoice = invoice();
        let a = invoice.add_line_item(line(dec!(1), dec!(1), &[])).unwrap();
        let b = invoice.add_line_item(line(dec!(2), dec!(1), &[])).unwrap();
        let c = invoice.add_line_item(line(dec!(3), dec!(1), &[])).unwrap();

        invoice.reorder_line_items(&[c, a, b]).unwrap();
        let order: Vec<_> = invoice.line_items().iter().map(|l| l.id).collect();
        assert_eq!(order, vec![c, a, b]);
        assert_eq!(invoice.line_items()[0].sort_order(), 0);

        assert!(invoice.reorder_line_items(&[a, b]).is_err());
        assert!(invoice.reorder_line_items(&[a, a, b]).is_err());
    }

    #[test]
    fn test_change_quantity_and_remove() {
        let mut invoice = invoice();
        let id = invoice.add_line_item(line(dec!(10), dec!(1), &[])).unwrap();

        invoice.change_line_item_quantity(id, dec!(3)).unwrap();
        assert_eq!(invoice.subtotal(), cad(dec!(30)));
        assert!(invoice.change_line_item_quantity(id, dec!(0)).is_err());

        invoice.remove_line_item(id).unwrap();
        assert!(matches!(
            invoice.remove_line_item(id),
            Err(BillingError::LineItemNotFound(_))
        ));
    }

    #[test]
    fn test_serde_round_trip_preserves_totals() {
        let mut invoice = sent_invoice(dec!(100));
        invoice.add_line_item(line(dec!(19.99), dec!(3), &[dec!(0.05), dec!(0.07)])).unwrap();
        invoice.process_payment(payment(dec!(50))).unwrap();

        let json = serde_json::to_string(&invoice).unwrap();
        let restored: Invoice = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.total(), invoice.total());
        assert_eq!(restored.balance(), invoice.balance());
        assert_eq!(restored.total_tax(), invoice.total_tax());
        assert_eq!(restored, invoice);
    }
}
