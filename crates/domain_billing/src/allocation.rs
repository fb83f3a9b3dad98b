//! Proportional refund allocation
//!
//! A refund is spread over the charges that make up the invoice: each line's
//! net amount and tax, the surcharges, and shipping. A line's net amount is
//! after its own discounts and its share of the order discounts, which are
//! spread over the lines by discounted amount. Shares are proportional
//! to each charge, rounded to the currency, with the rounding remainder on
//! the last share so the allocation always sums to the refund amount.
//! The allocation is a record of how the refund splits; it does not change
//! the invoice's line items.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{LineItemId, Money, PaymentId};

use crate::error::BillingError;
use crate::invoice::Invoice;
use crate::refund::Refund;

/// The part of a refund attributed to one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRefundShare {
    pub line_item_id: LineItemId,
    pub net: Money,
    pub tax: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundAllocation {
    pub lines: Vec<LineRefundShare>,
    pub surcharges: Money,
    pub shipping: Money,
}

impl RefundAllocation {
    pub fn total(&self) -> Money {
        self.lines
            .iter()
            .fold(self.surcharges + self.shipping, |acc, l| acc + l.net + l.tax)
    }
}

#[derive(Clone, Copy)]
enum Slot {
    LineNet(usize),
    LineTax(usize),
    Surcharges,
    Shipping,
}

/// Builds a refund whose amount is spread proportionally over the invoice's
/// charges
///
/// Fails with `RefundExceedsRefundable` when the amount is more than the
/// invoice can refund.
pub fn create_proportional_refund(
    invoice: &Invoice,
    amount: Money,
    reason: impl Into<String>,
    original_payment_id: Option<PaymentId>,
    refund_date: NaiveDate,
) -> Result<Refund, BillingError> {
    let mut refund = Refund::new(amount, reason, refund_date)?;
    if let Some(payment_id) = original_payment_id {
        refund = refund.for_payment(payment_id);
    }

    let refundable = invoice.refundable_amount();
    if amount.currency() != invoice.currency || amount.amount() > refundable.amount() {
        return Err(BillingError::RefundExceedsRefundable {
            amount: amount.to_string(),
            refundable: refundable.to_string(),
        });
    }

    let line_nets = line_nets_after_order_discounts(invoice)?;
    let mut slots = Vec::new();
    for (index, line) in invoice.line_items().iter().enumerate() {
        slots.push((Slot::LineNet(index), line_nets[index]));
        slots.push((Slot::LineTax(index), line.tax_total().amount()));
    }
    slots.push((Slot::Surcharges, invoice.total_surcharges().amount()));
    slots.push((Slot::Shipping, invoice.shipping_cost().amount()));
    slots.retain(|(_, weight)| *weight > Decimal::ZERO);

    let zero = Money::zero(invoice.currency);
    let mut allocation = RefundAllocation {
        lines: invoice
            .line_items()
            .iter()
            .map(|l| LineRefundShare {
                line_item_id: l.id,
                net: zero,
                tax: zero,
            })
            .collect(),
        surcharges: zero,
        shipping: zero,
    };

    if slots.is_empty() {
        return Ok(refund);
    }

    let weights: Vec<Decimal> = slots.iter().map(|(_, w)| *w).collect();
    let shares = amount.allocate_by_ratios(&weights)?;
    for ((slot, _), share) in slots.iter().zip(shares) {
        match *slot {
            Slot::LineNet(i) => allocation.lines[i].net = share,
            Slot::LineTax(i) => allocation.lines[i].tax = share,
            Slot::Surcharges => allocation.surcharges = share,
            Slot::Shipping => allocation.shipping = share,
        }
    }

    Ok(refund.with_allocation(allocation))
}

fn line_nets_after_order_discounts(invoice: &Invoice) -> Result<Vec<Decimal>, BillingError> {
    let bases: Vec<Decimal> = invoice
        .line_items()
        .iter()
        .map(|l| l.discounted_base().amount())
        .collect();
    let order_discount = invoice.order_discounts_total();
    if !order_discount.is_positive() || bases.iter().all(|b| *b <= Decimal::ZERO) {
        return Ok(bases);
    }

    let shares = order_discount.allocate_by_ratios(&bases)?;
    Ok(bases
        .iter()
        .zip(shares)
        .map(|(base, share)| (*base - share.amount()).max(Decimal::ZERO))
        .collect())
}
