//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful failure
//! messages than standard assertions.

use core_kernel::Money;
use domain_billing::{Invoice, InvoiceStatus, RefundAllocation};
use rust_decimal::Decimal;

/// Asserts that two Money values are equal in currency and amount
///
/// Scale is ignored, so `10` equals `10.00`.
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={actual}, expected={expected}"
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Amount mismatch: actual={actual}, expected={expected}"
    );
}

/// Asserts that two Money values are within a tolerance of each other
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={actual}, expected={expected}"
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={actual}, expected={expected}, diff={diff}, tolerance={tolerance}"
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {money}");
}

/// Asserts that money values sum exactly to a total
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = parts
        .iter()
        .try_fold(Money::zero(total.currency()), |acc, m| acc.checked_add(m))
        .unwrap_or_else(|e| panic!("Cannot sum parts: {e}"));

    assert_eq!(
        sum.amount(),
        total.amount(),
        "Sum of parts ({sum}) doesn't equal total ({total})"
    );
}

/// Asserts the invoice's derived totals agree with each other
///
/// Checks the total identity, the balance identity and the per-line identity.
pub fn assert_invoice_consistent(invoice: &Invoice) {
    let expected_total = invoice.subtotal() - invoice.total_discounts()
        + invoice.total_tax()
        + invoice.total_surcharges()
        + invoice.shipping_cost();
    assert_money_eq(&invoice.total(), &expected_total);

    let expected_balance = invoice.total() - invoice.total_paid() + invoice.total_refunded();
    assert_money_eq(&invoice.balance(), &expected_balance);

    for line in invoice.line_items() {
        let expected = line.subtotal() - line.discount_total() + line.tax_total();
        assert_money_eq(&line.total(), &expected);
    }

    assert!(
        invoice.total_refunded().amount() <= invoice.total_paid().amount(),
        "Refunded {} exceeds paid {}",
        invoice.total_refunded(),
        invoice.total_paid()
    );
}

/// Asserts the invoice is in the expected status
pub fn assert_status(invoice: &Invoice, expected: InvoiceStatus) {
    assert_eq!(
        invoice.status(),
        expected,
        "Invoice {} is {}, expected {}",
        invoice.invoice_number,
        invoice.status(),
        expected
    );
}

/// Asserts a refund allocation adds up to the refunded amount
pub fn assert_allocation_sums_to(allocation: &RefundAllocation, amount: &Money) {
    assert_money_eq(&allocation.total(), amount);
}
