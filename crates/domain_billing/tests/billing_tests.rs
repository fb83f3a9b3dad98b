//! Invoice workflow tests for domain_billing

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, CustomerId, ErrorKind, ItemId, Money, ProvinceCode, Rate};
use domain_catalog::{
    canadian_taxes, InMemoryItemRepository, InMemoryProvinceRepository, InMemoryTaxProvider, Item,
    TaxTreatment,
};
use domain_party::{Address, AddressType, Customer, InMemoryCustomerRepository};

use domain_billing::{
    AdjustmentKind, BillingError, CreateInvoiceRequest, Discount, DiscountScope,
    InMemoryInvoiceRepository, Invoice, InvoiceItemRequest, InvoiceRepository, InvoiceService,
    InvoiceStatus, ItemSnapshot, LineItem, Payment, PaymentMethod, ProcessPaymentRequest,
    ProcessRefundRequest, Refund, ShippingRequest, Surcharge,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn cad(amount: Decimal) -> Money {
    Money::new(amount, Currency::CAD)
}

struct World {
    service: InvoiceService,
    invoices: InMemoryInvoiceRepository,
    bc_customer: CustomerId,
    on_customer: CustomerId,
    exempt_customer: CustomerId,
    widget: ItemId,
    server: ItemId,
    consulting: ItemId,
}

fn customer_in(name: &str, province: &str) -> Customer {
    let province = ProvinceCode::parse(province).unwrap();
    let mut customer = Customer::new(name).unwrap();
    customer.add_address(
        Address::new(AddressType::Billing, "100 Queen St", "Somewhere", province, "A1A 1A1")
            .primary(),
    );
    customer
}

async fn world() -> World {
    let seed = canadian_taxes().unwrap();

    let bc = customer_in("Coastal Supply", "BC");
    let on = customer_in("Lakeshore Ltd", "ON");
    let exempt = customer_in("First Nation Office", "BC").with_exemption("87-EX-001");

    let widget = Item::product("WID-100", "Widget", Currency::CAD)
        .unwrap()
        .with_price(cad(dec!(100)), date(2024, 1, 1), None)
        .unwrap();
    let server = Item::product("SRV-500", "Rack server", Currency::CAD)
        .unwrap()
        .with_price(cad(dec!(500)), date(2024, 1, 1), None)
        .unwrap();
    let consulting = Item::service(
        "CONS-HR",
        "Consulting",
        domain_catalog::BillingBasis::Hourly,
        Currency::CAD,
    )
    .unwrap()
    .with_price(cad(dec!(150)), date(2024, 1, 1), None)
    .unwrap();

    let invoices = InMemoryInvoiceRepository::new();
    let world_ids = (bc.id, on.id, exempt.id, widget.id, server.id, consulting.id);

    let service = InvoiceService::new(
        Arc::new(invoices.clone()),
        Arc::new(InMemoryCustomerRepository::with_customers(vec![bc, on, exempt]).await),
        Arc::new(InMemoryItemRepository::with_items(vec![widget, server, consulting]).await),
        Arc::new(InMemoryTaxProvider::from_seed(&seed)),
        Arc::new(InMemoryProvinceRepository::new(seed.provinces.clone())),
    );

    World {
        service,
        invoices,
        bc_customer: world_ids.0,
        on_customer: world_ids.1,
        exempt_customer: world_ids.2,
        widget: world_ids.3,
        server: world_ids.4,
        consulting: world_ids.5,
    }
}

fn create_request(customer: CustomerId, items: &[(ItemId, Decimal)]) -> CreateInvoiceRequest {
    CreateInvoiceRequest {
        customer_id: customer,
        invoice_date: date(2024, 6, 1),
        due_date: Some(date(2024, 7, 1)),
        items: items
            .iter()
            .map(|(item_id, quantity)| InvoiceItemRequest {
                item_id: *item_id,
                quantity: *quantity,
            })
            .collect(),
        shipping: None,
        notes: None,
    }
}

fn payment_request(
    invoice_id: core_kernel::InvoiceId,
    amount: Money,
) -> ProcessPaymentRequest {
    ProcessPaymentRequest {
        invoice_id,
        amount,
        method: PaymentMethod::CreditCard,
        reference_number: "AUTH-0001".to_string(),
        payment_date: date(2024, 6, 10),
        gateway: None,
    }
}

fn refund_request(invoice_id: core_kernel::InvoiceId, amount: Money) -> ProcessRefundRequest {
    ProcessRefundRequest {
        invoice_id,
        original_payment_id: None,
        amount,
        reason: "Returned goods".to_string(),
        refund_date: date(2024, 6, 20),
    }
}

// ============================================================================
// Creation and content
// ============================================================================

mod creation_tests {
    use super::*;

    #[tokio::test]
    async fn test_two_widgets_with_shipping() {
        let w = world().await;
        let mut request = create_request(w.on_customer, &[(w.widget, dec!(2))]);
        request.shipping = Some(ShippingRequest {
            cost: cad(dec!(15)),
            method: Some("Ground".to_string()),
        });

        let id = w.service.create_invoice(request).await.unwrap();
        let summary = w.service.get_invoice(id).await.unwrap();

        assert_eq!(summary.subtotal, cad(dec!(200)));
        assert_eq!(summary.total_tax, cad(dec!(26)));
        assert_eq!(summary.shipping_cost, cad(dec!(15)));
        assert_eq!(summary.total, cad(dec!(241)));
        assert_eq!(summary.balance, summary.total);
        assert_eq!(summary.province.as_str(), "ON");
    }

    #[tokio::test]
    async fn test_adding_a_line_grows_subtotal() {
        let w = world().await;
        let id = w
            .service
            .create_invoice(create_request(w.on_customer, &[(w.widget, dec!(1))]))
            .await
            .unwrap();

        w.service.add_line_item(id, w.server, dec!(1)).await.unwrap();

        let summary = w.service.get_invoice(id).await.unwrap();
        assert_eq!(summary.subtotal, cad(dec!(600)));
        assert_eq!(summary.items.len(), 2);
        assert_eq!(summary.items[1].sku, "SRV-500");
    }

    #[tokio::test]
    async fn test_bc_charges_gst_and_pst() {
        let w = world().await;
        let id = w
            .service
            .create_invoice(create_request(w.bc_customer, &[(w.widget, dec!(1))]))
            .await
            .unwrap();

        let summary = w.service.get_invoice(id).await.unwrap();
        let codes: Vec<_> = summary.items[0]
            .taxes
            .iter()
            .map(|t| t.tax_code.as_str())
            .collect();
        assert_eq!(codes, vec!["GST", "PST-BC"]);
        assert_eq!(summary.total_tax, cad(dec!(12)));
        assert_eq!(summary.total, cad(dec!(112)));
    }

    #[tokio::test]
    async fn test_exempt_customer_pays_no_tax() {
        let w = world().await;
        let id = w
            .service
            .create_invoice(create_request(w.exempt_customer, &[(w.widget, dec!(3))]))
            .await
            .unwrap();

        let summary = w.service.get_invoice(id).await.unwrap();
        assert!(summary.total_tax.is_zero());
        assert_eq!(summary.total, cad(dec!(300)));
    }

    #[tokio::test]
    async fn test_service_line_carries_billing_unit() {
        let w = world().await;
        let id = w
            .service
            .create_invoice(create_request(w.on_customer, &[(w.consulting, dec!(1.5))]))
            .await
            .unwrap();

        let summary = w.service.get_invoice(id).await.unwrap();
        assert_eq!(summary.items[0].unit_type.as_deref(), Some("hour"));
        assert_eq!(summary.subtotal, cad(dec!(225)));
    }

    #[tokio::test]
    async fn test_line_and_order_adjustments() {
        let w = world().await;
        let id = w
            .service
            .create_invoice(create_request(w.on_customer, &[(w.widget, dec!(2))]))
            .await
            .unwrap();
        let line_id = w.service.get_invoice(id).await.unwrap().items[0].id;

        let line_discount = Discount::new(
            "Promo",
            AdjustmentKind::FixedAmount { amount: cad(dec!(20)) },
            DiscountScope::PerItem,
        )
        .unwrap();
        w.service
            .add_line_item_discount(id, line_id, line_discount)
            .await
            .unwrap();

        let order_discount = Discount::new(
            "Loyalty",
            AdjustmentKind::Percentage { rate: Rate::from_percentage(dec!(10)) },
            DiscountScope::PerOrder,
        )
        .unwrap();
        w.service.apply_order_discount(id, order_discount).await.unwrap();

        let fee = Surcharge::new(
            "Card fee",
            AdjustmentKind::Percentage { rate: Rate::from_percentage(dec!(2)) },
        )
        .unwrap();
        w.service.add_surcharge(id, fee).await.unwrap();

        let summary = w.service.get_invoice(id).await.unwrap();
        // line: 200 - 20 = 180, HST 13% on 180 = 23.40
        // order: 10% of 180 = 18; surcharge: 2% of 162 = 3.24
        assert_eq!(summary.total_discounts, cad(dec!(38)));
        assert_eq!(summary.total_tax, cad(dec!(23.40)));
        assert_eq!(summary.total_surcharges, cad(dec!(3.24)));
        assert_eq!(summary.total, cad(dec!(188.64)));
    }

    #[tokio::test]
    async fn test_unknown_customer_is_not_found() {
        let w = world().await;
        let err = w
            .service
            .create_invoice(create_request(CustomerId::new(), &[(w.widget, dec!(1))]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(w.invoices.is_empty().await);
    }
}

// ============================================================================
// Payments and refunds
// ============================================================================

mod settlement_tests {
    use super::*;

    async fn sent_invoice(w: &World) -> core_kernel::InvoiceId {
        let id = w
            .service
            .create_invoice(create_request(w.bc_customer, &[(w.widget, dec!(2))]))
            .await
            .unwrap();
        w.service.submit_invoice(id).await.unwrap();
        w.service.send_invoice(id).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_full_payment_marks_paid() {
        let w = world().await;
        let id = sent_invoice(&w).await;

        w.service
            .process_payment(payment_request(id, cad(dec!(224))))
            .await
            .unwrap();

        let summary = w.service.get_invoice(id).await.unwrap();
        assert_eq!(summary.status, InvoiceStatus::Paid);
        assert!(summary.balance.is_zero());
        assert_eq!(summary.total_paid, cad(dec!(224)));
    }

    #[tokio::test]
    async fn test_partial_payments_then_settle() {
        let w = world().await;
        let id = sent_invoice(&w).await;

        w.service
            .process_payment(payment_request(id, cad(dec!(100))))
            .await
            .unwrap();
        let summary = w.service.get_invoice(id).await.unwrap();
        assert_eq!(summary.status, InvoiceStatus::Sent);
        assert_eq!(summary.amount_due, cad(dec!(124)));

        w.service
            .process_payment(payment_request(id, cad(dec!(124))))
            .await
            .unwrap();
        let summary = w.service.get_invoice(id).await.unwrap();
        assert_eq!(summary.status, InvoiceStatus::Paid);
        assert_eq!(summary.payments.len(), 2);
    }

    #[tokio::test]
    async fn test_overpayment_accepted_and_refundable() {
        let w = world().await;
        let id = sent_invoice(&w).await;

        w.service
            .process_payment(payment_request(id, cad(dec!(250))))
            .await
            .unwrap();
        let summary = w.service.get_invoice(id).await.unwrap();
        assert_eq!(summary.status, InvoiceStatus::Paid);
        assert_eq!(summary.balance, cad(dec!(-26)));

        w.service
            .process_refund(refund_request(id, cad(dec!(26))))
            .await
            .unwrap();
        let summary = w.service.get_invoice(id).await.unwrap();
        assert_eq!(summary.status, InvoiceStatus::PartiallyRefunded);
        assert!(summary.balance.is_zero());
    }

    #[tokio::test]
    async fn test_refund_on_overdue_invoice() {
        let w = world().await;
        let id = sent_invoice(&w).await;
        w.service
            .process_payment(payment_request(id, cad(dec!(100))))
            .await
            .unwrap();
        w.service.mark_overdue(id, date(2024, 7, 2)).await.unwrap();

        w.service
            .process_refund(refund_request(id, cad(dec!(40))))
            .await
            .unwrap();
        let summary = w.service.get_invoice(id).await.unwrap();
        assert_eq!(summary.status, InvoiceStatus::PartiallyRefunded);
        assert_eq!(summary.balance, cad(dec!(164)));
    }

    #[tokio::test]
    async fn test_payment_on_draft_rejected() {
        let w = world().await;
        let id = w
            .service
            .create_invoice(create_request(w.bc_customer, &[(w.widget, dec!(1))]))
            .await
            .unwrap();

        let err = w
            .service
            .process_payment(payment_request(id, cad(dec!(10))))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_half_refund_is_partial() {
        let w = world().await;
        let id = sent_invoice(&w).await;
        w.service
            .process_payment(payment_request(id, cad(dec!(224))))
            .await
            .unwrap();

        w.service
            .process_refund(refund_request(id, cad(dec!(112))))
            .await
            .unwrap();

        let summary = w.service.get_invoice(id).await.unwrap();
        assert_eq!(summary.status, InvoiceStatus::PartiallyRefunded);
        assert_eq!(summary.total_refunded, cad(dec!(112)));
        assert_eq!(summary.balance, cad(dec!(112)));
        assert_eq!(summary.refunds.len(), 1);
    }

    #[tokio::test]
    async fn test_full_refund_after_partial() {
        let w = world().await;
        let id = sent_invoice(&w).await;
        w.service
            .process_payment(payment_request(id, cad(dec!(224))))
            .await
            .unwrap();
        w.service
            .process_refund(refund_request(id, cad(dec!(24))))
            .await
            .unwrap();
        w.service
            .process_refund(refund_request(id, cad(dec!(200))))
            .await
            .unwrap();

        let summary = w.service.get_invoice(id).await.unwrap();
        assert_eq!(summary.status, InvoiceStatus::Refunded);
        assert_eq!(summary.balance, summary.total);
    }

    #[tokio::test]
    async fn test_refund_over_cap_leaves_invoice_unchanged() {
        let w = world().await;
        let id = sent_invoice(&w).await;
        w.service
            .process_payment(payment_request(id, cad(dec!(224))))
            .await
            .unwrap();
        let before = w.service.get_invoice(id).await.unwrap();

        let err = w
            .service
            .process_refund(refund_request(id, cad(dec!(224.01))))
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::RefundExceedsRefundable { .. }));

        let after = w.service.get_invoice(id).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_cancel_after_payment_rejected() {
        let w = world().await;
        let id = sent_invoice(&w).await;
        w.service
            .process_payment(payment_request(id, cad(dec!(50))))
            .await
            .unwrap();

        let err = w.service.cancel_invoice(id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_overdue_then_paid() {
        let w = world().await;
        let id = sent_invoice(&w).await;

        w.service.mark_overdue(id, date(2024, 7, 2)).await.unwrap();
        assert_eq!(
            w.service.get_invoice(id).await.unwrap().status,
            InvoiceStatus::Overdue
        );

        w.service
            .process_payment(payment_request(id, cad(dec!(224))))
            .await
            .unwrap();
        assert_eq!(
            w.service.get_invoice(id).await.unwrap().status,
            InvoiceStatus::Paid
        );
    }
}

// ============================================================================
// Persistence
// ============================================================================

mod repository_tests {
    use super::*;

    #[tokio::test]
    async fn test_stale_writer_gets_conflict() {
        let w = world().await;
        let id = w
            .service
            .create_invoice(create_request(w.bc_customer, &[(w.widget, dec!(1))]))
            .await
            .unwrap();

        let mut first = w.invoices.get_invoice(id).await.unwrap();
        let mut second = w.invoices.get_invoice(id).await.unwrap();

        first.notes = Some("first".to_string());
        w.invoices.save_invoice(first).await.unwrap();

        second.notes = Some("second".to_string());
        let err = w.invoices.save_invoice(second).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let stored = w.invoices.get_invoice(id).await.unwrap();
        assert_eq!(stored.notes.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_service_operations_bump_version() {
        let w = world().await;
        let id = w
            .service
            .create_invoice(create_request(w.bc_customer, &[(w.widget, dec!(1))]))
            .await
            .unwrap();
        let v1 = w.service.get_invoice(id).await.unwrap().version;

        w.service.submit_invoice(id).await.unwrap();
        let v2 = w.service.get_invoice(id).await.unwrap().version;
        assert_eq!(v2, v1 + 1);
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_sequential() {
        let w = world().await;
        let a = w
            .service
            .create_invoice(create_request(w.bc_customer, &[(w.widget, dec!(1))]))
            .await
            .unwrap();
        let b = w
            .service
            .create_invoice(create_request(w.bc_customer, &[(w.widget, dec!(1))]))
            .await
            .unwrap();

        assert_eq!(w.service.get_invoice(a).await.unwrap().invoice_number, "INV-000001");
        assert_eq!(w.service.get_invoice(b).await.unwrap().invoice_number, "INV-000002");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;
    use domain_catalog::{AppliedTaxRate, ItemType};
    use proptest::prelude::*;

    fn snapshot(cents: i64) -> ItemSnapshot {
        ItemSnapshot {
            item_id: ItemId::new(),
            sku: "SKU".to_string(),
            name: "Thing".to_string(),
            description: None,
            unit_price: Money::from_minor(cents, Currency::CAD),
            unit_type: None,
            item_type: ItemType::Product,
            item_category: None,
            tax_code: None,
            tax_treatment: TaxTreatment::Standard,
        }
    }

    fn hst() -> AppliedTaxRate {
        AppliedTaxRate {
            tax_id: core_kernel::TaxId::new(),
            tax_code: "HST-ON".to_string(),
            tax_name: "Harmonized Sales Tax".to_string(),
            rate: Rate::from_percentage(dec!(13)),
        }
    }

    fn sent_invoice(lines: &[(i64, u32)]) -> Invoice {
        let mut invoice = Invoice::new(
            "INV-000001",
            CustomerId::new(),
            ProvinceCode::parse("ON").unwrap(),
            Currency::CAD,
            date(2024, 6, 1),
        );
        for (cents, qty) in lines {
            let mut line = LineItem::new(snapshot(*cents), Decimal::from(*qty)).unwrap();
            line.apply_taxes(vec![hst()]).unwrap();
            invoice.add_line_item(line).unwrap();
        }
        invoice.submit().unwrap();
        invoice.mark_sent().unwrap();
        invoice
    }

    proptest! {
        #[test]
        fn paying_amount_due_settles(
            lines in prop::collection::vec((1i64..100_000, 1u32..20), 1..6)
        ) {
            let mut invoice = sent_invoice(&lines);
            let due = invoice.amount_due();
            let payment = Payment::new(due, PaymentMethod::Cash, "", date(2024, 6, 2)).unwrap();
            invoice.process_payment(payment).unwrap();

            prop_assert_eq!(invoice.status(), InvoiceStatus::Paid);
            prop_assert!(invoice.amount_due().is_zero());
        }

        #[test]
        fn refund_restores_balance(
            lines in prop::collection::vec((1i64..100_000, 1u32..20), 1..6),
            fraction in 1u32..=100
        ) {
            let mut invoice = sent_invoice(&lines);
            let due = invoice.amount_due();
            let payment = Payment::new(due, PaymentMethod::Cash, "", date(2024, 6, 2)).unwrap();
            invoice.process_payment(payment).unwrap();
            let settled_balance = invoice.balance();

            let amount = (due * (Decimal::from(fraction) / Decimal::from(100))).round_to_currency();
            prop_assume!(amount.is_positive());
            let refund = Refund::new(amount, "test", date(2024, 6, 3)).unwrap();
            invoice.process_refund(refund).unwrap();

            prop_assert_eq!(invoice.balance(), settled_balance + amount);
            prop_assert!(invoice.refundable_amount().amount() >= Decimal::ZERO);
            let expected = if amount == due {
                InvoiceStatus::Refunded
            } else {
                InvoiceStatus::PartiallyRefunded
            };
            prop_assert_eq!(invoice.status(), expected);
        }
    }
}
