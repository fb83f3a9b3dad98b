//! Customer domain integration tests

use proptest::prelude::*;

use core_kernel::{CustomerId, ErrorKind, ProvinceCode};
use domain_party::*;

fn billing(province: &str) -> Address {
    Address::new(
        AddressType::Billing,
        "200 Bay St",
        "Toronto",
        ProvinceCode::parse(province).unwrap(),
        "M5J 2J2",
    )
}

// ============================================================================
// Customer Tests
// ============================================================================

mod customer_tests {
    use super::*;

    #[test]
    fn test_exempt_customer() {
        let customer = Customer::new("First Nations Band Council")
            .unwrap()
            .with_exemption("CERT-0042");

        assert!(customer.is_tax_exempt());
        assert_eq!(
            customer.tax_status,
            TaxStatus::Exempt {
                certificate: "CERT-0042".to_string()
            }
        );
    }

    #[test]
    fn test_customer_serialization() {
        let mut customer = Customer::new("Acme")
            .unwrap()
            .with_email(Email::parse("ar@acme.example").unwrap());
        customer.add_address(billing("MB").primary());

        let json = serde_json::to_string(&customer).unwrap();
        let restored: Customer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, customer);
        assert_eq!(restored.billing_province().unwrap().as_str(), "MB");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(PartyError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(
            PartyError::NoBillingAddress("x".into()).kind(),
            ErrorKind::InvalidOperation
        );
        assert_eq!(Email::parse("bad").unwrap_err().kind(), ErrorKind::InvalidArgument);
    }
}

// ============================================================================
// Repository Tests
// ============================================================================

mod repository_tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_get() {
        let repo = InMemoryCustomerRepository::new();
        let mut customer = Customer::new("Acme").unwrap();
        customer.add_address(billing("ON"));
        let id = customer.id;

        repo.save_customer(customer).await.unwrap();
        let loaded = repo.get_customer(id).await.unwrap();
        assert_eq!(loaded.name, "Acme");
    }

    #[tokio::test]
    async fn test_missing_customer() {
        let repo = InMemoryCustomerRepository::with_customers(vec![]).await;
        let err = repo.get_customer(CustomerId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}

proptest! {
    #[test]
    fn prop_billing_province_comes_from_an_address(picks in prop::collection::vec(0usize..13, 1..6)) {
        let codes = ProvinceCode::all();
        let mut customer = Customer::new("Prop").unwrap();
        for pick in &picks {
            customer.add_address(billing(codes[*pick].as_str()));
        }

        let province = customer.billing_province().unwrap();
        prop_assert!(customer.addresses().iter().any(|a| a.province == province));
        prop_assert_eq!(province, codes[picks[0]]);
    }
}
