//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the invoicing
//! system. These fixtures are consistent and predictable for unit tests.

use chrono::NaiveDate;
use core_kernel::{Currency, CustomerId, ItemId, Money, ProvinceCode, Rate, TaxId};
use domain_catalog::AppliedTaxRate;
use fake::faker::company::en::CompanyName;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Creates a CAD amount
    pub fn cad(amount: Decimal) -> Money {
        Money::new(amount, Currency::CAD)
    }

    /// Standard CAD amount for testing
    pub fn cad_100() -> Money {
        Self::cad(dec!(100.00))
    }

    pub fn cad_zero() -> Money {
        Money::zero(Currency::CAD)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for calendar dates
pub struct DateFixtures;

impl DateFixtures {
    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
    }

    /// Date catalog prices take effect
    pub fn catalog_start() -> NaiveDate {
        Self::date(2024, 1, 1)
    }

    /// Standard invoice date
    pub fn invoice_date() -> NaiveDate {
        Self::date(2024, 6, 1)
    }

    /// Thirty days after the invoice date
    pub fn due_date() -> NaiveDate {
        Self::date(2024, 7, 1)
    }

    /// A day past the due date
    pub fn past_due() -> NaiveDate {
        Self::date(2024, 7, 2)
    }
}

/// Fixture for provinces
pub struct ProvinceFixtures;

impl ProvinceFixtures {
    pub fn code(code: &str) -> ProvinceCode {
        ProvinceCode::parse(code).expect("valid fixture province")
    }

    pub fn bc() -> ProvinceCode {
        Self::code("BC")
    }

    pub fn on() -> ProvinceCode {
        Self::code("ON")
    }

    pub fn qc() -> ProvinceCode {
        Self::code("QC")
    }
}

/// Fixture for tax rates as the tax provider returns them
pub struct TaxFixtures;

impl TaxFixtures {
    pub fn applied(code: &str, name: &str, percentage: Decimal) -> AppliedTaxRate {
        AppliedTaxRate {
            tax_id: TaxId::new(),
            tax_code: code.to_string(),
            tax_name: name.to_string(),
            rate: Rate::from_percentage(percentage),
        }
    }

    pub fn gst() -> AppliedTaxRate {
        Self::applied("GST", "Goods and Services Tax", dec!(5))
    }

    pub fn pst_bc() -> AppliedTaxRate {
        Self::applied("PST-BC", "British Columbia Provincial Sales Tax", dec!(7))
    }

    pub fn hst_on() -> AppliedTaxRate {
        Self::applied("HST-ON", "Harmonized Sales Tax", dec!(13))
    }
}

/// Fixture for identifiers and text
pub struct IdFixtures;

impl IdFixtures {
    pub fn customer_id() -> CustomerId {
        CustomerId::new()
    }

    pub fn item_id() -> ItemId {
        ItemId::new()
    }

    /// A random company name for customer fixtures
    pub fn company_name() -> String {
        CompanyName().fake()
    }
}
