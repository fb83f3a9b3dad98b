//! Canadian sales tax reference data
//!
//! Provinces and the taxes levied in each, with the rate history needed to
//! price invoices dated since 2008.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ProvinceCode, Rate, TaxId};

use crate::error::CatalogError;
use crate::province::Province;
use crate::tax::Tax;

/// Provinces, taxes and which taxes each province levies
#[derive(Debug, Clone)]
pub struct CanadianTaxSeed {
    pub provinces: Vec<Province>,
    pub taxes: Vec<Tax>,
    pub assignments: Vec<(ProvinceCode, TaxId)>,
}

const PROVINCES: [(&str, &str, bool); 13] = [
    ("AB", "Alberta", false),
    ("BC", "British Columbia", false),
    ("MB", "Manitoba", false),
    ("NB", "New Brunswick", true),
    ("NL", "Newfoundland and Labrador", true),
    ("NS", "Nova Scotia", true),
    ("NT", "Northwest Territories", false),
    ("NU", "Nunavut", false),
    ("ON", "Ontario", true),
    ("PE", "Prince Edward Island", true),
    ("QC", "Quebec", false),
    ("SK", "Saskatchewan", false),
    ("YT", "Yukon", false),
];

fn ymd(y: i32, m: u32, d: u32) -> Result<NaiveDate, CatalogError> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| CatalogError::InvalidReferenceData(format!("invalid date {y}-{m}-{d}")))
}

fn tax_with_rate(
    code: &str,
    name: &str,
    rate: Decimal,
    effective: NaiveDate,
) -> Result<Tax, CatalogError> {
    let mut tax = Tax::new(code, name);
    tax.add_tax_rate(Rate::new(rate), effective, None)?;
    Ok(tax)
}

/// The 13 Canadian provinces and territories
pub fn canadian_provinces() -> Result<Vec<Province>, CatalogError> {
    PROVINCES
        .iter()
        .map(|(code, name, is_hst)| -> Result<Province, CatalogError> {
            Ok(Province::new(ProvinceCode::parse(code)?, *name, *is_hst))
        })
        .collect()
}

/// Provinces plus GST, HST, PST, RST and QST with their rate history
pub fn canadian_taxes() -> Result<CanadianTaxSeed, CatalogError> {
    let provinces = canadian_provinces()?;
    let mut taxes = Vec::new();
    let mut assignments = Vec::new();

    let gst = tax_with_rate("GST", "Goods and Services Tax", dec!(0.05), ymd(2008, 1, 1)?)?;
    for code in ["AB", "BC", "MB", "NT", "NU", "QC", "SK", "YT"] {
        assignments.push((ProvinceCode::parse(code)?, gst.id));
    }
    taxes.push(gst);

    let hst_rates = [
        ("ON", dec!(0.13), ymd(2010, 7, 1)?),
        ("NB", dec!(0.15), ymd(2016, 7, 1)?),
        ("NL", dec!(0.15), ymd(2016, 7, 1)?),
        ("PE", dec!(0.15), ymd(2016, 10, 1)?),
    ];
    for (code, rate, effective) in hst_rates {
        let hst = tax_with_rate(
            &format!("HST-{code}"),
            &format!("Harmonized Sales Tax ({code})"),
            rate,
            effective,
        )?;
        assignments.push((ProvinceCode::parse(code)?, hst.id));
        taxes.push(hst);
    }

    let mut hst_ns = Tax::new("HST-NS", "Harmonized Sales Tax (NS)");
    hst_ns.add_tax_rate(Rate::new(dec!(0.15)), ymd(2010, 7, 1)?, Some(ymd(2025, 3, 31)?))?;
    hst_ns.add_tax_rate(Rate::new(dec!(0.14)), ymd(2025, 4, 1)?, None)?;
    assignments.push((ProvinceCode::parse("NS")?, hst_ns.id));
    taxes.push(hst_ns);

    let provincial = [
        ("BC", "PST-BC", "Provincial Sales Tax (BC)", dec!(0.07), ymd(2013, 4, 1)?),
        ("MB", "RST-MB", "Retail Sales Tax (MB)", dec!(0.07), ymd(2019, 7, 1)?),
        ("SK", "PST-SK", "Provincial Sales Tax (SK)", dec!(0.06), ymd(2017, 3, 23)?),
        ("QC", "QST", "Quebec Sales Tax", dec!(0.09975), ymd(2013, 1, 1)?),
    ];
    for (province, code, name, rate, effective) in provincial {
        let tax = tax_with_rate(code, name, rate, effective)?;
        assignments.push((ProvinceCode::parse(province)?, tax.id));
        taxes.push(tax);
    }

    Ok(CanadianTaxSeed {
        provinces,
        taxes,
        assignments,
    })
}
