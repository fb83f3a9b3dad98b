//! Taxes and their effective-dated rates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{latest_in_effect, Effective, EffectivePeriod, Rate, TaxId, TaxRateId};

use crate::error::CatalogError;

/// How an item participates in sales tax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxTreatment {
    /// Taxed at the jurisdiction's rates
    #[default]
    Standard,
    /// Taxable supply at a 0% rate
    ZeroRated,
    /// Not subject to tax
    Exempt,
    /// Outside the scope of sales tax
    OutOfScope,
}

impl TaxTreatment {
    /// Returns true when jurisdiction rates apply
    pub fn is_taxable(&self) -> bool {
        matches!(self, TaxTreatment::Standard)
    }
}

/// A rate value valid for a date window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    pub id: TaxRateId,
    pub rate: Rate,
    pub period: EffectivePeriod,
    pub is_active: bool,
}

impl Effective for TaxRate {
    fn period(&self) -> &EffectivePeriod {
        &self.period
    }

    fn is_resolvable(&self) -> bool {
        self.is_active
    }
}

/// A named tax (GST, PST, HST, QST) and its rate history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tax {
    pub id: TaxId,
    pub code: String,
    pub name: String,
    rates: Vec<TaxRate>,
}

impl Tax {
    /// Creates a tax with no rates
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: TaxId::new_v7(),
            code: code.into(),
            name: name.into(),
            rates: Vec::new(),
        }
    }

    /// Adds an active rate for the given window
    pub fn add_tax_rate(
        &mut self,
        rate: Rate,
        effective_date: NaiveDate,
        expiration_date: Option<NaiveDate>,
    ) -> Result<TaxRateId, CatalogError> {
        if rate.as_decimal().is_sign_negative() && !rate.as_decimal().is_zero() {
            return Err(CatalogError::NegativeTaxRate(rate.to_string()));
        }
        Rate::try_new(rate.as_decimal())?;
        let period = EffectivePeriod::new(effective_date, expiration_date)?;
        let id = TaxRateId::new_v7();
        self.rates.push(TaxRate {
            id,
            rate,
            period,
            is_active: true,
        });
        Ok(id)
    }

    /// Deactivates a rate so it is never resolved again
    pub fn deactivate_rate(&mut self, rate_id: TaxRateId) -> Result<(), CatalogError> {
        let rate = self
            .rates
            .iter_mut()
            .find(|r| r.id == rate_id)
            .ok_or_else(|| CatalogError::TaxRateNotFound(rate_id.to_string()))?;
        rate.is_active = false;
        Ok(())
    }

    /// The active rate in effect on `date`
    pub fn tax_rate_on(&self, date: NaiveDate) -> Option<&TaxRate> {
        latest_in_effect(&self.rates, date)
    }

    /// The rate in effect on `date`, tagged with this tax's identity
    pub fn applied_rate_on(&self, date: NaiveDate) -> Option<AppliedTaxRate> {
        self.tax_rate_on(date).map(|r| AppliedTaxRate {
            tax_id: self.id,
            tax_code: self.code.clone(),
            tax_name: self.name.clone(),
            rate: r.rate,
        })
    }

    pub fn rates(&self) -> &[TaxRate] {
        &self.rates
    }
}

/// A tax rate resolved for a date and attached to a line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedTaxRate {
    pub tax_id: TaxId,
    pub tax_code: String,
    pub tax_name: String,
    pub rate: Rate,
}
