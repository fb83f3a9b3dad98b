//! Effective-date windows
//!
//! Prices and tax rates are time-bounded records. A record is *in effect* on a
//! date when `effective_date <= date <= expiration_date`, with a missing
//! expiration meaning the window is open-ended. Both ends are inclusive.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: expiration {expiration} is before effective date {effective}")]
    InvalidPeriod {
        effective: String,
        expiration: String,
    },
}

/// A date window during which a record applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectivePeriod {
    /// First day the record applies (inclusive)
    pub effective_date: NaiveDate,
    /// Last day the record applies (inclusive), None means open-ended
    pub expiration_date: Option<NaiveDate>,
}

impl EffectivePeriod {
    /// Creates a new window, rejecting an expiration before the effective date
    pub fn new(
        effective_date: NaiveDate,
        expiration_date: Option<NaiveDate>,
    ) -> Result<Self, TemporalError> {
        if let Some(expiration) = expiration_date {
            if expiration < effective_date {
                return Err(TemporalError::InvalidPeriod {
                    effective: effective_date.to_string(),
                    expiration: expiration.to_string(),
                });
            }
        }
        Ok(Self {
            effective_date,
            expiration_date,
        })
    }

    /// Creates a window with no expiration
    pub fn open_ended(effective_date: NaiveDate) -> Self {
        Self {
            effective_date,
            expiration_date: None,
        }
    }

    /// Returns true if the window contains the given date
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.effective_date && self.expiration_date.map_or(true, |e| date <= e)
    }

    /// Returns true if the two windows share at least one day
    pub fn overlaps(&self, other: &EffectivePeriod) -> bool {
        let self_end = self.expiration_date.unwrap_or(NaiveDate::MAX);
        let other_end = other.expiration_date.unwrap_or(NaiveDate::MAX);

        self.effective_date <= other_end && other.effective_date <= self_end
    }

    /// Returns true if the window has no expiration
    pub fn is_open_ended(&self) -> bool {
        self.expiration_date.is_none()
    }
}

/// A record carrying an effective window
pub trait Effective {
    /// The window during which the record applies
    fn period(&self) -> &EffectivePeriod;

    /// Whether the record may be resolved at all (e.g. deactivated rates)
    fn is_resolvable(&self) -> bool {
        true
    }
}

/// Resolves the record in effect on `date`
///
/// Among the resolvable records whose window contains `date`, the one with the
/// latest effective date wins. Records sharing an effective date are ordered by
/// insertion: the one added last wins.
pub fn latest_in_effect<T: Effective>(records: &[T], date: NaiveDate) -> Option<&T> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_resolvable() && r.period().contains(date))
        .max_by_key(|(index, r)| (r.period().effective_date, *index))
        .map(|(_, r)| r)
}
