//! Request and response bodies

pub mod customer;
pub mod invoice;
pub mod item;

use rust_decimal::Decimal;
use validator::ValidationError;

pub(crate) fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_positive"))
    }
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("must_not_be_negative"))
    }
}

/// Identifier of a newly created resource
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct CreatedResponse<T> {
    pub id: T,
}
