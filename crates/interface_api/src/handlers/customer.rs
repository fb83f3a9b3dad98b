//! Customer handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use validator::Validate;

use core_kernel::{CustomerId, ProvinceCode};
use domain_party::{Address, AddressType, Customer, Email, PartyError};

use crate::dto::customer::{CreateCustomerRequest, CustomerResponse};
use crate::dto::CreatedResponse;
use crate::{error::ApiError, AppState};

/// Registers a customer with a primary billing address
pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<CustomerId>>), ApiError> {
    request.validate()?;

    let province = ProvinceCode::parse(&request.billing_address.province).map_err(PartyError::from)?;
    let mut customer = Customer::new(request.name)?;
    if let Some(email) = request.email {
        customer = customer.with_email(Email::parse(&email)?);
    }
    if let Some(certificate) = request.tax_exempt_certificate {
        customer = customer.with_exemption(certificate);
    }

    let address = request.billing_address;
    let mut billing = Address::new(
        AddressType::Billing,
        address.line1,
        address.city,
        province,
        address.postal_code,
    )
    .primary();
    if let Some(line2) = address.line2 {
        billing = billing.with_line2(line2);
    }
    customer.add_address(billing);

    let id = customer.id;
    state.customers.save_customer(customer).await?;
    info!(customer_id = %id, %province, "Customer registered");

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Gets a customer by ID
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer = state.customers.get_customer(id).await?;
    Ok(Json(CustomerResponse::from(&customer)))
}
