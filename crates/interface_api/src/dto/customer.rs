//! Customer DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::CustomerId;
use domain_party::Customer;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    /// Exemption certificate; its presence makes the customer tax exempt
    pub tax_exempt_certificate: Option<String>,
    #[validate(nested)]
    pub billing_address: AddressRequest,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AddressRequest {
    #[validate(length(min = 1, message = "Address line is required"))]
    pub line1: String,
    pub line2: Option<String>,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(equal = 2, message = "Province must be a two-letter code"))]
    pub province: String,
    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CustomerResponse {
    pub id: CustomerId,
    pub name: String,
    pub email: Option<String>,
    pub tax_exempt: bool,
    pub billing_province: Option<String>,
    pub is_active: bool,
}

impl From<&Customer> for CustomerResponse {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            email: customer.email.as_ref().map(|e| e.as_str().to_string()),
            tax_exempt: customer.is_tax_exempt(),
            billing_province: customer
                .billing_province()
                .ok()
                .map(|p| p.as_str().to_string()),
            is_active: customer.is_active,
        }
    }
}
