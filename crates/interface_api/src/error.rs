//! API error handling
//!
//! Domain errors are translated by [`ErrorKind`], so new domain variants get a
//! status code without touching this module.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{ErrorKind, PortError};
use domain_billing::BillingError;
use domain_catalog::CatalogError;
use domain_party::PartyError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Operation not allowed: {0}")]
    Unprocessable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ApiError {
    /// Maps a domain failure class onto an API error
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::InvalidArgument => ApiError::BadRequest(message),
            ErrorKind::InvalidOperation => ApiError::Unprocessable(message),
            ErrorKind::Conflict => ApiError::Conflict(message),
            ErrorKind::Unavailable => ApiError::Unavailable(message),
            ErrorKind::Internal => ApiError::Internal(message),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => ErrorKind::NotFound.as_str(),
            ApiError::BadRequest(_) => ErrorKind::InvalidArgument.as_str(),
            ApiError::Validation(_) => "validation_error",
            ApiError::Unprocessable(_) => ErrorKind::InvalidOperation.as_str(),
            ApiError::Conflict(_) => ErrorKind::Conflict.as_str(),
            ApiError::Unavailable(_) => ErrorKind::Unavailable.as_str(),
            ApiError::Internal(_) => ErrorKind::Internal.as_str(),
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Validation(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unavailable(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.error_type().to_string(),
            message: self.message().to_string(),
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        ApiError::from_kind(err.kind(), err.to_string())
    }
}

impl From<PartyError> for ApiError {
    fn from(err: PartyError) -> Self {
        ApiError::from_kind(err.kind(), err.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::from_kind(err.kind(), err.to_string())
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        ApiError::from_kind(err.kind(), err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_errors_map_by_kind() {
        let not_found: ApiError = BillingError::InvoiceNotFound("x".into()).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let refused: ApiError = BillingError::RefundExceedsRefundable {
            amount: "10".into(),
            refundable: "5".into(),
        }
        .into();
        assert_eq!(refused.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let stale: ApiError = BillingError::Port(PortError::conflict("stale")).into();
        assert_eq!(stale.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_type_uses_kind_names() {
        let err = ApiError::from_kind(ErrorKind::InvalidArgument, "bad quantity");
        assert_eq!(err.error_type(), "invalid_argument");
        assert_eq!(err.message(), "bad quantity");
    }
}
