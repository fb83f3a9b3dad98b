//! Invoice handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use validator::Validate;

use core_kernel::{
    DiscountId, InvoiceId, LineItemId, Money, PaymentId, RefundId, SurchargeId,
};
use domain_billing::{
    Discount, DiscountScope, InvoiceSummary, PaymentMethod, ProcessPaymentRequest,
    ProcessRefundRequest, Surcharge, GatewayInfo,
};

use crate::dto::invoice::*;
use crate::dto::CreatedResponse;
use crate::{error::ApiError, AppState};

type Created<T> = (StatusCode, Json<CreatedResponse<T>>);

fn created<T>(id: T) -> Created<T> {
    (StatusCode::CREATED, Json(CreatedResponse { id }))
}

/// Creates a draft invoice
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceDto>,
) -> Result<Created<InvoiceId>, ApiError> {
    request.validate()?;
    let id = state
        .service
        .create_invoice(request.into_request(state.config.currency))
        .await?;
    Ok(created(id))
}

/// Gets an invoice with all derived totals
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<Json<InvoiceSummary>, ApiError> {
    Ok(Json(state.service.get_invoice(id).await?))
}

pub async fn add_line_item(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
    Json(request): Json<InvoiceItemDto>,
) -> Result<Created<LineItemId>, ApiError> {
    request.validate()?;
    let line_id = state
        .service
        .add_line_item(id, request.item_id, request.quantity)
        .await?;
    Ok(created(line_id))
}

pub async fn remove_line_item(
    State(state): State<AppState>,
    Path((id, line_id)): Path<(InvoiceId, LineItemId)>,
) -> Result<StatusCode, ApiError> {
    state.service.remove_line_item(id, line_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_line_item_quantity(
    State(state): State<AppState>,
    Path((id, line_id)): Path<(InvoiceId, LineItemId)>,
    Json(request): Json<QuantityDto>,
) -> Result<Json<InvoiceSummary>, ApiError> {
    request.validate()?;
    state
        .service
        .change_line_item_quantity(id, line_id, request.quantity)
        .await?;
    Ok(Json(state.service.get_invoice(id).await?))
}

pub async fn reorder_line_items(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
    Json(request): Json<ReorderDto>,
) -> Result<Json<InvoiceSummary>, ApiError> {
    request.validate()?;
    state
        .service
        .reorder_line_items(id, request.line_item_ids)
        .await?;
    Ok(Json(state.service.get_invoice(id).await?))
}

pub async fn add_line_item_discount(
    State(state): State<AppState>,
    Path((id, line_id)): Path<(InvoiceId, LineItemId)>,
    Json(request): Json<AdjustmentDto>,
) -> Result<Created<DiscountId>, ApiError> {
    let discount = discount_from(&state, request, DiscountScope::PerItem)?;
    let discount_id = state
        .service
        .add_line_item_discount(id, line_id, discount)
        .await?;
    Ok(created(discount_id))
}

pub async fn apply_order_discount(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
    Json(request): Json<AdjustmentDto>,
) -> Result<Created<DiscountId>, ApiError> {
    let discount = discount_from(&state, request, DiscountScope::PerOrder)?;
    let discount_id = state.service.apply_order_discount(id, discount).await?;
    Ok(created(discount_id))
}

pub async fn add_surcharge(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
    Json(request): Json<AdjustmentDto>,
) -> Result<Created<SurchargeId>, ApiError> {
    request.validate()?;
    let kind = request.kind(state.config.currency)?;
    let surcharge = Surcharge::new(request.name, kind)?;
    let surcharge_id = state.service.add_surcharge(id, surcharge).await?;
    Ok(created(surcharge_id))
}

pub async fn set_shipping(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
    Json(request): Json<ShippingDto>,
) -> Result<Json<InvoiceSummary>, ApiError> {
    request.validate()?;
    state
        .service
        .set_shipping(id, request.into_request(state.config.currency))
        .await?;
    Ok(Json(state.service.get_invoice(id).await?))
}

// ============================================================================
// Lifecycle
// ============================================================================

pub async fn submit_invoice(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<Json<InvoiceSummary>, ApiError> {
    state.service.submit_invoice(id).await?;
    Ok(Json(state.service.get_invoice(id).await?))
}

pub async fn send_invoice(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<Json<InvoiceSummary>, ApiError> {
    state.service.send_invoice(id).await?;
    Ok(Json(state.service.get_invoice(id).await?))
}

pub async fn cancel_invoice(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<Json<InvoiceSummary>, ApiError> {
    state.service.cancel_invoice(id).await?;
    Ok(Json(state.service.get_invoice(id).await?))
}

pub async fn mark_overdue(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
    request: Option<Json<OverdueDto>>,
) -> Result<Json<InvoiceSummary>, ApiError> {
    let today = request
        .and_then(|Json(dto)| dto.today)
        .unwrap_or_else(|| Utc::now().date_naive());
    state.service.mark_overdue(id, today).await?;
    Ok(Json(state.service.get_invoice(id).await?))
}

// ============================================================================
// Payments and refunds
// ============================================================================

pub async fn process_payment(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
    Json(request): Json<PaymentDto>,
) -> Result<Created<PaymentId>, ApiError> {
    request.validate()?;
    let method = PaymentMethod::parse(&request.method)?;
    let gateway = match (request.gateway_name, request.transaction_id) {
        (Some(gateway_name), Some(transaction_id)) => Some(GatewayInfo {
            gateway_name,
            transaction_id,
        }),
        (None, None) => None,
        _ => {
            return Err(ApiError::Validation(
                "gateway_name and transaction_id must be given together".to_string(),
            ))
        }
    };

    let payment_id = state
        .service
        .process_payment(ProcessPaymentRequest {
            invoice_id: id,
            amount: Money::new(request.amount, state.config.currency),
            method,
            reference_number: request.reference_number,
            payment_date: request.payment_date.unwrap_or_else(|| Utc::now().date_naive()),
            gateway,
        })
        .await?;
    Ok(created(payment_id))
}

pub async fn process_refund(
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
    Json(request): Json<RefundDto>,
) -> Result<Created<RefundId>, ApiError> {
    request.validate()?;
    let refund_id = state
        .service
        .process_refund(ProcessRefundRequest {
            invoice_id: id,
            original_payment_id: request.original_payment_id,
            amount: Money::new(request.amount, state.config.currency),
            reason: request.reason,
            refund_date: request.refund_date.unwrap_or_else(|| Utc::now().date_naive()),
        })
        .await?;
    Ok(created(refund_id))
}

fn discount_from(
    state: &AppState,
    request: AdjustmentDto,
    scope: DiscountScope,
) -> Result<Discount, ApiError> {
    request.validate()?;
    let currency = state.config.currency;
    let kind = request.kind(currency)?;
    let mut discount = Discount::new(request.name, kind, scope)?;
    if let Some(minimum) = request.minimum_amount {
        discount = discount.with_minimum(Money::new(minimum, currency));
    }
    Ok(discount)
}
