//! Catalog item handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use validator::Validate;

use core_kernel::{ItemId, Money};
use domain_catalog::{Item, ItemType};

use crate::dto::item::{CreateItemRequest, ItemResponse};
use crate::dto::CreatedResponse;
use crate::{error::ApiError, AppState};

/// Adds an item to the catalog with its first price
pub async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<ItemId>>), ApiError> {
    request.validate()?;
    let currency = state.config.currency;

    let mut item = match request.item_type {
        ItemType::Product => Item::product(request.sku, request.name, currency)?,
        ItemType::Service => {
            let basis = request.billing_basis.ok_or_else(|| {
                ApiError::Validation("billing_basis is required for services".to_string())
            })?;
            Item::service(request.sku, request.name, basis, currency)?
        }
    };
    if let Some(description) = request.description {
        item = item.with_description(description);
    }
    if let Some(category) = request.category {
        item = item.with_category(category);
    }
    let item = item.with_tax_treatment(request.tax_treatment).with_price(
        Money::new(request.unit_price, currency),
        request.effective_date,
        request.expiration_date,
    )?;

    let id = item.id;
    info!(item_id = %id, sku = %item.sku, "Item created");
    state.items.save_item(item).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Gets an item with its price history
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = state.items.get_item(id).await?;
    Ok(Json(ItemResponse::from(&item)))
}
