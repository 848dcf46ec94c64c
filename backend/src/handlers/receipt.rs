//! HTTP handlers for goods receipt endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::ReceiptStatus;
use crate::services::receipt::{
    CreateReceiptInput, Receipt, ReceiptService, UpdateReceiptInput,
};
use crate::AppState;
use shared::types::{PageParams, Paginated};

/// Query parameters for listing receipts
#[derive(Debug, Deserialize)]
pub struct ListReceiptsQuery {
    pub status: Option<String>,
    pub warehouse: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// List receipts
pub async fn list_receipts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListReceiptsQuery>,
) -> AppResult<Json<Paginated<Receipt>>> {
    let status = query
        .status
        .as_deref()
        .map(ReceiptStatus::from_str)
        .transpose()
        .map_err(AppError::ValidationError)?;
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };

    let service = ReceiptService::new(state.db);
    let receipts = service
        .list(status, query.warehouse, params.page(), params.limit())
        .await?;
    Ok(Json(receipts))
}

/// Get a single receipt
pub async fn get_receipt(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(receipt_id): Path<Uuid>,
) -> AppResult<Json<Receipt>> {
    let service = ReceiptService::new(state.db);
    let receipt = service.get(receipt_id).await?;
    Ok(Json(receipt))
}

/// Create a new receipt
pub async fn create_receipt(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateReceiptInput>,
) -> AppResult<Json<Receipt>> {
    let service = ReceiptService::new(state.db);
    let receipt = service.create(input).await?;
    Ok(Json(receipt))
}

/// Update a receipt
pub async fn update_receipt(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(receipt_id): Path<Uuid>,
    Json(input): Json<UpdateReceiptInput>,
) -> AppResult<Json<Receipt>> {
    let service = ReceiptService::new(state.db);
    let receipt = service.update(receipt_id, input).await?;
    Ok(Json(receipt))
}

/// Validate a receipt, booking its lines into stock and the ledger
pub async fn validate_receipt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(receipt_id): Path<Uuid>,
) -> AppResult<Json<Receipt>> {
    current_user.0.require_manager()?;
    let service = ReceiptService::new(state.db);
    let receipt = service.validate(receipt_id, current_user.0.user_id).await?;
    Ok(Json(receipt))
}

/// Delete a receipt
pub async fn delete_receipt(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(receipt_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ReceiptService::new(state.db);
    service.delete(receipt_id).await?;
    Ok(Json(()))
}
