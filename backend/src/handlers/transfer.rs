//! HTTP handlers for internal transfer endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::TransferStatus;
use crate::services::transfer::{
    CreateTransferInput, Transfer, TransferService, UpdateTransferInput,
};
use crate::AppState;
use shared::types::{PageParams, Paginated};

/// Query parameters for listing transfers
#[derive(Debug, Deserialize)]
pub struct ListTransfersQuery {
    pub status: Option<String>,
    pub source_warehouse: Option<Uuid>,
    pub destination_warehouse: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// List transfers
pub async fn list_transfers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListTransfersQuery>,
) -> AppResult<Json<Paginated<Transfer>>> {
    let status = query
        .status
        .as_deref()
        .map(TransferStatus::from_str)
        .transpose()
        .map_err(AppError::ValidationError)?;
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };

    let service = TransferService::new(state.db);
    let transfers = service
        .list(
            status,
            query.source_warehouse,
            query.destination_warehouse,
            params.page(),
            params.limit(),
        )
        .await?;
    Ok(Json(transfers))
}

/// Get a single transfer
pub async fn get_transfer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<Json<Transfer>> {
    let service = TransferService::new(state.db);
    let transfer = service.get(transfer_id).await?;
    Ok(Json(transfer))
}

/// Create a new transfer
pub async fn create_transfer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateTransferInput>,
) -> AppResult<Json<Transfer>> {
    let service = TransferService::new(state.db);
    let transfer = service.create(input).await?;
    Ok(Json(transfer))
}

/// Update a transfer
pub async fn update_transfer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
    Json(input): Json<UpdateTransferInput>,
) -> AppResult<Json<Transfer>> {
    let service = TransferService::new(state.db);
    let transfer = service.update(transfer_id, input).await?;
    Ok(Json(transfer))
}

/// Complete a transfer, moving its lines between stock rows
pub async fn complete_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<Json<Transfer>> {
    let service = TransferService::new(state.db);
    let transfer = service
        .complete(transfer_id, current_user.0.user_id)
        .await?;
    Ok(Json(transfer))
}

/// Delete a transfer
pub async fn delete_transfer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = TransferService::new(state.db);
    service.delete(transfer_id).await?;
    Ok(Json(()))
}
