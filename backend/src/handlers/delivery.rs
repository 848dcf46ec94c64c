//! HTTP handlers for delivery order endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::DeliveryStatus;
use crate::services::delivery::{
    CompleteDeliveryInput, CreateDeliveryInput, Delivery, DeliveryService, PackUpdate,
    PickUpdate, UpdateDeliveryInput,
};
use crate::AppState;
use shared::types::{PageParams, Paginated};

/// Query parameters for listing delivery orders
#[derive(Debug, Deserialize)]
pub struct ListDeliveriesQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Picking progress payload
#[derive(Debug, Deserialize)]
pub struct PickingInput {
    pub items: Vec<PickUpdate>,
}

/// Packing progress payload
#[derive(Debug, Deserialize)]
pub struct PackingInput {
    pub items: Vec<PackUpdate>,
}

/// List delivery orders
pub async fn list_deliveries(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListDeliveriesQuery>,
) -> AppResult<Json<Paginated<Delivery>>> {
    let status = query
        .status
        .as_deref()
        .map(DeliveryStatus::from_str)
        .transpose()
        .map_err(AppError::ValidationError)?;
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };

    let service = DeliveryService::new(state.db);
    let deliveries = service.list(status, params.page(), params.limit()).await?;
    Ok(Json(deliveries))
}

/// Get a single delivery order
pub async fn get_delivery(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(delivery_id): Path<Uuid>,
) -> AppResult<Json<Delivery>> {
    let service = DeliveryService::new(state.db);
    let delivery = service.get(delivery_id).await?;
    Ok(Json(delivery))
}

/// Create a new delivery order
pub async fn create_delivery(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateDeliveryInput>,
) -> AppResult<Json<Delivery>> {
    let service = DeliveryService::new(state.db);
    let delivery = service.create(input).await?;
    Ok(Json(delivery))
}

/// Update a delivery order
pub async fn update_delivery(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(delivery_id): Path<Uuid>,
    Json(input): Json<UpdateDeliveryInput>,
) -> AppResult<Json<Delivery>> {
    let service = DeliveryService::new(state.db);
    let delivery = service.update(delivery_id, input).await?;
    Ok(Json(delivery))
}

/// Record picking progress
pub async fn update_picking(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(delivery_id): Path<Uuid>,
    Json(input): Json<PickingInput>,
) -> AppResult<Json<Delivery>> {
    let service = DeliveryService::new(state.db);
    let delivery = service.update_picking(delivery_id, input.items).await?;
    Ok(Json(delivery))
}

/// Record packing progress
pub async fn update_packing(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(delivery_id): Path<Uuid>,
    Json(input): Json<PackingInput>,
) -> AppResult<Json<Delivery>> {
    let service = DeliveryService::new(state.db);
    let delivery = service.update_packing(delivery_id, input.items).await?;
    Ok(Json(delivery))
}

/// Complete a delivery, deducting its lines from stock
pub async fn complete_delivery(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(delivery_id): Path<Uuid>,
    Json(input): Json<CompleteDeliveryInput>,
) -> AppResult<Json<Delivery>> {
    let service = DeliveryService::new(state.db);
    let delivery = service
        .complete(delivery_id, input, current_user.0.user_id)
        .await?;
    Ok(Json(delivery))
}

/// Delete a delivery order
pub async fn delete_delivery(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(delivery_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = DeliveryService::new(state.db);
    service.delete(delivery_id).await?;
    Ok(Json(()))
}
