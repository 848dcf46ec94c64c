//! HTTP handlers for warehouse endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::location::{Location, LocationService};
use crate::services::stock::{StockService, StockView};
use crate::services::warehouse::{
    CreateWarehouseInput, UpdateWarehouseInput, Warehouse, WarehouseService,
};
use crate::AppState;

/// Warehouse with its locations and stock rows
#[derive(Debug, Serialize)]
pub struct WarehouseDetail {
    pub warehouse: Warehouse,
    pub locations: Vec<Location>,
    pub stocks: Vec<StockView>,
}

/// List all warehouses
pub async fn list_warehouses(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Warehouse>>> {
    let service = WarehouseService::new(state.db);
    let warehouses = service.list().await?;
    Ok(Json(warehouses))
}

/// Get a single warehouse with its locations and stock
pub async fn get_warehouse(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<WarehouseDetail>> {
    let service = WarehouseService::new(state.db.clone());
    let warehouse = service.get(warehouse_id).await?;

    let locations = LocationService::new(state.db.clone())
        .list(Some(warehouse_id))
        .await?;
    let stocks = StockService::new(state.db)
        .list(Some(warehouse_id), None, None)
        .await?;

    Ok(Json(WarehouseDetail {
        warehouse,
        locations,
        stocks,
    }))
}

/// Create a new warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    current_user.0.require_manager()?;
    let service = WarehouseService::new(state.db);
    let warehouse = service.create(input).await?;
    Ok(Json(warehouse))
}

/// Update a warehouse
pub async fn update_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<UpdateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    current_user.0.require_manager()?;
    let service = WarehouseService::new(state.db);
    let warehouse = service.update(warehouse_id, input).await?;
    Ok(Json(warehouse))
}

/// Delete a warehouse
pub async fn delete_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    current_user.0.require_manager()?;
    let service = WarehouseService::new(state.db);
    service.delete(warehouse_id).await?;
    Ok(Json(()))
}
