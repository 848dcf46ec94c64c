//! HTTP handlers for storage location endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::location::{
    CreateLocationInput, Location, LocationService, UpdateLocationInput,
};
use crate::services::stock::{StockService, StockView};
use crate::AppState;

/// Query parameters for listing locations
#[derive(Debug, Deserialize)]
pub struct ListLocationsQuery {
    pub warehouse: Option<Uuid>,
}

/// Location with its stock rows
#[derive(Debug, Serialize)]
pub struct LocationDetail {
    pub location: Location,
    pub stocks: Vec<StockView>,
}

/// List locations
pub async fn list_locations(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListLocationsQuery>,
) -> AppResult<Json<Vec<Location>>> {
    let service = LocationService::new(state.db);
    let locations = service.list(query.warehouse).await?;
    Ok(Json(locations))
}

/// Get a single location with its stock
pub async fn get_location(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(location_id): Path<Uuid>,
) -> AppResult<Json<LocationDetail>> {
    let service = LocationService::new(state.db.clone());
    let location = service.get(location_id).await?;

    let stocks = StockService::new(state.db)
        .list(None, None, Some(location_id))
        .await?;

    Ok(Json(LocationDetail { location, stocks }))
}

/// Create a new location
pub async fn create_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateLocationInput>,
) -> AppResult<Json<Location>> {
    current_user.0.require_manager()?;
    let service = LocationService::new(state.db);
    let location = service.create(input).await?;
    Ok(Json(location))
}

/// Update a location
pub async fn update_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(location_id): Path<Uuid>,
    Json(input): Json<UpdateLocationInput>,
) -> AppResult<Json<Location>> {
    current_user.0.require_manager()?;
    let service = LocationService::new(state.db);
    let location = service.update(location_id, input).await?;
    Ok(Json(location))
}

/// Delete a location
pub async fn delete_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(location_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    current_user.0.require_manager()?;
    let service = LocationService::new(state.db);
    service.delete(location_id).await?;
    Ok(Json(()))
}
