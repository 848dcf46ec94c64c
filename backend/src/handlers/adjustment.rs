//! HTTP handlers for stock adjustment endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::AdjustmentStatus;
use crate::services::adjustment::{
    Adjustment, AdjustmentService, CreateAdjustmentInput, UpdateAdjustmentInput,
};
use crate::AppState;
use shared::types::{PageParams, Paginated};

/// Query parameters for listing adjustments
#[derive(Debug, Deserialize)]
pub struct ListAdjustmentsQuery {
    pub status: Option<String>,
    pub product: Option<Uuid>,
    pub location: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// List adjustments
pub async fn list_adjustments(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListAdjustmentsQuery>,
) -> AppResult<Json<Paginated<Adjustment>>> {
    let status = query
        .status
        .as_deref()
        .map(AdjustmentStatus::from_str)
        .transpose()
        .map_err(AppError::ValidationError)?;
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };

    let service = AdjustmentService::new(state.db);
    let adjustments = service
        .list(
            status,
            query.product,
            query.location,
            params.page(),
            params.limit(),
        )
        .await?;
    Ok(Json(adjustments))
}

/// Get a single adjustment
pub async fn get_adjustment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(adjustment_id): Path<Uuid>,
) -> AppResult<Json<Adjustment>> {
    let service = AdjustmentService::new(state.db);
    let adjustment = service.get(adjustment_id).await?;
    Ok(Json(adjustment))
}

/// Create a new adjustment
pub async fn create_adjustment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateAdjustmentInput>,
) -> AppResult<Json<Adjustment>> {
    let service = AdjustmentService::new(state.db);
    let adjustment = service.create(input).await?;
    Ok(Json(adjustment))
}

/// Update an adjustment
pub async fn update_adjustment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(adjustment_id): Path<Uuid>,
    Json(input): Json<UpdateAdjustmentInput>,
) -> AppResult<Json<Adjustment>> {
    let service = AdjustmentService::new(state.db);
    let adjustment = service.update(adjustment_id, input).await?;
    Ok(Json(adjustment))
}

/// Approve an adjustment, setting the stock to the counted quantity
pub async fn approve_adjustment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(adjustment_id): Path<Uuid>,
) -> AppResult<Json<Adjustment>> {
    current_user.0.require_manager()?;
    let service = AdjustmentService::new(state.db);
    let adjustment = service
        .approve(adjustment_id, current_user.0.user_id)
        .await?;
    Ok(Json(adjustment))
}

/// Reject an adjustment
pub async fn reject_adjustment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(adjustment_id): Path<Uuid>,
) -> AppResult<Json<Adjustment>> {
    current_user.0.require_manager()?;
    let service = AdjustmentService::new(state.db);
    let adjustment = service.reject(adjustment_id).await?;
    Ok(Json(adjustment))
}

/// Delete an adjustment
pub async fn delete_adjustment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(adjustment_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = AdjustmentService::new(state.db);
    service.delete(adjustment_id).await?;
    Ok(Json(()))
}
