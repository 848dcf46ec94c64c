//! HTTP handlers for stock balance endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock::{
    SetStockInput, StockService, StockSummary, StockView, UpdateStockInput,
};
use crate::AppState;

/// Query parameters for listing stock
#[derive(Debug, Deserialize)]
pub struct ListStockQuery {
    pub warehouse: Option<Uuid>,
    pub product: Option<Uuid>,
    pub location: Option<Uuid>,
}

/// Query parameters for the stock summary
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub warehouse: Option<Uuid>,
}

/// List stock rows
pub async fn list_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListStockQuery>,
) -> AppResult<Json<Vec<StockView>>> {
    let service = StockService::new(state.db);
    let stocks = service
        .list(query.warehouse, query.product, query.location)
        .await?;
    Ok(Json(stocks))
}

/// Get a single stock row
pub async fn get_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(stock_id): Path<Uuid>,
) -> AppResult<Json<StockView>> {
    let service = StockService::new(state.db);
    let stock = service.get(stock_id).await?;
    Ok(Json(stock))
}

/// Administrative override: create or overwrite the stock row for a
/// (product, warehouse, location) triple. Bypasses the ledger.
pub async fn set_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SetStockInput>,
) -> AppResult<Json<StockView>> {
    current_user.0.require_manager()?;
    let service = StockService::new(state.db);
    let stock = service.set_stock(input).await?;
    Ok(Json(stock))
}

/// Administrative override of an existing stock row. Bypasses the ledger.
pub async fn update_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(stock_id): Path<Uuid>,
    Json(input): Json<UpdateStockInput>,
) -> AppResult<Json<StockView>> {
    current_user.0.require_manager()?;
    let service = StockService::new(state.db);
    let stock = service.update_stock(stock_id, input).await?;
    Ok(Json(stock))
}

/// Aggregate stock figures, optionally for one warehouse
pub async fn get_stock_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<StockSummary>> {
    let service = StockService::new(state.db);
    let summary = service.summary(query.warehouse).await?;
    Ok(Json(summary))
}
