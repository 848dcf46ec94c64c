//! HTTP handlers for stock ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::TransactionType;
use crate::services::ledger::{LedgerEntry, LedgerFilter, LedgerService, ProductLedger};
use crate::AppState;
use shared::types::{PageParams, Paginated};

/// Query parameters for listing ledger entries
#[derive(Debug, Deserialize)]
pub struct ListLedgerQuery {
    pub product: Option<Uuid>,
    pub transaction_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query parameters for a product's ledger
#[derive(Debug, Deserialize)]
pub struct ProductLedgerQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// List ledger entries
pub async fn list_ledger_entries(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListLedgerQuery>,
) -> AppResult<Json<Paginated<LedgerEntry>>> {
    let transaction_type = query
        .transaction_type
        .as_deref()
        .map(TransactionType::from_str)
        .transpose()
        .map_err(AppError::ValidationError)?;
    let params = PageParams {
        page: query.page,
        // ledger lists default to 50 rows per page
        limit: query.limit.or(Some(50)),
    };

    let filter = LedgerFilter {
        product_id: query.product,
        transaction_type,
        start_date: query.start_date.and_then(|s| s.parse().ok()),
        end_date: query.end_date.and_then(|s| s.parse().ok()),
    };

    let service = LedgerService::new(state.db);
    let entries = service.list(filter, params.page(), params.limit()).await?;
    Ok(Json(entries))
}

/// Get a single ledger entry
pub async fn get_ledger_entry(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<LedgerEntry>> {
    let service = LedgerService::new(state.db);
    let entry = service.get(entry_id).await?;
    Ok(Json(entry))
}

/// Get a product's ledger with in/out totals
pub async fn get_product_ledger(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Query(query): Query<ProductLedgerQuery>,
) -> AppResult<Json<ProductLedger>> {
    let service = LedgerService::new(state.db);
    let ledger = service
        .product_ledger(
            product_id,
            query.start_date.and_then(|s| s.parse().ok()),
            query.end_date.and_then(|s| s.parse().ok()),
        )
        .await?;
    Ok(Json(ledger))
}

/// List ledger entries of one transaction type
pub async fn get_ledger_by_type(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(transaction_type): Path<String>,
    Query(query): Query<ListLedgerQuery>,
) -> AppResult<Json<Paginated<LedgerEntry>>> {
    let transaction_type =
        TransactionType::from_str(&transaction_type).map_err(AppError::ValidationError)?;
    let params = PageParams {
        page: query.page,
        limit: query.limit.or(Some(50)),
    };

    let filter = LedgerFilter {
        product_id: query.product,
        transaction_type: Some(transaction_type),
        start_date: query.start_date.and_then(|s| s.parse().ok()),
        end_date: query.end_date.and_then(|s| s.parse().ok()),
    };

    let service = LedgerService::new(state.db);
    let entries = service.list(filter, params.page(), params.limit()).await?;
    Ok(Json(entries))
}
