//! HTTP handlers for CSV export endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::export::ExportService;
use crate::AppState;

/// Query parameters for the stock export
#[derive(Debug, Deserialize)]
pub struct ExportStockQuery {
    pub warehouse: Option<Uuid>,
    pub product: Option<Uuid>,
}

/// Query parameters for the product export
#[derive(Debug, Deserialize)]
pub struct ExportProductsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Export stock rows as CSV
pub async fn export_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ExportStockQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ExportService::new(state.db);
    let csv = service.export_stock(query.warehouse, query.product).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"stock-export.csv\"",
            ),
        ],
        csv,
    ))
}

/// Export the product catalog as CSV
pub async fn export_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ExportProductsQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ExportService::new(state.db);
    let csv = service
        .export_products(query.category.as_deref(), query.search.as_deref())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"products-export.csv\"",
            ),
        ],
        csv,
    ))
}
