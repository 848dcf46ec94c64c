//! HTTP handlers for product catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::product::{
    CreateProductInput, LowStockProduct, Product, ProductService, UpdateProductInput,
};
use crate::services::stock::{StockService, StockView};
use crate::AppState;
use shared::types::{PageParams, Paginated};

/// Query parameters for listing products
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Product with its stock rows
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub stocks: Vec<StockView>,
}

/// List products
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListProductsQuery>,
) -> AppResult<Json<Paginated<Product>>> {
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let service = ProductService::new(state.db);
    let products = service
        .list(
            query.search.as_deref(),
            query.category.as_deref(),
            params.page(),
            params.limit(),
        )
        .await?;
    Ok(Json(products))
}

/// Get a single product with its stock rows
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductDetail>> {
    let service = ProductService::new(state.db.clone());
    let product = service.get(product_id).await?;

    let stocks = StockService::new(state.db)
        .list(None, Some(product_id), None)
        .await?;

    Ok(Json(ProductDetail { product, stocks }))
}

/// Create a new product
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    current_user.0.require_manager()?;
    let service = ProductService::new(state.db);
    let product = service.create(input).await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    current_user.0.require_manager()?;
    let service = ProductService::new(state.db);
    let product = service.update(product_id, input).await?;
    Ok(Json(product))
}

/// Delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    current_user.0.require_manager()?;
    let service = ProductService::new(state.db);
    service.delete(product_id).await?;
    Ok(Json(()))
}

/// List products at or below their reorder point
pub async fn get_low_stock_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<LowStockProduct>>> {
    let service = ProductService::new(state.db);
    let products = service.low_stock().await?;
    Ok(Json(products))
}
