//! Route definitions for the StockMaster server

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (register/login public, /me protected)
        .nest("/auth", auth_routes())
        // Protected routes - product catalog
        .nest("/products", product_routes())
        // Protected routes - warehouses
        .nest("/warehouses", warehouse_routes())
        // Protected routes - storage locations
        .nest("/locations", location_routes())
        // Protected routes - stock balances
        .nest("/stock", stock_routes())
        // Protected routes - goods receipts
        .nest("/receipts", receipt_routes())
        // Protected routes - delivery orders
        .nest("/deliveries", delivery_routes())
        // Protected routes - internal transfers
        .nest("/transfers", transfer_routes())
        // Protected routes - stock adjustments
        .nest("/adjustments", adjustment_routes())
        // Protected routes - movement ledger
        .nest("/ledger", ledger_routes())
        // Protected routes - CSV export
        .nest("/export", export_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route(
            "/me",
            get(handlers::get_me).route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// Product catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/low-stock", get(handlers::get_low_stock_products))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Warehouse routes (protected)
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Storage location routes (protected)
fn location_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_locations).post(handlers::create_location),
        )
        .route(
            "/:location_id",
            get(handlers::get_location)
                .put(handlers::update_location)
                .delete(handlers::delete_location),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock balance routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_stock_summary))
        .route("/", get(handlers::list_stock).post(handlers::set_stock))
        .route(
            "/:stock_id",
            get(handlers::get_stock).put(handlers::update_stock),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Goods receipt routes (protected)
fn receipt_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_receipts).post(handlers::create_receipt),
        )
        .route(
            "/:receipt_id",
            get(handlers::get_receipt)
                .put(handlers::update_receipt)
                .delete(handlers::delete_receipt),
        )
        .route("/:receipt_id/validate", put(handlers::validate_receipt))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Delivery order routes (protected)
fn delivery_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_deliveries).post(handlers::create_delivery),
        )
        .route(
            "/:delivery_id",
            get(handlers::get_delivery)
                .put(handlers::update_delivery)
                .delete(handlers::delete_delivery),
        )
        .route("/:delivery_id/pick", put(handlers::update_picking))
        .route("/:delivery_id/pack", put(handlers::update_packing))
        .route("/:delivery_id/complete", put(handlers::complete_delivery))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Internal transfer routes (protected)
fn transfer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_transfers).post(handlers::create_transfer),
        )
        .route(
            "/:transfer_id",
            get(handlers::get_transfer)
                .put(handlers::update_transfer)
                .delete(handlers::delete_transfer),
        )
        .route("/:transfer_id/complete", put(handlers::complete_transfer))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock adjustment routes (protected)
fn adjustment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_adjustments).post(handlers::create_adjustment),
        )
        .route(
            "/:adjustment_id",
            get(handlers::get_adjustment)
                .put(handlers::update_adjustment)
                .delete(handlers::delete_adjustment),
        )
        .route("/:adjustment_id/approve", put(handlers::approve_adjustment))
        .route("/:adjustment_id/reject", put(handlers::reject_adjustment))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Movement ledger routes (protected)
fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_ledger_entries))
        .route("/product/:product_id", get(handlers::get_product_ledger))
        .route("/type/:transaction_type", get(handlers::get_ledger_by_type))
        .route("/:entry_id", get(handlers::get_ledger_entry))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// CSV export routes (protected)
fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/stock", get(handlers::export_stock))
        .route("/products", get(handlers::export_products))
        .route_layer(middleware::from_fn(auth_middleware))
}
