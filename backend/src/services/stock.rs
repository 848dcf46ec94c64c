//! Stock balance service
//!
//! Read paths over the per-(product, warehouse, location) balances, plus
//! the administrative override write path. Overrides deliberately bypass
//! the movement ledger; every ledger-tracked mutation goes through the
//! document workflows instead.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Stock service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Stock balance with product, warehouse, and location populated
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StockView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub unit_of_measure: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub warehouse_code: String,
    pub location_id: Uuid,
    pub location_name: String,
    pub location_code: String,
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub available_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const STOCK_SELECT: &str = r#"
    SELECT s.id, s.product_id, p.name AS product_name, p.sku AS product_sku,
           p.unit_of_measure,
           s.warehouse_id, w.name AS warehouse_name, w.code AS warehouse_code,
           s.location_id, l.name AS location_name, l.code AS location_code,
           s.quantity, s.reserved_quantity, s.available_quantity,
           s.created_at, s.updated_at
    FROM stocks s
    JOIN products p ON p.id = s.product_id
    JOIN warehouses w ON w.id = s.warehouse_id
    JOIN locations l ON l.id = s.location_id
"#;

/// Input for the administrative stock override (create-or-overwrite)
#[derive(Debug, Deserialize)]
pub struct SetStockInput {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub location_id: Uuid,
    pub quantity: Option<i64>,
    pub reserved_quantity: Option<i64>,
}

/// Input for overwriting an existing stock row
#[derive(Debug, Deserialize)]
pub struct UpdateStockInput {
    pub quantity: Option<i64>,
    pub reserved_quantity: Option<i64>,
}

/// Aggregate figures over a set of stock rows
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StockSummary {
    pub total_products: i64,
    pub total_quantity: i64,
    pub total_reserved: i64,
    pub total_available: i64,
    pub total_value: Decimal,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List stock rows, optionally filtered by warehouse, product, and
    /// location
    pub async fn list(
        &self,
        warehouse_id: Option<Uuid>,
        product_id: Option<Uuid>,
        location_id: Option<Uuid>,
    ) -> AppResult<Vec<StockView>> {
        let stocks = sqlx::query_as::<_, StockView>(&format!(
            r#"
            {STOCK_SELECT}
            WHERE ($1::uuid IS NULL OR s.warehouse_id = $1)
              AND ($2::uuid IS NULL OR s.product_id = $2)
              AND ($3::uuid IS NULL OR s.location_id = $3)
            ORDER BY s.created_at DESC
            "#
        ))
        .bind(warehouse_id)
        .bind(product_id)
        .bind(location_id)
        .fetch_all(&self.db)
        .await?;

        Ok(stocks)
    }

    /// Get one stock row by ID
    pub async fn get(&self, stock_id: Uuid) -> AppResult<StockView> {
        sqlx::query_as::<_, StockView>(&format!("{STOCK_SELECT} WHERE s.id = $1"))
            .bind(stock_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock".to_string()))
    }

    /// Administrative override: create the row for a (product, warehouse,
    /// location) triple or overwrite its quantities. Does not touch the
    /// ledger.
    pub async fn set_stock(&self, input: SetStockInput) -> AppResult<StockView> {
        if input.quantity.is_some_and(|q| q < 0)
            || input.reserved_quantity.is_some_and(|q| q < 0)
        {
            return Err(AppError::ValidationError(
                "Quantities cannot be negative".to_string(),
            ));
        }

        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&self.db)
                .await?;
        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let warehouse_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(input.warehouse_id)
                .fetch_one(&self.db)
                .await?;
        if !warehouse_exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let location_warehouse =
            sqlx::query_scalar::<_, Uuid>("SELECT warehouse_id FROM locations WHERE id = $1")
                .bind(input.location_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

        if location_warehouse != input.warehouse_id {
            return Err(AppError::ValidationError(
                "Location does not belong to this warehouse".to_string(),
            ));
        }

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO stocks (product_id, warehouse_id, location_id, quantity, reserved_quantity)
            VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, 0))
            ON CONFLICT (product_id, warehouse_id, location_id)
            DO UPDATE SET quantity = COALESCE($4, stocks.quantity),
                          reserved_quantity = COALESCE($5, stocks.reserved_quantity),
                          updated_at = now()
            RETURNING id
            "#,
        )
        .bind(input.product_id)
        .bind(input.warehouse_id)
        .bind(input.location_id)
        .bind(input.quantity)
        .bind(input.reserved_quantity)
        .fetch_one(&self.db)
        .await?;

        self.get(id).await
    }

    /// Administrative override of an existing row's quantities. Does not
    /// touch the ledger.
    pub async fn update_stock(&self, stock_id: Uuid, input: UpdateStockInput) -> AppResult<StockView> {
        if input.quantity.is_some_and(|q| q < 0)
            || input.reserved_quantity.is_some_and(|q| q < 0)
        {
            return Err(AppError::ValidationError(
                "Quantities cannot be negative".to_string(),
            ));
        }

        let updated = sqlx::query(
            r#"
            UPDATE stocks
            SET quantity = COALESCE($2, quantity),
                reserved_quantity = COALESCE($3, reserved_quantity),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(stock_id)
        .bind(input.quantity)
        .bind(input.reserved_quantity)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Stock".to_string()));
        }

        self.get(stock_id).await
    }

    /// Aggregate quantities and value, optionally for one warehouse
    pub async fn summary(&self, warehouse_id: Option<Uuid>) -> AppResult<StockSummary> {
        let summary = sqlx::query_as::<_, StockSummary>(
            r#"
            SELECT COUNT(DISTINCT s.product_id) AS total_products,
                   COALESCE(SUM(s.quantity), 0)::BIGINT AS total_quantity,
                   COALESCE(SUM(s.reserved_quantity), 0)::BIGINT AS total_reserved,
                   COALESCE(SUM(s.available_quantity), 0)::BIGINT AS total_available,
                   COALESCE(SUM(s.quantity * p.cost_price), 0) AS total_value
            FROM stocks s
            JOIN products p ON p.id = s.product_id
            WHERE ($1::uuid IS NULL OR s.warehouse_id = $1)
            "#,
        )
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(summary)
    }
}
