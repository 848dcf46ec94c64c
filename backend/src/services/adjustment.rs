//! Stock adjustment workflow service
//!
//! Adjustments reconcile the recorded balance against a physical count.
//! Approval sets the stock quantity to the counted value (absolute set,
//! not an increment) and records the signed difference in the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{adjustment_difference, AdjustmentStatus, TransactionType};
use crate::services::numbering::NumberingService;
use shared::numbering::ADJUSTMENT_PREFIX;
use shared::types::Paginated;

/// Adjustment service
#[derive(Clone)]
pub struct AdjustmentService {
    db: PgPool,
}

/// Stock adjustment with product and location populated
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Adjustment {
    pub id: Uuid,
    pub adjustment_number: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub location_id: Uuid,
    pub location_code: String,
    pub warehouse_id: Uuid,
    pub warehouse_code: String,
    pub recorded_quantity: i64,
    pub counted_quantity: i64,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const ADJUSTMENT_SELECT: &str = r#"
    SELECT a.id, a.adjustment_number, a.product_id, p.name AS product_name,
           p.sku AS product_sku, a.location_id, l.code AS location_code,
           l.warehouse_id, w.code AS warehouse_code,
           a.recorded_quantity, a.counted_quantity, a.reason, a.status,
           a.created_at, a.updated_at
    FROM stock_adjustments a
    JOIN products p ON p.id = a.product_id
    JOIN locations l ON l.id = a.location_id
    JOIN warehouses w ON w.id = l.warehouse_id
"#;

/// Input for creating an adjustment
#[derive(Debug, Deserialize)]
pub struct CreateAdjustmentInput {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub recorded_quantity: i64,
    pub counted_quantity: i64,
    pub reason: Option<String>,
}

/// Input for updating a pending adjustment
#[derive(Debug, Deserialize)]
pub struct UpdateAdjustmentInput {
    pub recorded_quantity: Option<i64>,
    pub counted_quantity: Option<i64>,
    pub reason: Option<String>,
}

impl AdjustmentService {
    /// Create a new AdjustmentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List adjustments, optionally filtered by status, product, and
    /// location
    pub async fn list(
        &self,
        status: Option<AdjustmentStatus>,
        product_id: Option<Uuid>,
        location_id: Option<Uuid>,
        page: u32,
        limit: u32,
    ) -> AppResult<Paginated<Adjustment>> {
        let offset = i64::from(page.max(1) - 1) * i64::from(limit);

        let adjustments = sqlx::query_as::<_, Adjustment>(&format!(
            r#"
            {ADJUSTMENT_SELECT}
            WHERE ($1::text IS NULL OR a.status = $1)
              AND ($2::uuid IS NULL OR a.product_id = $2)
              AND ($3::uuid IS NULL OR a.location_id = $3)
            ORDER BY a.created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(product_id)
        .bind(location_id)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM stock_adjustments a
            WHERE ($1::text IS NULL OR a.status = $1)
              AND ($2::uuid IS NULL OR a.product_id = $2)
              AND ($3::uuid IS NULL OR a.location_id = $3)
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(product_id)
        .bind(location_id)
        .fetch_one(&self.db)
        .await?;

        Ok(Paginated::new(adjustments, total, page, limit))
    }

    /// Get an adjustment by ID
    pub async fn get(&self, adjustment_id: Uuid) -> AppResult<Adjustment> {
        sqlx::query_as::<_, Adjustment>(&format!("{ADJUSTMENT_SELECT} WHERE a.id = $1"))
            .bind(adjustment_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Adjustment".to_string()))
    }

    /// Create a new adjustment in pending status
    pub async fn create(&self, input: CreateAdjustmentInput) -> AppResult<Adjustment> {
        if input.recorded_quantity < 0 || input.counted_quantity < 0 {
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

        let location_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1)")
                .bind(input.location_id)
                .fetch_one(&self.db)
                .await?;
        if !location_exists {
            return Err(AppError::NotFound("Location".to_string()));
        }

        let adjustment_number = NumberingService::new(self.db.clone())
            .next_number(ADJUSTMENT_PREFIX)
            .await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO stock_adjustments (adjustment_number, product_id, location_id,
                                           recorded_quantity, counted_quantity, reason, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING id
            "#,
        )
        .bind(&adjustment_number)
        .bind(input.product_id)
        .bind(input.location_id)
        .bind(input.recorded_quantity)
        .bind(input.counted_quantity)
        .bind(&input.reason)
        .fetch_one(&self.db)
        .await?;

        self.get(id).await
    }

    /// Update an adjustment; blocked once it is approved or rejected
    pub async fn update(
        &self,
        adjustment_id: Uuid,
        input: UpdateAdjustmentInput,
    ) -> AppResult<Adjustment> {
        let existing = self.get(adjustment_id).await?;
        let status = AdjustmentStatus::from_str(&existing.status).map_err(AppError::Internal)?;

        if !status.can_update() {
            return Err(AppError::StateConflict(
                "Cannot update adjustment that is approved or rejected".to_string(),
            ));
        }

        if input.recorded_quantity.is_some_and(|q| q < 0)
            || input.counted_quantity.is_some_and(|q| q < 0)
        {
            return Err(AppError::ValidationError(
                "Quantities cannot be negative".to_string(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE stock_adjustments
            SET recorded_quantity = COALESCE($2, recorded_quantity),
                counted_quantity = COALESCE($3, counted_quantity),
                reason = COALESCE($4, reason),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(adjustment_id)
        .bind(input.recorded_quantity)
        .bind(input.counted_quantity)
        .bind(&input.reason)
        .execute(&self.db)
        .await?;

        self.get(adjustment_id).await
    }

    /// Approve an adjustment: set the stock quantity to the counted
    /// value and record the difference in the ledger
    pub async fn approve(&self, adjustment_id: Uuid, actor: Uuid) -> AppResult<Adjustment> {
        let mut tx = self.db.begin().await?;

        // The warehouse comes off the adjusted location, not the document
        let row = sqlx::query_as::<_, (Uuid, Uuid, Uuid, i64, i64, String)>(
            r#"
            SELECT a.product_id, a.location_id, l.warehouse_id,
                   a.recorded_quantity, a.counted_quantity, a.status
            FROM stock_adjustments a
            JOIN locations l ON l.id = a.location_id
            WHERE a.id = $1
            FOR UPDATE OF a
            "#,
        )
        .bind(adjustment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Adjustment".to_string()))?;

        let (product_id, location_id, warehouse_id, recorded, counted, status) = row;
        let status = AdjustmentStatus::from_str(&status).map_err(AppError::Internal)?;
        if !status.can_resolve() {
            return Err(AppError::StateConflict(
                "Adjustment must be in pending status to approve".to_string(),
            ));
        }

        let stock_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM stocks
            WHERE product_id = $1 AND warehouse_id = $2 AND location_id = $3
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .bind(location_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock at the adjusted location".to_string()))?;

        let quantity_after: i64 = sqlx::query_scalar(
            "UPDATE stocks SET quantity = $2, updated_at = now() WHERE id = $1 RETURNING quantity",
        )
        .bind(stock_id)
        .bind(counted)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO stock_ledger (product_id, warehouse_id, location_id,
                                      transaction_type, quantity_change, quantity_after,
                                      performed_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .bind(location_id)
        .bind(TransactionType::Adjustment.as_str())
        .bind(adjustment_difference(recorded, counted))
        .bind(quantity_after)
        .bind(actor)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE stock_adjustments SET status = 'approved', updated_at = now() WHERE id = $1",
        )
        .bind(adjustment_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get(adjustment_id).await
    }

    /// Reject an adjustment; no stock or ledger effect
    pub async fn reject(&self, adjustment_id: Uuid) -> AppResult<Adjustment> {
        let existing = self.get(adjustment_id).await?;
        let status = AdjustmentStatus::from_str(&existing.status).map_err(AppError::Internal)?;

        if !status.can_resolve() {
            return Err(AppError::StateConflict(
                "Adjustment must be in pending status to reject".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE stock_adjustments SET status = 'rejected', updated_at = now() WHERE id = $1",
        )
        .bind(adjustment_id)
        .execute(&self.db)
        .await?;

        self.get(adjustment_id).await
    }

    /// Delete an adjustment; blocked once it is approved
    pub async fn delete(&self, adjustment_id: Uuid) -> AppResult<()> {
        let existing = self.get(adjustment_id).await?;
        let status = AdjustmentStatus::from_str(&existing.status).map_err(AppError::Internal)?;

        if !status.can_delete() {
            return Err(AppError::StateConflict(
                "Cannot delete adjustment that is approved".to_string(),
            ));
        }

        sqlx::query("DELETE FROM stock_adjustments WHERE id = $1")
            .bind(adjustment_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
