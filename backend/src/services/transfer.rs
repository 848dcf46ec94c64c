//! Internal transfer workflow service
//!
//! Transfers move stock between two (warehouse, location) pairs. The
//! terminal completion deducts the source and credits the destination,
//! writing two ledger entries per line, all inside one transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{TransactionType, TransferItem, TransferStatus};
use crate::services::delivery::product_names;
use crate::services::numbering::NumberingService;
use crate::services::receipt::check_references;
use shared::numbering::TRANSFER_PREFIX;
use shared::types::Paginated;
use shared::validation::validate_quantity;

/// Transfer service
#[derive(Clone)]
pub struct TransferService {
    db: PgPool,
}

/// Database row for a transfer with joined display fields
#[derive(Debug, sqlx::FromRow)]
struct TransferRow {
    id: Uuid,
    transfer_number: String,
    source_warehouse_id: Uuid,
    source_warehouse_code: String,
    source_location_id: Uuid,
    source_location_code: String,
    destination_warehouse_id: Uuid,
    destination_warehouse_code: String,
    destination_location_id: Uuid,
    destination_location_code: String,
    items: serde_json::Value,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Internal transfer with endpoints populated
#[derive(Debug, Clone, Serialize)]
pub struct Transfer {
    pub id: Uuid,
    pub transfer_number: String,
    pub source_warehouse_id: Uuid,
    pub source_warehouse_code: String,
    pub source_location_id: Uuid,
    pub source_location_code: String,
    pub destination_warehouse_id: Uuid,
    pub destination_warehouse_code: String,
    pub destination_location_id: Uuid,
    pub destination_location_code: String,
    pub items: Vec<TransferItem>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TransferRow> for Transfer {
    type Error = AppError;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        let items = serde_json::from_value(row.items)
            .map_err(|e| AppError::Internal(format!("Corrupt transfer items: {}", e)))?;
        Ok(Transfer {
            id: row.id,
            transfer_number: row.transfer_number,
            source_warehouse_id: row.source_warehouse_id,
            source_warehouse_code: row.source_warehouse_code,
            source_location_id: row.source_location_id,
            source_location_code: row.source_location_code,
            destination_warehouse_id: row.destination_warehouse_id,
            destination_warehouse_code: row.destination_warehouse_code,
            destination_location_id: row.destination_location_id,
            destination_location_code: row.destination_location_code,
            items,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const TRANSFER_SELECT: &str = r#"
    SELECT t.id, t.transfer_number,
           t.source_warehouse_id, sw.code AS source_warehouse_code,
           t.source_location_id, sl.code AS source_location_code,
           t.destination_warehouse_id, dw.code AS destination_warehouse_code,
           t.destination_location_id, dl.code AS destination_location_code,
           t.items, t.status, t.created_at, t.updated_at
    FROM transfers t
    JOIN warehouses sw ON sw.id = t.source_warehouse_id
    JOIN locations sl ON sl.id = t.source_location_id
    JOIN warehouses dw ON dw.id = t.destination_warehouse_id
    JOIN locations dl ON dl.id = t.destination_location_id
"#;

/// Input for creating a transfer
#[derive(Debug, Deserialize)]
pub struct CreateTransferInput {
    pub source_warehouse_id: Uuid,
    pub source_location_id: Uuid,
    pub destination_warehouse_id: Uuid,
    pub destination_location_id: Uuid,
    pub items: Vec<TransferItem>,
}

/// Input for updating a transfer
#[derive(Debug, Deserialize)]
pub struct UpdateTransferInput {
    pub source_warehouse_id: Option<Uuid>,
    pub source_location_id: Option<Uuid>,
    pub destination_warehouse_id: Option<Uuid>,
    pub destination_location_id: Option<Uuid>,
    pub items: Option<Vec<TransferItem>>,
    pub status: Option<TransferStatus>,
}

impl TransferService {
    /// Create a new TransferService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List transfers, optionally filtered by status and endpoints
    pub async fn list(
        &self,
        status: Option<TransferStatus>,
        source_warehouse_id: Option<Uuid>,
        destination_warehouse_id: Option<Uuid>,
        page: u32,
        limit: u32,
    ) -> AppResult<Paginated<Transfer>> {
        let offset = i64::from(page.max(1) - 1) * i64::from(limit);

        let rows = sqlx::query_as::<_, TransferRow>(&format!(
            r#"
            {TRANSFER_SELECT}
            WHERE ($1::text IS NULL OR t.status = $1)
              AND ($2::uuid IS NULL OR t.source_warehouse_id = $2)
              AND ($3::uuid IS NULL OR t.destination_warehouse_id = $3)
            ORDER BY t.created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(source_warehouse_id)
        .bind(destination_warehouse_id)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM transfers t
            WHERE ($1::text IS NULL OR t.status = $1)
              AND ($2::uuid IS NULL OR t.source_warehouse_id = $2)
              AND ($3::uuid IS NULL OR t.destination_warehouse_id = $3)
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(source_warehouse_id)
        .bind(destination_warehouse_id)
        .fetch_one(&self.db)
        .await?;

        let transfers = rows
            .into_iter()
            .map(Transfer::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated::new(transfers, total, page, limit))
    }

    /// Get a transfer by ID
    pub async fn get(&self, transfer_id: Uuid) -> AppResult<Transfer> {
        let row = sqlx::query_as::<_, TransferRow>(&format!("{TRANSFER_SELECT} WHERE t.id = $1"))
            .bind(transfer_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Transfer".to_string()))?;

        row.try_into()
    }

    /// Create a new transfer in draft status
    pub async fn create(&self, input: CreateTransferInput) -> AppResult<Transfer> {
        self.check_endpoints(
            input.source_warehouse_id,
            input.source_location_id,
            input.destination_warehouse_id,
            input.destination_location_id,
        )
        .await?;
        self.check_items(&input.items).await?;

        let transfer_number = NumberingService::new(self.db.clone())
            .next_number(TRANSFER_PREFIX)
            .await?;

        let items =
            serde_json::to_value(&input.items).map_err(|e| AppError::Internal(e.to_string()))?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO transfers (transfer_number, source_warehouse_id, source_location_id,
                                   destination_warehouse_id, destination_location_id, items, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'draft')
            RETURNING id
            "#,
        )
        .bind(&transfer_number)
        .bind(input.source_warehouse_id)
        .bind(input.source_location_id)
        .bind(input.destination_warehouse_id)
        .bind(input.destination_location_id)
        .bind(&items)
        .fetch_one(&self.db)
        .await?;

        self.get(id).await
    }

    /// Update a transfer; blocked once it is completed or canceled
    pub async fn update(
        &self,
        transfer_id: Uuid,
        input: UpdateTransferInput,
    ) -> AppResult<Transfer> {
        let existing = self.get(transfer_id).await?;
        let status = TransferStatus::from_str(&existing.status).map_err(AppError::Internal)?;

        if !status.can_update() {
            return Err(AppError::StateConflict(
                "Cannot update transfer that is completed or canceled".to_string(),
            ));
        }

        self.check_endpoints(
            input.source_warehouse_id.unwrap_or(existing.source_warehouse_id),
            input.source_location_id.unwrap_or(existing.source_location_id),
            input
                .destination_warehouse_id
                .unwrap_or(existing.destination_warehouse_id),
            input
                .destination_location_id
                .unwrap_or(existing.destination_location_id),
        )
        .await?;

        if let Some(items) = &input.items {
            self.check_items(items).await?;
        }

        let items = input
            .items
            .map(|i| serde_json::to_value(i))
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE transfers
            SET source_warehouse_id = COALESCE($2, source_warehouse_id),
                source_location_id = COALESCE($3, source_location_id),
                destination_warehouse_id = COALESCE($4, destination_warehouse_id),
                destination_location_id = COALESCE($5, destination_location_id),
                items = COALESCE($6, items),
                status = COALESCE($7, status),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(transfer_id)
        .bind(input.source_warehouse_id)
        .bind(input.source_location_id)
        .bind(input.destination_warehouse_id)
        .bind(input.destination_location_id)
        .bind(&items)
        .bind(input.status.map(|s| s.as_str()))
        .execute(&self.db)
        .await?;

        self.get(transfer_id).await
    }

    /// Complete a transfer: move every line from the source stock to the
    /// destination stock, two ledger entries per line. All-or-nothing.
    pub async fn complete(&self, transfer_id: Uuid, actor: Uuid) -> AppResult<Transfer> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, (Uuid, Uuid, Uuid, Uuid, String, serde_json::Value)>(
            r#"
            SELECT source_warehouse_id, source_location_id,
                   destination_warehouse_id, destination_location_id,
                   status, items
            FROM transfers WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(transfer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer".to_string()))?;

        let (source_warehouse, source_location, dest_warehouse, dest_location, status, items_json) =
            row;
        let status = TransferStatus::from_str(&status).map_err(AppError::Internal)?;
        if !status.can_complete() {
            return Err(AppError::StateConflict(
                "Transfer must be in pending status to complete".to_string(),
            ));
        }

        let items: Vec<TransferItem> = serde_json::from_value(items_json)
            .map_err(|e| AppError::Internal(format!("Corrupt transfer items: {}", e)))?;
        if items.is_empty() {
            return Err(AppError::ValidationError(
                "Transfer has no line items".to_string(),
            ));
        }

        let names = product_names(&mut tx, &items.iter().map(|i| i.product_id).collect::<Vec<_>>())
            .await?;

        for item in &items {
            let name = names
                .get(&item.product_id)
                .cloned()
                .unwrap_or_else(|| item.product_id.to_string());

            // Deduct from source
            let source = sqlx::query_as::<_, (Uuid, i64)>(
                r#"
                SELECT id, available_quantity FROM stocks
                WHERE product_id = $1 AND warehouse_id = $2 AND location_id = $3
                FOR UPDATE
                "#,
            )
            .bind(item.product_id)
            .bind(source_warehouse)
            .bind(source_location)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Stock for product {} at source location", name))
            })?;

            let (source_stock_id, available) = source;
            if available < item.qty {
                return Err(AppError::InsufficientStock(format!(
                    "Insufficient stock for product {} at source. Available: {}, Required: {}",
                    name, available, item.qty
                )));
            }

            let source_after: i64 = sqlx::query_scalar(
                "UPDATE stocks SET quantity = quantity - $2, updated_at = now() WHERE id = $1 RETURNING quantity",
            )
            .bind(source_stock_id)
            .bind(item.qty)
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
            .bind(item.product_id)
            .bind(source_warehouse)
            .bind(source_location)
            .bind(TransactionType::Transfer.as_str())
            .bind(-item.qty)
            .bind(source_after)
            .bind(actor)
            .execute(&mut *tx)
            .await?;

            // Credit the destination
            let dest_after: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO stocks (product_id, warehouse_id, location_id, quantity, reserved_quantity)
                VALUES ($1, $2, $3, $4, 0)
                ON CONFLICT (product_id, warehouse_id, location_id)
                DO UPDATE SET quantity = stocks.quantity + EXCLUDED.quantity,
                              updated_at = now()
                RETURNING quantity
                "#,
            )
            .bind(item.product_id)
            .bind(dest_warehouse)
            .bind(dest_location)
            .bind(item.qty)
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
            .bind(item.product_id)
            .bind(dest_warehouse)
            .bind(dest_location)
            .bind(TransactionType::Transfer.as_str())
            .bind(item.qty)
            .bind(dest_after)
            .bind(actor)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE transfers SET status = 'completed', updated_at = now() WHERE id = $1")
            .bind(transfer_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(transfer_id).await
    }

    /// Delete a transfer; blocked once it is completed
    pub async fn delete(&self, transfer_id: Uuid) -> AppResult<()> {
        let existing = self.get(transfer_id).await?;
        let status = TransferStatus::from_str(&existing.status).map_err(AppError::Internal)?;

        if !status.can_delete() {
            return Err(AppError::StateConflict(
                "Cannot delete transfer that is completed".to_string(),
            ));
        }

        sqlx::query("DELETE FROM transfers WHERE id = $1")
            .bind(transfer_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Both endpoints must exist and each location must belong to its
    /// warehouse
    async fn check_endpoints(
        &self,
        source_warehouse: Uuid,
        source_location: Uuid,
        dest_warehouse: Uuid,
        dest_location: Uuid,
    ) -> AppResult<()> {
        for (warehouse_id, location_id, label) in [
            (source_warehouse, source_location, "source"),
            (dest_warehouse, dest_location, "destination"),
        ] {
            let row = sqlx::query_scalar::<_, Uuid>(
                "SELECT warehouse_id FROM locations WHERE id = $1",
            )
            .bind(location_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

            if row != warehouse_id {
                return Err(AppError::ValidationError(format!(
                    "The {} location does not belong to the {} warehouse",
                    label, label
                )));
            }
        }

        Ok(())
    }

    async fn check_items(&self, items: &[TransferItem]) -> AppResult<()> {
        for item in items {
            validate_quantity(item.qty).map_err(|msg| AppError::Validation {
                field: "items.qty".to_string(),
                message: msg.to_string(),
            })?;
        }

        let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
        check_references(&self.db, &product_ids, &[]).await
    }
}
