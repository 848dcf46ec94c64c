//! Goods receipt workflow service
//!
//! Receipts are inbound documents. Validation is the terminal transition
//! that books every line item into stock and appends matching ledger
//! entries; it runs in a single transaction, so either every line applies
//! or none do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ReceiptItem, ReceiptStatus, Supplier, TransactionType};
use crate::services::numbering::NumberingService;
use shared::numbering::RECEIPT_PREFIX;
use shared::types::Paginated;
use shared::validation::validate_quantity;

/// Receipt service
#[derive(Clone)]
pub struct ReceiptService {
    db: PgPool,
}

/// Database row for a receipt with joined display fields
#[derive(Debug, sqlx::FromRow)]
struct ReceiptRow {
    id: Uuid,
    receipt_number: String,
    supplier: Option<serde_json::Value>,
    warehouse_id: Uuid,
    warehouse_name: String,
    warehouse_code: String,
    items: serde_json::Value,
    status: String,
    validated_by: Option<Uuid>,
    validated_by_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Receipt with warehouse and validator populated
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub id: Uuid,
    pub receipt_number: String,
    pub supplier: Option<Supplier>,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub warehouse_code: String,
    pub items: Vec<ReceiptItem>,
    pub status: String,
    pub validated_by: Option<Uuid>,
    pub validated_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ReceiptRow> for Receipt {
    type Error = AppError;

    fn try_from(row: ReceiptRow) -> Result<Self, Self::Error> {
        let supplier = row
            .supplier
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Corrupt receipt supplier: {}", e)))?;
        let items = serde_json::from_value(row.items)
            .map_err(|e| AppError::Internal(format!("Corrupt receipt items: {}", e)))?;
        Ok(Receipt {
            id: row.id,
            receipt_number: row.receipt_number,
            supplier,
            warehouse_id: row.warehouse_id,
            warehouse_name: row.warehouse_name,
            warehouse_code: row.warehouse_code,
            items,
            status: row.status,
            validated_by: row.validated_by,
            validated_by_name: row.validated_by_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const RECEIPT_SELECT: &str = r#"
    SELECT r.id, r.receipt_number, r.supplier, r.warehouse_id,
           w.name AS warehouse_name, w.code AS warehouse_code,
           r.items, r.status, r.validated_by, u.full_name AS validated_by_name,
           r.created_at, r.updated_at
    FROM receipts r
    JOIN warehouses w ON w.id = r.warehouse_id
    LEFT JOIN users u ON u.id = r.validated_by
"#;

/// Input for creating a receipt
#[derive(Debug, Deserialize)]
pub struct CreateReceiptInput {
    pub supplier: Option<Supplier>,
    pub warehouse_id: Uuid,
    pub items: Vec<ReceiptItem>,
}

/// Input for updating a receipt; omitted fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateReceiptInput {
    pub supplier: Option<Supplier>,
    pub warehouse_id: Option<Uuid>,
    pub items: Option<Vec<ReceiptItem>>,
    pub status: Option<ReceiptStatus>,
}

impl ReceiptService {
    /// Create a new ReceiptService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List receipts, optionally filtered by status and warehouse
    pub async fn list(
        &self,
        status: Option<ReceiptStatus>,
        warehouse_id: Option<Uuid>,
        page: u32,
        limit: u32,
    ) -> AppResult<Paginated<Receipt>> {
        let offset = i64::from(page.max(1) - 1) * i64::from(limit);

        let rows = sqlx::query_as::<_, ReceiptRow>(&format!(
            r#"
            {RECEIPT_SELECT}
            WHERE ($1::text IS NULL OR r.status = $1)
              AND ($2::uuid IS NULL OR r.warehouse_id = $2)
            ORDER BY r.created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(warehouse_id)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM receipts r
            WHERE ($1::text IS NULL OR r.status = $1)
              AND ($2::uuid IS NULL OR r.warehouse_id = $2)
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        let receipts = rows
            .into_iter()
            .map(Receipt::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated::new(receipts, total, page, limit))
    }

    /// Get a receipt by ID
    pub async fn get(&self, receipt_id: Uuid) -> AppResult<Receipt> {
        let row = sqlx::query_as::<_, ReceiptRow>(&format!("{RECEIPT_SELECT} WHERE r.id = $1"))
            .bind(receipt_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Receipt".to_string()))?;

        row.try_into()
    }

    /// Create a new receipt in draft status
    pub async fn create(&self, input: CreateReceiptInput) -> AppResult<Receipt> {
        let warehouse_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(input.warehouse_id)
                .fetch_one(&self.db)
                .await?;
        if !warehouse_exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        self.check_items(&input.items).await?;

        let receipt_number = NumberingService::new(self.db.clone())
            .next_number(RECEIPT_PREFIX)
            .await?;

        let supplier = input
            .supplier
            .map(|s| serde_json::to_value(s))
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let items =
            serde_json::to_value(&input.items).map_err(|e| AppError::Internal(e.to_string()))?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO receipts (receipt_number, supplier, warehouse_id, items, status)
            VALUES ($1, $2, $3, $4, 'draft')
            RETURNING id
            "#,
        )
        .bind(&receipt_number)
        .bind(&supplier)
        .bind(input.warehouse_id)
        .bind(&items)
        .fetch_one(&self.db)
        .await?;

        self.get(id).await
    }

    /// Update a receipt; blocked once it is done or canceled
    pub async fn update(&self, receipt_id: Uuid, input: UpdateReceiptInput) -> AppResult<Receipt> {
        let existing = self.get(receipt_id).await?;
        let status = ReceiptStatus::from_str(&existing.status).map_err(AppError::Internal)?;

        if !status.can_update() {
            return Err(AppError::StateConflict(
                "Cannot update receipt that is done or canceled".to_string(),
            ));
        }

        if let Some(warehouse_id) = input.warehouse_id {
            let warehouse_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)",
            )
            .bind(warehouse_id)
            .fetch_one(&self.db)
            .await?;
            if !warehouse_exists {
                return Err(AppError::NotFound("Warehouse".to_string()));
            }
        }

        if let Some(items) = &input.items {
            self.check_items(items).await?;
        }

        let supplier = input
            .supplier
            .map(|s| serde_json::to_value(s))
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let items = input
            .items
            .map(|i| serde_json::to_value(i))
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE receipts
            SET supplier = COALESCE($2, supplier),
                warehouse_id = COALESCE($3, warehouse_id),
                items = COALESCE($4, items),
                status = COALESCE($5, status),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(receipt_id)
        .bind(&supplier)
        .bind(input.warehouse_id)
        .bind(&items)
        .bind(input.status.map(|s| s.as_str()))
        .execute(&self.db)
        .await?;

        self.get(receipt_id).await
    }

    /// Validate a receipt: book every line into stock and the ledger,
    /// then mark the receipt done. All-or-nothing.
    pub async fn validate(&self, receipt_id: Uuid, actor: Uuid) -> AppResult<Receipt> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, (Uuid, String, serde_json::Value)>(
            "SELECT warehouse_id, status, items FROM receipts WHERE id = $1 FOR UPDATE",
        )
        .bind(receipt_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Receipt".to_string()))?;

        let (warehouse_id, status, items_json) = row;
        let status = ReceiptStatus::from_str(&status).map_err(AppError::Internal)?;
        if !status.can_validate() {
            return Err(AppError::StateConflict(
                "Receipt must be in waiting or ready status to validate".to_string(),
            ));
        }

        let items: Vec<ReceiptItem> = serde_json::from_value(items_json)
            .map_err(|e| AppError::Internal(format!("Corrupt receipt items: {}", e)))?;
        if items.is_empty() {
            return Err(AppError::ValidationError(
                "Receipt has no line items".to_string(),
            ));
        }

        // Every target location must belong to the receipt's warehouse;
        // checked up front so a bad line leaves no stock touched.
        let location_ids: Vec<Uuid> = items.iter().map(|item| item.location_id).collect();
        let misplaced = sqlx::query_scalar::<_, String>(
            "SELECT code FROM locations WHERE id = ANY($1) AND warehouse_id <> $2 LIMIT 1",
        )
        .bind(&location_ids)
        .bind(warehouse_id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(code) = misplaced {
            return Err(AppError::ValidationError(format!(
                "Location {} does not belong to the receipt warehouse",
                code
            )));
        }

        for item in &items {
            let quantity_after: i64 = sqlx::query_scalar(
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
            .bind(warehouse_id)
            .bind(item.location_id)
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
            .bind(warehouse_id)
            .bind(item.location_id)
            .bind(TransactionType::Receipt.as_str())
            .bind(item.qty)
            .bind(quantity_after)
            .bind(actor)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "UPDATE receipts SET status = 'done', validated_by = $2, updated_at = now() WHERE id = $1",
        )
        .bind(receipt_id)
        .bind(actor)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get(receipt_id).await
    }

    /// Delete a receipt; blocked once it is done
    pub async fn delete(&self, receipt_id: Uuid) -> AppResult<()> {
        let existing = self.get(receipt_id).await?;
        let status = ReceiptStatus::from_str(&existing.status).map_err(AppError::Internal)?;

        if !status.can_delete() {
            return Err(AppError::StateConflict(
                "Cannot delete receipt that is done".to_string(),
            ));
        }

        sqlx::query("DELETE FROM receipts WHERE id = $1")
            .bind(receipt_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Validate line items and confirm their product and location
    /// references resolve
    async fn check_items(&self, items: &[ReceiptItem]) -> AppResult<()> {
        for item in items {
            validate_quantity(item.qty).map_err(|msg| AppError::Validation {
                field: "items.qty".to_string(),
                message: msg.to_string(),
            })?;
        }

        let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
        let location_ids: Vec<Uuid> = items.iter().map(|item| item.location_id).collect();
        check_references(&self.db, &product_ids, &location_ids).await
    }
}

/// Confirm that every referenced product and location exists
pub(crate) async fn check_references(
    db: &PgPool,
    product_ids: &[Uuid],
    location_ids: &[Uuid],
) -> AppResult<()> {
    let distinct_products: HashSet<Uuid> = product_ids.iter().copied().collect();
    let found_products = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT id) FROM products WHERE id = ANY($1)",
    )
    .bind(product_ids)
    .fetch_one(db)
    .await?;
    if found_products != distinct_products.len() as i64 {
        return Err(AppError::NotFound("Product".to_string()));
    }

    if !location_ids.is_empty() {
        let distinct_locations: HashSet<Uuid> = location_ids.iter().copied().collect();
        let found_locations = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT id) FROM locations WHERE id = ANY($1)",
        )
        .bind(location_ids)
        .fetch_one(db)
        .await?;
        if found_locations != distinct_locations.len() as i64 {
            return Err(AppError::NotFound("Location".to_string()));
        }
    }

    Ok(())
}
