//! Delivery order workflow service
//!
//! Outbound documents progress through picking and packing before the
//! terminal completion deducts stock. Completion runs in a single
//! transaction with the touched stock rows locked; either every line is
//! deducted or none are.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    status_after_packing, status_after_picking, Customer, DeliveryItem, DeliveryStatus,
    TransactionType,
};
use crate::services::numbering::NumberingService;
use crate::services::receipt::check_references;
use shared::numbering::DELIVERY_PREFIX;
use shared::types::Paginated;
use shared::validation::validate_quantity;

/// Delivery service
#[derive(Clone)]
pub struct DeliveryService {
    db: PgPool,
}

/// Database row for a delivery order
#[derive(Debug, sqlx::FromRow)]
struct DeliveryRow {
    id: Uuid,
    delivery_number: String,
    customer: Option<serde_json::Value>,
    items: serde_json::Value,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Delivery order
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub id: Uuid,
    pub delivery_number: String,
    pub customer: Option<Customer>,
    pub items: Vec<DeliveryItem>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DeliveryRow> for Delivery {
    type Error = AppError;

    fn try_from(row: DeliveryRow) -> Result<Self, Self::Error> {
        let customer = row
            .customer
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Corrupt delivery customer: {}", e)))?;
        let items = serde_json::from_value(row.items)
            .map_err(|e| AppError::Internal(format!("Corrupt delivery items: {}", e)))?;
        Ok(Delivery {
            id: row.id,
            delivery_number: row.delivery_number,
            customer,
            items,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const DELIVERY_SELECT: &str = r#"
    SELECT d.id, d.delivery_number, d.customer, d.items, d.status,
           d.created_at, d.updated_at
    FROM delivery_orders d
"#;

/// Input for creating a delivery order
#[derive(Debug, Deserialize)]
pub struct CreateDeliveryInput {
    pub customer: Option<Customer>,
    pub items: Vec<DeliveryItem>,
}

/// Input for updating a delivery order
#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryInput {
    pub customer: Option<Customer>,
    pub items: Option<Vec<DeliveryItem>>,
    pub status: Option<DeliveryStatus>,
}

/// One picking progress update
#[derive(Debug, Deserialize)]
pub struct PickUpdate {
    pub product_id: Uuid,
    pub picked_qty: i64,
}

/// One packing progress update
#[derive(Debug, Deserialize)]
pub struct PackUpdate {
    pub product_id: Uuid,
    pub packed_qty: i64,
}

/// Input for completing a delivery: the stock to deduct from
#[derive(Debug, Deserialize)]
pub struct CompleteDeliveryInput {
    pub warehouse_id: Uuid,
    pub location_id: Uuid,
}

impl DeliveryService {
    /// Create a new DeliveryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List delivery orders, optionally filtered by status
    pub async fn list(
        &self,
        status: Option<DeliveryStatus>,
        page: u32,
        limit: u32,
    ) -> AppResult<Paginated<Delivery>> {
        let offset = i64::from(page.max(1) - 1) * i64::from(limit);

        let rows = sqlx::query_as::<_, DeliveryRow>(&format!(
            r#"
            {DELIVERY_SELECT}
            WHERE ($1::text IS NULL OR d.status = $1)
            ORDER BY d.created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM delivery_orders d WHERE ($1::text IS NULL OR d.status = $1)",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.db)
        .await?;

        let deliveries = rows
            .into_iter()
            .map(Delivery::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated::new(deliveries, total, page, limit))
    }

    /// Get a delivery order by ID
    pub async fn get(&self, delivery_id: Uuid) -> AppResult<Delivery> {
        let row = sqlx::query_as::<_, DeliveryRow>(&format!("{DELIVERY_SELECT} WHERE d.id = $1"))
            .bind(delivery_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Delivery order".to_string()))?;

        row.try_into()
    }

    /// Create a new delivery order in draft status
    pub async fn create(&self, input: CreateDeliveryInput) -> AppResult<Delivery> {
        self.check_items(&input.items).await?;

        let delivery_number = NumberingService::new(self.db.clone())
            .next_number(DELIVERY_PREFIX)
            .await?;

        let customer = input
            .customer
            .map(|c| serde_json::to_value(c))
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let items =
            serde_json::to_value(&input.items).map_err(|e| AppError::Internal(e.to_string()))?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO delivery_orders (delivery_number, customer, items, status)
            VALUES ($1, $2, $3, 'draft')
            RETURNING id
            "#,
        )
        .bind(&delivery_number)
        .bind(&customer)
        .bind(&items)
        .fetch_one(&self.db)
        .await?;

        self.get(id).await
    }

    /// Update a delivery order; blocked once it is done
    pub async fn update(
        &self,
        delivery_id: Uuid,
        input: UpdateDeliveryInput,
    ) -> AppResult<Delivery> {
        let existing = self.get(delivery_id).await?;
        let status = DeliveryStatus::from_str(&existing.status).map_err(AppError::Internal)?;

        if !status.can_update() {
            return Err(AppError::StateConflict(
                "Cannot update delivery order that is done".to_string(),
            ));
        }

        if let Some(items) = &input.items {
            self.check_items(items).await?;
        }

        let customer = input
            .customer
            .map(|c| serde_json::to_value(c))
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let items = input
            .items
            .map(|i| serde_json::to_value(i))
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE delivery_orders
            SET customer = COALESCE($2, customer),
                items = COALESCE($3, items),
                status = COALESCE($4, status),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(delivery_id)
        .bind(&customer)
        .bind(&items)
        .bind(input.status.map(|s| s.as_str()))
        .execute(&self.db)
        .await?;

        self.get(delivery_id).await
    }

    /// Record picking progress; a draft order starts picking, and a
    /// fully picked order advances to packing
    pub async fn update_picking(
        &self,
        delivery_id: Uuid,
        updates: Vec<PickUpdate>,
    ) -> AppResult<Delivery> {
        let existing = self.get(delivery_id).await?;
        let status = DeliveryStatus::from_str(&existing.status).map_err(AppError::Internal)?;

        let mut items = existing.items;
        for update in &updates {
            if update.picked_qty < 0 {
                return Err(AppError::Validation {
                    field: "picked_qty".to_string(),
                    message: "Picked quantity cannot be negative".to_string(),
                });
            }
            if let Some(item) = items.iter_mut().find(|i| i.product_id == update.product_id) {
                item.picked_qty = update.picked_qty;
            }
        }

        let next_status = status_after_picking(status, &items);
        self.save_progress(delivery_id, &items, next_status).await?;
        self.get(delivery_id).await
    }

    /// Record packing progress; a fully packed order becomes ready
    pub async fn update_packing(
        &self,
        delivery_id: Uuid,
        updates: Vec<PackUpdate>,
    ) -> AppResult<Delivery> {
        let existing = self.get(delivery_id).await?;
        let status = DeliveryStatus::from_str(&existing.status).map_err(AppError::Internal)?;

        let mut items = existing.items;
        for update in &updates {
            if update.packed_qty < 0 {
                return Err(AppError::Validation {
                    field: "packed_qty".to_string(),
                    message: "Packed quantity cannot be negative".to_string(),
                });
            }
            if let Some(item) = items.iter_mut().find(|i| i.product_id == update.product_id) {
                item.packed_qty = update.packed_qty;
            }
        }

        let next_status = status_after_packing(status, &items);
        self.save_progress(delivery_id, &items, next_status).await?;
        self.get(delivery_id).await
    }

    /// Complete a delivery: deduct every line from stock at the given
    /// (warehouse, location) and append ledger entries. All-or-nothing.
    pub async fn complete(
        &self,
        delivery_id: Uuid,
        input: CompleteDeliveryInput,
        actor: Uuid,
    ) -> AppResult<Delivery> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, (String, serde_json::Value)>(
            "SELECT status, items FROM delivery_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(delivery_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Delivery order".to_string()))?;

        let status = DeliveryStatus::from_str(&row.0).map_err(AppError::Internal)?;
        if !status.can_complete() {
            return Err(AppError::StateConflict(
                "Delivery must be ready to complete".to_string(),
            ));
        }

        let items: Vec<DeliveryItem> = serde_json::from_value(row.1)
            .map_err(|e| AppError::Internal(format!("Corrupt delivery items: {}", e)))?;
        if items.is_empty() {
            return Err(AppError::ValidationError(
                "Delivery order has no line items".to_string(),
            ));
        }

        let names = product_names(&mut tx, &items.iter().map(|i| i.product_id).collect::<Vec<_>>())
            .await?;

        for item in &items {
            let name = names
                .get(&item.product_id)
                .cloned()
                .unwrap_or_else(|| item.product_id.to_string());

            let stock = sqlx::query_as::<_, (Uuid, i64)>(
                r#"
                SELECT id, available_quantity FROM stocks
                WHERE product_id = $1 AND warehouse_id = $2 AND location_id = $3
                FOR UPDATE
                "#,
            )
            .bind(item.product_id)
            .bind(input.warehouse_id)
            .bind(input.location_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Stock for product {} at specified location", name))
            })?;

            let (stock_id, available) = stock;
            if available < item.qty {
                return Err(AppError::InsufficientStock(format!(
                    "Insufficient stock for product {}. Available: {}, Required: {}",
                    name, available, item.qty
                )));
            }

            let quantity_after: i64 = sqlx::query_scalar(
                "UPDATE stocks SET quantity = quantity - $2, updated_at = now() WHERE id = $1 RETURNING quantity",
            )
            .bind(stock_id)
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
            .bind(input.warehouse_id)
            .bind(input.location_id)
            .bind(TransactionType::Delivery.as_str())
            .bind(-item.qty)
            .bind(quantity_after)
            .bind(actor)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE delivery_orders SET status = 'done', updated_at = now() WHERE id = $1")
            .bind(delivery_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(delivery_id).await
    }

    /// Delete a delivery order; blocked once it is done
    pub async fn delete(&self, delivery_id: Uuid) -> AppResult<()> {
        let existing = self.get(delivery_id).await?;
        let status = DeliveryStatus::from_str(&existing.status).map_err(AppError::Internal)?;

        if !status.can_delete() {
            return Err(AppError::StateConflict(
                "Cannot delete delivery order that is done".to_string(),
            ));
        }

        sqlx::query("DELETE FROM delivery_orders WHERE id = $1")
            .bind(delivery_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn save_progress(
        &self,
        delivery_id: Uuid,
        items: &[DeliveryItem],
        status: DeliveryStatus,
    ) -> AppResult<()> {
        let items = serde_json::to_value(items).map_err(|e| AppError::Internal(e.to_string()))?;

        sqlx::query(
            "UPDATE delivery_orders SET items = $2, status = $3, updated_at = now() WHERE id = $1",
        )
        .bind(delivery_id)
        .bind(&items)
        .bind(status.as_str())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn check_items(&self, items: &[DeliveryItem]) -> AppResult<()> {
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

/// Load a product-id → name map for error messages
pub(crate) async fn product_names(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, String>> {
    let rows = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, name FROM products WHERE id = ANY($1)",
    )
    .bind(product_ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows.into_iter().collect())
}
