//! Warehouse management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Address;
use shared::validation::validate_entity_code;

/// Warehouse service
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

/// Database row for a warehouse
#[derive(Debug, sqlx::FromRow)]
struct WarehouseRow {
    id: Uuid,
    name: String,
    code: String,
    address: Option<serde_json::Value>,
    manager_id: Option<Uuid>,
    manager_name: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Warehouse record with its manager populated
#[derive(Debug, Clone, Serialize)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<Address>,
    pub manager_id: Option<Uuid>,
    pub manager_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<WarehouseRow> for Warehouse {
    type Error = AppError;

    fn try_from(row: WarehouseRow) -> Result<Self, Self::Error> {
        let address = row
            .address
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Corrupt warehouse address: {}", e)))?;
        Ok(Warehouse {
            id: row.id,
            name: row.name,
            code: row.code,
            address,
            manager_id: row.manager_id,
            manager_name: row.manager_name,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const WAREHOUSE_SELECT: &str = r#"
    SELECT w.id, w.name, w.code, w.address, w.manager_id, u.full_name AS manager_name,
           w.is_active, w.created_at, w.updated_at
    FROM warehouses w
    LEFT JOIN users u ON u.id = w.manager_id
"#;

/// Input for creating a warehouse
#[derive(Debug, Deserialize)]
pub struct CreateWarehouseInput {
    pub name: String,
    pub code: String,
    pub address: Option<Address>,
    pub manager_id: Option<Uuid>,
}

/// Input for updating a warehouse
#[derive(Debug, Deserialize)]
pub struct UpdateWarehouseInput {
    pub name: Option<String>,
    pub code: Option<String>,
    pub address: Option<Address>,
    pub manager_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all warehouses
    pub async fn list(&self) -> AppResult<Vec<Warehouse>> {
        let rows = sqlx::query_as::<_, WarehouseRow>(&format!(
            "{WAREHOUSE_SELECT} ORDER BY w.created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Warehouse::try_from).collect()
    }

    /// Get a warehouse by ID
    pub async fn get(&self, warehouse_id: Uuid) -> AppResult<Warehouse> {
        let row = sqlx::query_as::<_, WarehouseRow>(&format!("{WAREHOUSE_SELECT} WHERE w.id = $1"))
            .bind(warehouse_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;

        row.try_into()
    }

    /// Create a new warehouse
    pub async fn create(&self, input: CreateWarehouseInput) -> AppResult<Warehouse> {
        validate_entity_code(&input.code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
        })?;
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }

        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses WHERE code = $1")
            .bind(&input.code)
            .fetch_one(&self.db)
            .await?;
        if exists > 0 {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let address = input
            .address
            .map(|a| serde_json::to_value(a))
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO warehouses (name, code, address, manager_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.code)
        .bind(&address)
        .bind(input.manager_id)
        .fetch_one(&self.db)
        .await?;

        self.get(id).await
    }

    /// Update a warehouse; a code change is checked for uniqueness
    pub async fn update(
        &self,
        warehouse_id: Uuid,
        input: UpdateWarehouseInput,
    ) -> AppResult<Warehouse> {
        let existing = self.get(warehouse_id).await?;

        if let Some(code) = &input.code {
            validate_entity_code(code).map_err(|msg| AppError::Validation {
                field: "code".to_string(),
                message: msg.to_string(),
            })?;
            if *code != existing.code {
                let taken = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM warehouses WHERE code = $1 AND id <> $2",
                )
                .bind(code)
                .bind(warehouse_id)
                .fetch_one(&self.db)
                .await?;
                if taken > 0 {
                    return Err(AppError::DuplicateEntry("code".to_string()));
                }
            }
        }

        let address = input
            .address
            .map(|a| serde_json::to_value(a))
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE warehouses
            SET name = COALESCE($2, name),
                code = COALESCE($3, code),
                address = COALESCE($4, address),
                manager_id = COALESCE($5, manager_id),
                is_active = COALESCE($6, is_active),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(warehouse_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(&address)
        .bind(input.manager_id)
        .bind(input.is_active)
        .execute(&self.db)
        .await?;

        self.get(warehouse_id).await
    }

    /// Delete a warehouse; blocked while it has locations or non-zero
    /// stock
    pub async fn delete(&self, warehouse_id: Uuid) -> AppResult<()> {
        self.get(warehouse_id).await?;

        let has_stock = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stocks WHERE warehouse_id = $1 AND quantity > 0",
        )
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;
        if has_stock > 0 {
            return Err(AppError::StateConflict(
                "Cannot delete warehouse with existing stock".to_string(),
            ));
        }

        let has_locations = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM locations WHERE warehouse_id = $1",
        )
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;
        if has_locations > 0 {
            return Err(AppError::StateConflict(
                "Cannot delete warehouse with locations. Delete locations first".to_string(),
            ));
        }

        let has_documents = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM receipts WHERE warehouse_id = $1)
                 + (SELECT COUNT(*) FROM transfers
                    WHERE source_warehouse_id = $1 OR destination_warehouse_id = $1)
            "#,
        )
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;
        if has_documents > 0 {
            return Err(AppError::StateConflict(
                "Cannot delete warehouse referenced by documents".to_string(),
            ));
        }

        sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(warehouse_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
