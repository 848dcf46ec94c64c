//! Storage location service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::LocationType;
use shared::validation::validate_entity_code;

/// Location service
#[derive(Clone)]
pub struct LocationService {
    db: PgPool,
}

/// Location record with its warehouse populated
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Location {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub warehouse_code: String,
    pub name: String,
    pub code: String,
    pub location_type: String,
    pub capacity: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const LOCATION_SELECT: &str = r#"
    SELECT l.id, l.warehouse_id, w.name AS warehouse_name, w.code AS warehouse_code,
           l.name, l.code, l.location_type, l.capacity, l.created_at, l.updated_at
    FROM locations l
    JOIN warehouses w ON w.id = l.warehouse_id
"#;

/// Input for creating a location
#[derive(Debug, Deserialize)]
pub struct CreateLocationInput {
    pub warehouse_id: Uuid,
    pub name: String,
    pub code: String,
    pub location_type: LocationType,
    pub capacity: Option<i64>,
}

/// Input for updating a location
#[derive(Debug, Deserialize)]
pub struct UpdateLocationInput {
    pub name: Option<String>,
    pub code: Option<String>,
    pub location_type: Option<LocationType>,
    pub capacity: Option<i64>,
}

impl LocationService {
    /// Create a new LocationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List locations, optionally for one warehouse
    pub async fn list(&self, warehouse_id: Option<Uuid>) -> AppResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(&format!(
            r#"
            {LOCATION_SELECT}
            WHERE ($1::uuid IS NULL OR l.warehouse_id = $1)
            ORDER BY l.created_at DESC
            "#
        ))
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;

        Ok(locations)
    }

    /// Get a location by ID
    pub async fn get(&self, location_id: Uuid) -> AppResult<Location> {
        sqlx::query_as::<_, Location>(&format!("{LOCATION_SELECT} WHERE l.id = $1"))
            .bind(location_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Location".to_string()))
    }

    /// Create a new location; the code must be unique within its
    /// warehouse
    pub async fn create(&self, input: CreateLocationInput) -> AppResult<Location> {
        validate_entity_code(&input.code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
        })?;

        let warehouse_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(input.warehouse_id)
                .fetch_one(&self.db)
                .await?;
        if !warehouse_exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM locations WHERE warehouse_id = $1 AND code = $2",
        )
        .bind(input.warehouse_id)
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;
        if taken > 0 {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO locations (warehouse_id, name, code, location_type, capacity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.warehouse_id)
        .bind(input.name.trim())
        .bind(&input.code)
        .bind(input.location_type.as_str())
        .bind(input.capacity)
        .fetch_one(&self.db)
        .await?;

        self.get(id).await
    }

    /// Update a location; a code change is checked for uniqueness within
    /// the warehouse
    pub async fn update(
        &self,
        location_id: Uuid,
        input: UpdateLocationInput,
    ) -> AppResult<Location> {
        let existing = self.get(location_id).await?;

        if let Some(code) = &input.code {
            validate_entity_code(code).map_err(|msg| AppError::Validation {
                field: "code".to_string(),
                message: msg.to_string(),
            })?;
            if *code != existing.code {
                let taken = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM locations WHERE warehouse_id = $1 AND code = $2 AND id <> $3",
                )
                .bind(existing.warehouse_id)
                .bind(code)
                .bind(location_id)
                .fetch_one(&self.db)
                .await?;
                if taken > 0 {
                    return Err(AppError::DuplicateEntry("code".to_string()));
                }
            }
        }

        sqlx::query(
            r#"
            UPDATE locations
            SET name = COALESCE($2, name),
                code = COALESCE($3, code),
                location_type = COALESCE($4, location_type),
                capacity = COALESCE($5, capacity),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(location_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(input.location_type.map(|t| t.as_str()))
        .bind(input.capacity)
        .execute(&self.db)
        .await?;

        self.get(location_id).await
    }

    /// Delete a location; blocked while it has non-zero stock or ledger
    /// history
    pub async fn delete(&self, location_id: Uuid) -> AppResult<()> {
        self.get(location_id).await?;

        let has_stock = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stocks WHERE location_id = $1 AND quantity > 0",
        )
        .bind(location_id)
        .fetch_one(&self.db)
        .await?;
        if has_stock > 0 {
            return Err(AppError::StateConflict(
                "Cannot delete location with existing stock".to_string(),
            ));
        }

        let has_history = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock_ledger WHERE location_id = $1",
        )
        .bind(location_id)
        .fetch_one(&self.db)
        .await?;
        if has_history > 0 {
            return Err(AppError::StateConflict(
                "Cannot delete location with ledger history".to_string(),
            ));
        }

        sqlx::query("DELETE FROM stocks WHERE location_id = $1")
            .bind(location_id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(location_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Check that a location belongs to the given warehouse
    pub async fn belongs_to_warehouse(
        &self,
        location_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<bool> {
        let row = sqlx::query_scalar::<_, Uuid>(
            "SELECT warehouse_id FROM locations WHERE id = $1",
        )
        .bind(location_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Location".to_string()))?;

        Ok(row == warehouse_id)
    }
}
