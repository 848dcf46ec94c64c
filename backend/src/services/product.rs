//! Product catalog service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::types::Paginated;
use shared::validation::validate_sku;

/// Product service for catalog management
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Product record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_of_measure: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub reorder_point: i64,
    pub reorder_quantity: i64,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str = "id, name, sku, description, category, unit_of_measure, cost_price, \
                               selling_price, reorder_point, reorder_quantity, barcode, image_url, \
                               created_at, updated_at";

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_of_measure: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub reorder_point: Option<i64>,
    pub reorder_quantity: Option<i64>,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
}

/// Input for updating a product; omitted fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_of_measure: Option<String>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub reorder_point: Option<i64>,
    pub reorder_quantity: Option<i64>,
    pub barcode: Option<String>,
    pub image_url: Option<String>,
}

/// A product whose summed availability has fallen to its reorder point
#[derive(Debug, Serialize)]
pub struct LowStockProduct {
    pub product: Product,
    pub total_available: i64,
    pub reorder_point: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct LowStockRow {
    #[sqlx(flatten)]
    product: Product,
    total_available: i64,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products, optionally filtered by a name/SKU search term and
    /// category
    pub async fn list(
        &self,
        search: Option<&str>,
        category: Option<&str>,
        page: u32,
        limit: u32,
    ) -> AppResult<Paginated<Product>> {
        let pattern = search.map(|s| format!("%{}%", s));
        let offset = i64::from(page.max(1) - 1) * i64::from(limit);

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1)
              AND ($2::text IS NULL OR category = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&pattern)
        .bind(category)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1)
              AND ($2::text IS NULL OR category = $2)
            "#,
        )
        .bind(&pattern)
        .bind(category)
        .fetch_one(&self.db)
        .await?;

        Ok(Paginated::new(products, total, page, limit))
    }

    /// Get a product by ID
    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Create a new product
    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_sku(&input.sku).map_err(|msg| AppError::Validation {
            field: "sku".to_string(),
            message: msg.to_string(),
        })?;
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }
        if input.cost_price < Decimal::ZERO || input.selling_price < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Prices cannot be negative".to_string(),
            ));
        }

        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE sku = $1")
            .bind(&input.sku)
            .fetch_one(&self.db)
            .await?;
        if exists > 0 {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (name, sku, description, category, unit_of_measure,
                                  cost_price, selling_price, reorder_point, reorder_quantity,
                                  barcode, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(&input.sku)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.unit_of_measure)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.reorder_point.unwrap_or(10))
        .bind(input.reorder_quantity.unwrap_or(50))
        .bind(&input.barcode)
        .bind(&input.image_url)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    /// Update a product; a SKU change is checked for uniqueness
    pub async fn update(&self, product_id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let existing = self.get(product_id).await?;

        if let Some(sku) = &input.sku {
            validate_sku(sku).map_err(|msg| AppError::Validation {
                field: "sku".to_string(),
                message: msg.to_string(),
            })?;
            if *sku != existing.sku {
                let taken = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM products WHERE sku = $1 AND id <> $2",
                )
                .bind(sku)
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;
                if taken > 0 {
                    return Err(AppError::DuplicateEntry("sku".to_string()));
                }
            }
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                sku = COALESCE($3, sku),
                description = COALESCE($4, description),
                category = COALESCE($5, category),
                unit_of_measure = COALESCE($6, unit_of_measure),
                cost_price = COALESCE($7, cost_price),
                selling_price = COALESCE($8, selling_price),
                reorder_point = COALESCE($9, reorder_point),
                reorder_quantity = COALESCE($10, reorder_quantity),
                barcode = COALESCE($11, barcode),
                image_url = COALESCE($12, image_url),
                updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product_id)
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.unit_of_measure)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.reorder_point)
        .bind(input.reorder_quantity)
        .bind(&input.barcode)
        .bind(&input.image_url)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    /// Delete a product; blocked while any stock row still holds units
    pub async fn delete(&self, product_id: Uuid) -> AppResult<()> {
        self.get(product_id).await?;

        let has_stock = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stocks WHERE product_id = $1 AND quantity > 0",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if has_stock > 0 {
            return Err(AppError::StateConflict(
                "Cannot delete product with existing stock".to_string(),
            ));
        }

        // The ledger is append-only; a product that ever moved stays.
        let has_history = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock_ledger WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if has_history > 0 {
            return Err(AppError::StateConflict(
                "Cannot delete product with ledger history".to_string(),
            ));
        }

        sqlx::query("DELETE FROM stocks WHERE product_id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Products whose summed available quantity is at or below their
    /// reorder point
    pub async fn low_stock(&self) -> AppResult<Vec<LowStockProduct>> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT p.id, p.name, p.sku, p.description, p.category, p.unit_of_measure,
                   p.cost_price, p.selling_price, p.reorder_point, p.reorder_quantity,
                   p.barcode, p.image_url, p.created_at, p.updated_at,
                   COALESCE(SUM(s.available_quantity), 0)::BIGINT AS total_available
            FROM products p
            LEFT JOIN stocks s ON s.product_id = p.id
            GROUP BY p.id
            HAVING COALESCE(SUM(s.available_quantity), 0) <= p.reorder_point
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let reorder_point = row.product.reorder_point;
                LowStockProduct {
                    product: row.product,
                    total_available: row.total_available,
                    reorder_point,
                }
            })
            .collect())
    }
}
