//! CSV export service
//!
//! Renders stock and product listings as CSV with a UTF-8 BOM for
//! spreadsheet compatibility.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Byte-order mark prepended so Excel detects UTF-8
const UTF8_BOM: &str = "\u{FEFF}";

/// Export service
#[derive(Clone)]
pub struct ExportService {
    db: PgPool,
}

/// One stock line in the export, with human column headers
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StockExportRow {
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Warehouse")]
    pub warehouse_name: String,
    #[serde(rename = "Warehouse Code")]
    pub warehouse_code: String,
    #[serde(rename = "Location")]
    pub location_name: String,
    #[serde(rename = "Location Code")]
    pub location_code: String,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "Reserved Quantity")]
    pub reserved_quantity: i64,
    #[serde(rename = "Available Quantity")]
    pub available_quantity: i64,
    #[serde(rename = "Cost Price")]
    pub cost_price: Decimal,
    #[serde(rename = "Selling Price")]
    pub selling_price: Decimal,
    #[serde(rename = "Total Value")]
    pub total_value: Decimal,
}

/// One product line in the export
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProductExportRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Unit of Measure")]
    pub unit_of_measure: String,
    #[serde(rename = "Cost Price")]
    pub cost_price: Decimal,
    #[serde(rename = "Selling Price")]
    pub selling_price: Decimal,
    #[serde(rename = "Reorder Point")]
    pub reorder_point: i64,
    #[serde(rename = "Reorder Quantity")]
    pub reorder_quantity: i64,
    #[serde(rename = "Barcode")]
    pub barcode: Option<String>,
}

impl ExportService {
    /// Create a new ExportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Export stock rows as CSV, optionally filtered by warehouse and
    /// product
    pub async fn export_stock(
        &self,
        warehouse_id: Option<Uuid>,
        product_id: Option<Uuid>,
    ) -> AppResult<String> {
        let rows = sqlx::query_as::<_, StockExportRow>(
            r#"
            SELECT p.name AS product_name, p.sku, p.category,
                   w.name AS warehouse_name, w.code AS warehouse_code,
                   l.name AS location_name, l.code AS location_code,
                   s.quantity, s.reserved_quantity, s.available_quantity,
                   p.cost_price, p.selling_price,
                   s.quantity * p.cost_price AS total_value
            FROM stocks s
            JOIN products p ON p.id = s.product_id
            JOIN warehouses w ON w.id = s.warehouse_id
            JOIN locations l ON l.id = s.location_id
            WHERE ($1::uuid IS NULL OR s.warehouse_id = $1)
              AND ($2::uuid IS NULL OR s.product_id = $2)
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(warehouse_id)
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Self::to_csv(&rows)
    }

    /// Export the product catalog as CSV, optionally filtered by
    /// category and a name/SKU search term
    pub async fn export_products(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> AppResult<String> {
        let pattern = search.map(|s| format!("%{}%", s));

        let rows = sqlx::query_as::<_, ProductExportRow>(
            r#"
            SELECT name, sku, description, category, unit_of_measure,
                   cost_price, selling_price, reorder_point, reorder_quantity, barcode
            FROM products
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR name ILIKE $2 OR sku ILIKE $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(category)
        .bind(&pattern)
        .fetch_all(&self.db)
        .await?;

        Self::to_csv(&rows)
    }

    /// Serialize rows to CSV text with a UTF-8 BOM
    pub fn to_csv<T: Serialize>(rows: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for row in rows {
            wtr.serialize(row).map_err(|e| {
                AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;

        Ok(format!("{UTF8_BOM}{data}"))
    }
}
