//! Stock ledger query service
//!
//! The ledger itself is written only by the workflow services inside
//! their transactions; this service is read-only.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::TransactionType;
use shared::types::Paginated;

/// Ledger service
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// Ledger entry with product, location, and actor populated
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub warehouse_id: Uuid,
    pub warehouse_code: String,
    pub location_id: Uuid,
    pub location_code: String,
    pub transaction_type: String,
    pub quantity_change: i64,
    pub quantity_after: i64,
    pub performed_by: Option<Uuid>,
    pub performed_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

const LEDGER_SELECT: &str = r#"
    SELECT e.id, e.product_id, p.name AS product_name, p.sku AS product_sku,
           e.warehouse_id, w.code AS warehouse_code,
           e.location_id, l.code AS location_code,
           e.transaction_type, e.quantity_change, e.quantity_after,
           e.performed_by, u.full_name AS performed_by_name, e.created_at
    FROM stock_ledger e
    JOIN products p ON p.id = e.product_id
    JOIN warehouses w ON w.id = e.warehouse_id
    JOIN locations l ON l.id = e.location_id
    LEFT JOIN users u ON u.id = e.performed_by
"#;

/// Filters accepted by the ledger list endpoints
#[derive(Debug, Default, Clone, Copy)]
pub struct LedgerFilter {
    pub product_id: Option<Uuid>,
    pub transaction_type: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// In/out totals over a set of ledger entries
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LedgerSummary {
    pub total_in: i64,
    pub total_out: i64,
    pub total_adjustments: i64,
    pub transactions: i64,
}

/// A product's ledger with its summary
#[derive(Debug, Serialize)]
pub struct ProductLedger {
    pub entries: Vec<LedgerEntry>,
    pub summary: LedgerSummary,
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List ledger entries, newest first
    pub async fn list(
        &self,
        filter: LedgerFilter,
        page: u32,
        limit: u32,
    ) -> AppResult<Paginated<LedgerEntry>> {
        let offset = i64::from(page.max(1) - 1) * i64::from(limit);
        let transaction_type = filter.transaction_type.map(|t| t.as_str());

        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            r#"
            {LEDGER_SELECT}
            WHERE ($1::uuid IS NULL OR e.product_id = $1)
              AND ($2::text IS NULL OR e.transaction_type = $2)
              AND ($3::date IS NULL OR e.created_at::date >= $3)
              AND ($4::date IS NULL OR e.created_at::date <= $4)
            ORDER BY e.created_at DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(filter.product_id)
        .bind(transaction_type)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM stock_ledger e
            WHERE ($1::uuid IS NULL OR e.product_id = $1)
              AND ($2::text IS NULL OR e.transaction_type = $2)
              AND ($3::date IS NULL OR e.created_at::date >= $3)
              AND ($4::date IS NULL OR e.created_at::date <= $4)
            "#,
        )
        .bind(filter.product_id)
        .bind(transaction_type)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        Ok(Paginated::new(entries, total, page, limit))
    }

    /// Get a single ledger entry
    pub async fn get(&self, entry_id: Uuid) -> AppResult<LedgerEntry> {
        sqlx::query_as::<_, LedgerEntry>(&format!("{LEDGER_SELECT} WHERE e.id = $1"))
            .bind(entry_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Ledger entry".to_string()))
    }

    /// All entries for one product together with in/out totals
    pub async fn product_ledger(
        &self,
        product_id: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> AppResult<ProductLedger> {
        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;
        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            r#"
            {LEDGER_SELECT}
            WHERE e.product_id = $1
              AND ($2::date IS NULL OR e.created_at::date >= $2)
              AND ($3::date IS NULL OR e.created_at::date <= $3)
            ORDER BY e.created_at DESC
            "#
        ))
        .bind(product_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.db)
        .await?;

        let summary = sqlx::query_as::<_, LedgerSummary>(
            r#"
            SELECT COALESCE(SUM(quantity_change) FILTER (WHERE quantity_change > 0), 0)::BIGINT AS total_in,
                   COALESCE(ABS(SUM(quantity_change) FILTER (WHERE quantity_change < 0)), 0)::BIGINT AS total_out,
                   COUNT(*) FILTER (WHERE transaction_type = 'adjustment') AS total_adjustments,
                   COUNT(*) AS transactions
            FROM stock_ledger
            WHERE product_id = $1
              AND ($2::date IS NULL OR created_at::date >= $2)
              AND ($3::date IS NULL OR created_at::date <= $3)
            "#,
        )
        .bind(product_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.db)
        .await?;

        Ok(ProductLedger { entries, summary })
    }
}
