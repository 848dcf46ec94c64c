//! Document numbering service
//!
//! Issues human-readable identifiers of the form `{prefix}{YYYYMM}{NNNN}`
//! backed by an atomic per-prefix-per-month counter, so two concurrent
//! creations can never draw the same number.

use chrono::Utc;
use sqlx::PgPool;

use crate::error::AppResult;
use shared::numbering;

/// Numbering service for workflow documents
#[derive(Clone)]
pub struct NumberingService {
    db: PgPool,
}

impl NumberingService {
    /// Create a new NumberingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Issue the next number for a prefix in the current month
    pub async fn next_number(&self, prefix: &str) -> AppResult<String> {
        let period = numbering::period_of(Utc::now().date_naive());

        let sequence: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO document_sequences (prefix, period, last_value)
            VALUES ($1, $2, 1)
            ON CONFLICT (prefix, period)
            DO UPDATE SET last_value = document_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(prefix)
        .bind(&period)
        .fetch_one(&self.db)
        .await?;

        Ok(numbering::format_number(prefix, &period, sequence))
    }
}
