//! Funding ledger persistence
//!
//! The write path is a unique-constraint insert-or-fetch on
//! `external_reference`: concurrent duplicate confirmations converge to a
//! single row without a separate existence check.

use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::models::{FundingId, FundingRecord};
use crate::error::AppError;
use crate::types::PageParams;

const COLUMNS: &str = "funding_id, user_id, name, email, amount, currency, \
                       external_reference, status, created_at";

/// Funding ledger database operations
pub struct FundingRepository;

impl FundingRepository {
    /// Insert a record, or fetch the existing one with the same external
    /// reference.
    ///
    /// `ON CONFLICT DO NOTHING` makes the uniqueness decision inside the
    /// store; when the insert is skipped the existing row is fetched and
    /// returned unchanged. Returns `(record, created)`.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_or_fetch(
        &self,
        pool: &PgPool,
        id: FundingId,
        user_id: i64,
        name: &str,
        email: &str,
        amount: Decimal,
        currency: &str,
        external_reference: &str,
        status: &str,
    ) -> Result<(FundingRecord, bool), AppError> {
        let inserted = sqlx::query(&format!(
            r#"
            INSERT INTO funding_records_tb
                (funding_id, user_id, name, email, amount, currency, external_reference, status)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (external_reference) DO NOTHING
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.to_string())
        .bind(user_id)
        .bind(name)
        .bind(email)
        .bind(amount)
        .bind(currency)
        .bind(external_reference)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        if let Some(row) = inserted {
            return Ok((row_to_record(&row)?, true));
        }

        // Lost the insert race (or a replayed confirmation): the winning
        // row must exist, return it unchanged.
        let existing = self
            .get_by_reference(pool, external_reference)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Funding record for reference {} vanished after conflict",
                    external_reference
                ))
            })?;

        Ok((existing, false))
    }

    /// Get a record by its external payment reference
    pub async fn get_by_reference(
        &self,
        pool: &PgPool,
        external_reference: &str,
    ) -> Result<Option<FundingRecord>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM funding_records_tb WHERE external_reference = $1"
        ))
        .bind(external_reference)
        .fetch_optional(pool)
        .await?;

        row.map(|r| row_to_record(&r)).transpose()
    }

    /// All records, newest first.
    pub async fn list_all(
        &self,
        pool: &PgPool,
        params: PageParams,
    ) -> Result<(Vec<FundingRecord>, i64), AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM funding_records_tb")
            .fetch_one(pool)
            .await?;

        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM funding_records_tb \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

        let records = rows
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, total))
    }

    /// Records paid by the given user, newest first.
    pub async fn list_by_user(
        &self,
        pool: &PgPool,
        user_id: i64,
        params: PageParams,
    ) -> Result<(Vec<FundingRecord>, i64), AppError> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM funding_records_tb WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM funding_records_tb WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

        let records = rows
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, total))
    }

    /// Sum of all amounts; zero when the ledger is empty.
    pub async fn total(&self, pool: &PgPool) -> Result<Decimal, AppError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM funding_records_tb",
        )
        .fetch_one(pool)
        .await?;

        Ok(total)
    }
}

/// Convert a database row to a FundingRecord
fn row_to_record(row: &PgRow) -> Result<FundingRecord, AppError> {
    let id: String = row.get("funding_id");
    let id = id
        .parse::<FundingId>()
        .map_err(|_| AppError::Internal(format!("Invalid funding_id format: {}", id)))?;

    Ok(FundingRecord {
        id,
        user_id: row.get("user_id"),
        name: row.get("name"),
        email: row.get("email"),
        amount: row.get("amount"),
        currency: row.get("currency"),
        external_reference: row.get("external_reference"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    })
}
