//! Funding Ledger service
//!
//! Validates payment confirmations, snapshots the payer identity and hands
//! the write to the idempotent repository path.

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::models::{FundingId, FundingRecord, RecordPaymentInput, STATUS_SUCCEEDED};
use super::repository::FundingRepository;
use crate::auth::service::Identity;
use crate::error::AppError;
use crate::types::{PageParams, Paginated};
use crate::users::repository::UserRepository;

pub struct FundingLedger {
    db: PgPool,
    repo: FundingRepository,
}

impl FundingLedger {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            repo: FundingRepository,
        }
    }

    /// Record a confirmed payment exactly once.
    ///
    /// Replays and concurrent duplicates of the same `external_reference`
    /// return the already-stored record unchanged; they are not errors.
    pub async fn record_payment(
        &self,
        actor: &Identity,
        input: RecordPaymentInput,
    ) -> Result<FundingRecord, AppError> {
        let (external_reference, amount, currency) = validate_payment(input)?;

        let user = UserRepository::get_by_id(&self.db, actor.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found"))?;

        let (record, created) = self
            .repo
            .insert_or_fetch(
                &self.db,
                FundingId::new(),
                user.user_id,
                &user.name,
                &user.email,
                amount,
                &currency,
                &external_reference,
                STATUS_SUCCEEDED,
            )
            .await?;

        if created {
            tracing::info!(
                funding_id = %record.id,
                user_id = record.user_id,
                amount = %record.amount,
                reference = %record.external_reference,
                "Funding recorded"
            );
        } else {
            tracing::info!(
                funding_id = %record.id,
                reference = %record.external_reference,
                "Duplicate payment confirmation - returning existing record"
            );
        }

        Ok(record)
    }

    /// All ledger entries, newest first.
    pub async fn list_all(
        &self,
        params: PageParams,
    ) -> Result<Paginated<FundingRecord>, AppError> {
        let (items, total) = self.repo.list_all(&self.db, params).await?;
        Ok(Paginated::new(items, params, total))
    }

    /// The caller's own entries, newest first.
    pub async fn list_mine(
        &self,
        actor: &Identity,
        params: PageParams,
    ) -> Result<Paginated<FundingRecord>, AppError> {
        let (items, total) = self.repo.list_by_user(&self.db, actor.user_id, params).await?;
        Ok(Paginated::new(items, params, total))
    }

    /// Sum of all recorded amounts (zero on an empty ledger).
    pub async fn total(&self) -> Result<Decimal, AppError> {
        self.repo.total(&self.db).await
    }
}

/// Check the confirmation payload; returns (reference, amount, currency).
fn validate_payment(input: RecordPaymentInput) -> Result<(String, Decimal, String), AppError> {
    let external_reference = input
        .external_reference
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::validation("Missing payment reference"))?;

    let amount = input
        .amount
        .ok_or_else(|| AppError::validation("Missing amount"))?;
    if amount <= Decimal::ZERO {
        return Err(AppError::validation("Amount must be greater than zero"));
    }

    let currency = input
        .currency
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::validation("Missing currency"))?;

    Ok((external_reference, amount, currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(reference: &str, amount: &str, currency: &str) -> RecordPaymentInput {
        RecordPaymentInput {
            external_reference: Some(reference.to_string()),
            amount: Some(amount.parse().unwrap()),
            currency: Some(currency.to_string()),
        }
    }

    #[test]
    fn test_validate_payment_ok() {
        let (reference, amount, currency) =
            validate_payment(input(" ref-123 ", "500", " USD ")).unwrap();
        assert_eq!(reference, "ref-123");
        assert_eq!(amount, Decimal::from(500));
        assert_eq!(currency, "usd");
    }

    #[test]
    fn test_validate_payment_rejects_non_positive_amount() {
        for amount in ["0", "-1", "-0.01"] {
            let err = validate_payment(input("ref", amount, "usd")).unwrap_err();
            assert_eq!(err.code(), "VALIDATION");
        }
    }

    #[test]
    fn test_validate_payment_requires_reference_and_currency() {
        let err = validate_payment(RecordPaymentInput {
            external_reference: None,
            amount: Some(Decimal::from(5)),
            currency: Some("usd".into()),
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing payment reference");

        let err = validate_payment(input("   ", "5", "usd")).unwrap_err();
        assert_eq!(err.to_string(), "Missing payment reference");

        let err = validate_payment(RecordPaymentInput {
            external_reference: Some("ref".into()),
            amount: Some(Decimal::from(5)),
            currency: None,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing currency");

        let err = validate_payment(RecordPaymentInput {
            external_reference: Some("ref".into()),
            amount: None,
            currency: Some("usd".into()),
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing amount");
    }
}
