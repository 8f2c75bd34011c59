//! Funding ledger data models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Funding record ID - UUIDv4-based unique identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct FundingId(uuid::Uuid);

impl FundingId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for FundingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FundingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FundingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(uuid::Uuid::parse_str(s)?))
    }
}

/// Settlement status of a ledger entry. Only confirmed payments reach the
/// ledger, so every stored record is `succeeded` today.
pub const STATUS_SUCCEEDED: &str = "succeeded";

/// A funding ledger entry. `external_reference` is the idempotency key:
/// unique across all records, one entry per confirmed payment.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FundingRecord {
    pub id: FundingId,
    pub user_id: i64,
    /// Payer snapshot at payment time
    pub name: String,
    pub email: String,
    /// Serialized as a decimal string to avoid float precision loss
    #[schema(value_type = String, example = "500.00")]
    pub amount: Decimal,
    #[schema(example = "usd")]
    pub currency: String,
    /// Opaque reference from the payment gateway integration
    pub external_reference: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Payment confirmation payload from the gateway integration.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RecordPaymentInput {
    #[schema(example = "pi_1700000000_ab12cd34")]
    pub external_reference: Option<String>,
    /// Accepts a JSON number or decimal string
    #[schema(value_type = String, example = "500.00")]
    pub amount: Option<Decimal>,
    #[schema(example = "usd")]
    pub currency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funding_id_roundtrip() {
        let id = FundingId::new();
        assert_eq!(id.to_string().parse::<FundingId>().unwrap(), id);
        assert!("".parse::<FundingId>().is_err());
    }

    #[test]
    fn test_record_serializes_amount_as_decimal_string() {
        let record = FundingRecord {
            id: FundingId::new(),
            user_id: 3,
            name: "Payer".into(),
            email: "payer@example.com".into(),
            amount: Decimal::new(50050, 2),
            currency: "usd".into(),
            external_reference: "ref-1".into(),
            status: STATUS_SUCCEEDED.into(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["amount"], "500.50");
        assert_eq!(json["status"], "succeeded");
    }
}
