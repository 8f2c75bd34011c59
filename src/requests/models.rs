//! Donation request aggregate and its API shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::types::BloodGroup;
use crate::users::models::User;

/// Request ID - UUIDv4-based unique identifier, assigned at creation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct RequestId(uuid::Uuid);

impl RequestId {
    /// Generate a new unique RequestId
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(uuid::Uuid::parse_str(s)?))
    }
}

/// Request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Inprogress,
    Done,
    Canceled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Inprogress => "inprogress",
            RequestStatus::Done => "done",
            RequestStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "inprogress" => Ok(RequestStatus::Inprogress),
            "done" => Ok(RequestStatus::Done),
            "canceled" => Ok(RequestStatus::Canceled),
            _ => Err(()),
        }
    }
}

/// Who needs the blood.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Recipient {
    pub name: String,
    pub district: String,
    pub upazila: String,
}

/// Identity snapshot captured at the moment of an identity-bearing action
/// (creation or acceptance). Intentionally stale: later profile edits do
/// not propagate here. Only `user_id` participates in authorization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonSnapshot {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub district: String,
    pub upazila: String,
    pub blood_group: BloodGroup,
}

impl PersonSnapshot {
    pub fn capture(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            district: user.district.clone(),
            upazila: user.upazila.clone(),
            blood_group: user.blood_group,
        }
    }
}

/// Snapshot projection for unauthenticated viewers: contact identifiers
/// (email, user id) stripped.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicPerson {
    pub name: String,
    pub district: String,
    pub upazila: String,
    pub blood_group: BloodGroup,
}

impl From<PersonSnapshot> for PublicPerson {
    fn from(p: PersonSnapshot) -> Self {
        Self {
            name: p.name,
            district: p.district,
            upazila: p.upazila,
            blood_group: p.blood_group,
        }
    }
}

/// The donation request aggregate.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DonationRequest {
    pub id: RequestId,
    pub recipient: Recipient,
    pub hospital_name: String,
    pub full_address: String,
    pub blood_group: BloodGroup,
    /// Schedule as submitted on the form, e.g. "2025-12-10"
    pub donation_date: String,
    /// e.g. "14:30"
    pub donation_time: String,
    pub request_message: Option<String>,
    pub status: RequestStatus,
    pub requester: PersonSnapshot,
    pub donor: Option<PersonSnapshot>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonationRequest {
    pub fn donor_user_id(&self) -> Option<i64> {
        self.donor.as_ref().map(|d| d.user_id)
    }
}

/// Public view of a request with the privacy projection applied.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicRequestView {
    pub id: RequestId,
    pub recipient: Recipient,
    pub hospital_name: String,
    pub full_address: String,
    pub blood_group: BloodGroup,
    pub donation_date: String,
    pub donation_time: String,
    pub request_message: Option<String>,
    pub status: RequestStatus,
    pub requester: PublicPerson,
    pub donor: Option<PublicPerson>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DonationRequest> for PublicRequestView {
    fn from(r: DonationRequest) -> Self {
        Self {
            id: r.id,
            recipient: r.recipient,
            hospital_name: r.hospital_name,
            full_address: r.full_address,
            blood_group: r.blood_group,
            donation_date: r.donation_date,
            donation_time: r.donation_time,
            request_message: r.request_message,
            status: r.status,
            requester: r.requester.into(),
            donor: r.donor.map(Into::into),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ============================================================================
// API Input Shapes
// ============================================================================

/// Creation payload. All fields arrive optional so that missing ones are
/// reported as a validation failure rather than a deserialization error;
/// the engine enforces presence.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateRequestInput {
    pub recipient_name: Option<String>,
    pub recipient_district: Option<String>,
    pub recipient_upazila: Option<String>,
    pub hospital_name: Option<String>,
    pub full_address: Option<String>,
    /// One of the 8 enumerated blood groups
    pub blood_group: Option<String>,
    pub donation_date: Option<String>,
    pub donation_time: Option<String>,
    pub request_message: Option<String>,
    pub is_public: Option<bool>,
}

/// Partial update payload: only provided fields change.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRequestInput {
    pub recipient_name: Option<String>,
    pub recipient_district: Option<String>,
    pub recipient_upazila: Option<String>,
    pub hospital_name: Option<String>,
    pub full_address: Option<String>,
    pub blood_group: Option<String>,
    pub donation_date: Option<String>,
    pub donation_time: Option<String>,
    pub request_message: Option<String>,
    pub is_public: Option<bool>,
}

/// Status change payload.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StatusChangeInput {
    #[schema(example = "done")]
    pub status: Option<String>,
}

/// List-view query parameters: optional status filter plus pagination.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RequestListQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::models::{AccountStatus, Role};

    #[test]
    fn test_status_roundtrip() {
        for s in [
            RequestStatus::Pending,
            RequestStatus::Inprogress,
            RequestStatus::Done,
            RequestStatus::Canceled,
        ] {
            assert_eq!(s.as_str().parse::<RequestStatus>(), Ok(s));
        }
        assert!("in-progress".parse::<RequestStatus>().is_err());
        assert!("DONE".parse::<RequestStatus>().is_err());
        assert!("".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn test_request_id_roundtrip() {
        let id = RequestId::new();
        let parsed: RequestId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<RequestId>().is_err());
    }

    fn sample_user(user_id: i64) -> User {
        User {
            user_id,
            name: "Karim".into(),
            email: "karim@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            avatar: None,
            blood_group: BloodGroup::BPos,
            district: "Dhaka".into(),
            upazila: "Dhanmondi".into(),
            role: Role::Donor,
            status: AccountStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_capture() {
        let user = sample_user(5);
        let snap = PersonSnapshot::capture(&user);
        assert_eq!(snap.user_id, 5);
        assert_eq!(snap.email, "karim@example.com");
        assert_eq!(snap.blood_group, BloodGroup::BPos);
    }

    #[test]
    fn test_public_view_strips_contact_identifiers() {
        let user = sample_user(5);
        let request = DonationRequest {
            id: RequestId::new(),
            recipient: Recipient {
                name: "Patient".into(),
                district: "Dhaka".into(),
                upazila: "Savar".into(),
            },
            hospital_name: "City Hospital".into(),
            full_address: "12 Road".into(),
            blood_group: BloodGroup::ONeg,
            donation_date: "2026-01-15".into(),
            donation_time: "10:00".into(),
            request_message: None,
            status: RequestStatus::Inprogress,
            requester: PersonSnapshot::capture(&user),
            donor: Some(PersonSnapshot::capture(&sample_user(9))),
            is_public: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(PublicRequestView::from(request)).unwrap();
        assert!(json["requester"].get("email").is_none());
        assert!(json["requester"].get("user_id").is_none());
        assert!(json["donor"].get("email").is_none());
        assert!(json["donor"].get("user_id").is_none());
        assert_eq!(json["requester"]["name"], "Karim");
        assert_eq!(json["donor"]["blood_group"], "B+");
    }
}
