//! Data models for user accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::types::BloodGroup;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Volunteer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "donor",
            Role::Volunteer => "volunteer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "donor" => Ok(Role::Donor),
            "volunteer" => Ok(Role::Volunteer),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Blocked,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Blocked => "blocked",
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, AccountStatus::Blocked)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "blocked" => Ok(AccountStatus::Blocked),
            _ => Err(()),
        }
    }
}

/// User account as stored. The password hash never leaves this module
/// except through the auth service.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub blood_group: BloodGroup,
    pub district: String,
    pub upazila: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_blocked(&self) -> bool {
        self.status.is_blocked()
    }
}

/// Sanitized user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub blood_group: BloodGroup,
    pub district: String,
    pub upazila: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            name: u.name,
            email: u.email,
            avatar: u.avatar,
            blood_group: u.blood_group,
            district: u.district,
            upazila: u.upazila,
            role: u.role,
            status: u.status,
            created_at: u.created_at,
        }
    }
}

/// Public donor-directory entry: contact card without account internals.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DonorView {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub blood_group: BloodGroup,
    pub district: String,
    pub upazila: String,
}

impl From<User> for DonorView {
    fn from(u: User) -> Self {
        Self {
            name: u.name,
            email: u.email,
            avatar: u.avatar,
            blood_group: u.blood_group,
            district: u.district,
            upazila: u.upazila,
        }
    }
}

/// Partial profile update; only provided fields change.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub district: Option<String>,
    pub upazila: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.avatar.is_none()
            && self.blood_group.is_none()
            && self.district.is_none()
            && self.upazila.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Donor, Role::Volunteer, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("superuser".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_status_roundtrip() {
        assert_eq!("active".parse::<AccountStatus>(), Ok(AccountStatus::Active));
        assert_eq!(
            "blocked".parse::<AccountStatus>(),
            Ok(AccountStatus::Blocked)
        );
        assert!("suspended".parse::<AccountStatus>().is_err());
        assert!(AccountStatus::Blocked.is_blocked());
        assert!(!AccountStatus::Active.is_blocked());
    }

    #[test]
    fn test_user_view_has_no_hash() {
        let json = serde_json::to_value(UserView {
            user_id: 7,
            name: "Rahim".into(),
            email: "rahim@example.com".into(),
            avatar: None,
            blood_group: BloodGroup::OPos,
            district: "Dhaka".into(),
            upazila: "Savar".into(),
            role: Role::Donor,
            status: AccountStatus::Active,
            created_at: Utc::now(),
        })
        .unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "donor");
        assert_eq!(json["blood_group"], "O+");
    }

    #[test]
    fn test_profile_patch_is_empty() {
        assert!(ProfilePatch::default().is_empty());
        let patch = ProfilePatch {
            district: Some("Khulna".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
