//! Authorization policy
//!
//! Every entry point funnels its role and ownership decisions through these
//! functions instead of inlining its own conditionals, so there is exactly
//! one copy of each rule.

use crate::error::AppError;
use crate::users::models::Role;

use super::service::Identity;

/// Allow only callers holding one of the given roles.
pub fn require_role(actor: &Identity, roles: &[Role]) -> Result<(), AppError> {
    if roles.contains(&actor.role) {
        Ok(())
    } else {
        Err(AppError::forbidden("Insufficient role"))
    }
}

/// Allow administrators.
pub fn require_admin(actor: &Identity) -> Result<(), AppError> {
    require_role(actor, &[Role::Admin])
}

/// Allow the record owner or an administrator.
pub fn require_owner_or_admin(actor: &Identity, owner_id: i64) -> Result<(), AppError> {
    if actor.role == Role::Admin || actor.user_id == owner_id {
        Ok(())
    } else {
        Err(AppError::forbidden("Not allowed to modify this record"))
    }
}

/// Allow any party to the record (owner or assigned donor) or an
/// administrator.
pub fn require_party_or_admin(
    actor: &Identity,
    owner_id: i64,
    donor_id: Option<i64>,
) -> Result<(), AppError> {
    if actor.role == Role::Admin || actor.user_id == owner_id || donor_id == Some(actor.user_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("Not a party to this record"))
    }
}

/// Operation-level check for identity-bearing actions (creation, accept):
/// blocked accounts are rejected here, not by a blanket middleware gate.
pub fn require_active(actor_blocked: bool, action: &str) -> Result<(), AppError> {
    if actor_blocked {
        Err(AppError::forbidden(format!(
            "Blocked users cannot {}",
            action
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::models::AccountStatus;

    fn identity(user_id: i64, role: Role) -> Identity {
        Identity {
            user_id,
            email: format!("u{}@example.com", user_id),
            role,
            status: AccountStatus::Active,
        }
    }

    #[test]
    fn test_require_role() {
        let admin = identity(1, Role::Admin);
        let donor = identity(2, Role::Donor);

        assert!(require_role(&admin, &[Role::Admin]).is_ok());
        assert!(require_role(&donor, &[Role::Admin]).is_err());
        assert!(require_role(&donor, &[Role::Donor, Role::Volunteer]).is_ok());
    }

    #[test]
    fn test_owner_or_admin() {
        let owner = identity(10, Role::Donor);
        let admin = identity(1, Role::Admin);
        let stranger = identity(99, Role::Volunteer);

        assert!(require_owner_or_admin(&owner, 10).is_ok());
        assert!(require_owner_or_admin(&admin, 10).is_ok());
        let err = require_owner_or_admin(&stranger, 10).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn test_party_or_admin() {
        let owner = identity(10, Role::Donor);
        let donor = identity(20, Role::Donor);
        let admin = identity(1, Role::Admin);
        let stranger = identity(99, Role::Donor);

        assert!(require_party_or_admin(&owner, 10, Some(20)).is_ok());
        assert!(require_party_or_admin(&donor, 10, Some(20)).is_ok());
        assert!(require_party_or_admin(&admin, 10, Some(20)).is_ok());
        assert!(require_party_or_admin(&stranger, 10, Some(20)).is_err());

        // No donor assigned: only owner and admin qualify
        assert!(require_party_or_admin(&donor, 10, None).is_err());
        assert!(require_party_or_admin(&owner, 10, None).is_ok());
    }

    #[test]
    fn test_require_active() {
        assert!(require_active(false, "donate").is_ok());
        let err = require_active(true, "donate").unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        assert!(err.to_string().contains("donate"));
    }
}
