//! Independent QA pass over the public crate API
//!
//! Exercises the pure rules a reviewer would poke at first (authorization
//! policy, pagination arithmetic, enumeration strictness, privacy
//! projection, error mapping) without touching a store.

use bloodlink::auth::policy;
use bloodlink::auth::service::Identity;
use bloodlink::error::AppError;
use bloodlink::types::{BloodGroup, PageParams, Paginated};
use bloodlink::users::models::{AccountStatus, Role};

fn identity(user_id: i64, role: Role) -> Identity {
    Identity {
        user_id,
        email: format!("u{}@example.com", user_id),
        role,
        status: AccountStatus::Active,
    }
}

#[test]
fn policy_matrix_matches_spec() {
    let admin = identity(1, Role::Admin);
    let owner = identity(10, Role::Donor);
    let donor = identity(20, Role::Volunteer);
    let stranger = identity(99, Role::Donor);

    // ChangeStatus: admin OR owner OR assigned donor
    for actor in [&admin, &owner, &donor] {
        assert!(policy::require_party_or_admin(actor, 10, Some(20)).is_ok());
    }
    assert!(policy::require_party_or_admin(&stranger, 10, Some(20)).is_err());

    // Update/Delete: owner or admin only; the assigned donor is not enough
    assert!(policy::require_owner_or_admin(&donor, 10).is_err());
    assert!(policy::require_owner_or_admin(&owner, 10).is_ok());
    assert!(policy::require_owner_or_admin(&admin, 10).is_ok());

    // Admin views
    assert!(policy::require_admin(&admin).is_ok());
    assert!(policy::require_admin(&owner).is_err());
}

#[test]
fn blood_group_enumeration_is_closed() {
    assert_eq!(BloodGroup::ALL.len(), 8);
    for raw in ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"] {
        assert!(raw.parse::<BloodGroup>().is_ok(), "{raw} must parse");
    }
    for raw in ["C+", "O", "o+", "AB", " A+", ""] {
        assert!(raw.parse::<BloodGroup>().is_err(), "{raw:?} must not parse");
    }
}

#[test]
fn pagination_never_underflows() {
    let params = PageParams::new(Some(-3), Some(0));
    assert_eq!(params.page, 1);
    assert_eq!(params.limit, 1);
    assert_eq!(params.offset(), 0);

    let empty = Paginated::<u8>::new(vec![], PageParams::new(None, None), 0);
    assert_eq!(empty.total_pages, 1);

    let exact = Paginated::<u8>::new(vec![], PageParams::new(None, Some(5)), 15);
    assert_eq!(exact.total_pages, 3);
}

#[test]
fn error_taxonomy_maps_to_status_families() {
    let table: [(AppError, u16); 6] = [
        (AppError::validation("x"), 400),
        (AppError::unauthorized("x"), 401),
        (AppError::forbidden("x"), 403),
        (AppError::not_found("x"), 404),
        (AppError::conflict("x"), 409),
        (AppError::Unavailable("x".into()), 503),
    ];
    for (err, status) in table {
        assert_eq!(err.http_status(), status);
    }
}

#[test]
fn store_timeouts_surface_as_retryable() {
    let err: AppError = sqlx::Error::PoolTimedOut.into();
    assert_eq!(err.code(), "UNAVAILABLE");
    assert_eq!(err.http_status(), 503);
}
