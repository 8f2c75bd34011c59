//! User HTTP handlers: own profile, admin administration, donor directory

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::models::{AccountStatus, DonorView, ProfilePatch, Role, UserView};
use super::repository::UserRepository;
use crate::auth::policy;
use crate::auth::service::Identity;
use crate::error::AppError;
use crate::gateway::response::{ApiResponse, ApiResult, failure, ok};
use crate::gateway::state::AppState;
use crate::types::{BloodGroup, PageParams, Paginated};

/// Admin listing filters
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Donor directory filters
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DonorSearchQuery {
    pub blood_group: Option<String>,
    pub district: Option<String>,
    pub upazila: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Own profile
///
/// GET /api/v1/users/me
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Own profile", body = ApiResponse<UserView>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Users"
)]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<UserView> {
    let result: Result<UserView, AppError> = async {
        let user = UserRepository::get_by_id(state.db.pool(), identity.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        Ok(user.into())
    }
    .await;

    result.map(ok).map_err(failure)
}

/// Update own profile (partial)
///
/// PATCH /api/v1/users/me
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = ProfilePatch,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<UserView>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Users"
)]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<UserView> {
    let result: Result<UserView, AppError> = async {
        let user = UserRepository::update_profile(state.db.pool(), identity.user_id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        Ok(user.into())
    }
    .await;

    result.map(ok).map_err(failure)
}

/// List users with optional role/status filters (admin)
///
/// GET /api/v1/users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated users", body = ApiResponse<Paginated<UserView>>),
        (status = 403, description = "Admin only")
    ),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Paginated<UserView>> {
    let result: Result<Paginated<UserView>, AppError> = async {
        policy::require_admin(&identity)?;

        let role = query
            .role
            .as_deref()
            .map(|r| {
                r.parse::<Role>()
                    .map_err(|_| AppError::validation("Invalid role filter"))
            })
            .transpose()?;
        let status = query
            .status
            .as_deref()
            .map(|s| {
                s.parse::<AccountStatus>()
                    .map_err(|_| AppError::validation("Invalid status filter"))
            })
            .transpose()?;

        let params = PageParams::new(query.page, query.limit);
        let (users, total) = UserRepository::list(state.db.pool(), role, status, params).await?;
        Ok(Paginated::new(users, params, total).map(UserView::from))
    }
    .await;

    result.map(ok).map_err(failure)
}

/// Block a user (admin)
///
/// PATCH /api/v1/users/{id}/block
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/block",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User blocked", body = ApiResponse<UserView>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn block_user(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
) -> ApiResult<UserView> {
    set_status(state, identity, user_id, AccountStatus::Blocked).await
}

/// Unblock a user (admin)
///
/// PATCH /api/v1/users/{id}/unblock
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/unblock",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User unblocked", body = ApiResponse<UserView>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn unblock_user(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
) -> ApiResult<UserView> {
    set_status(state, identity, user_id, AccountStatus::Active).await
}

async fn set_status(
    state: Arc<AppState>,
    identity: Identity,
    user_id: i64,
    status: AccountStatus,
) -> ApiResult<UserView> {
    let result: Result<UserView, AppError> = async {
        policy::require_admin(&identity)?;
        let user = UserRepository::set_status(state.db.pool(), user_id, status)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        tracing::info!(user_id, status = %status, admin = identity.user_id, "Account status changed");
        Ok(user.into())
    }
    .await;

    result.map(ok).map_err(failure)
}

/// Promote a user to admin
///
/// PATCH /api/v1/users/{id}/make-admin
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/make-admin",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<UserView>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn make_admin(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
) -> ApiResult<UserView> {
    set_role(state, identity, user_id, Role::Admin).await
}

/// Promote a user to volunteer
///
/// PATCH /api/v1/users/{id}/make-volunteer
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/make-volunteer",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<UserView>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn make_volunteer(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<i64>,
) -> ApiResult<UserView> {
    set_role(state, identity, user_id, Role::Volunteer).await
}

async fn set_role(
    state: Arc<AppState>,
    identity: Identity,
    user_id: i64,
    role: Role,
) -> ApiResult<UserView> {
    let result: Result<UserView, AppError> = async {
        policy::require_admin(&identity)?;
        let user = UserRepository::set_role(state.db.pool(), user_id, role)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        tracing::info!(user_id, role = %role, admin = identity.user_id, "Role changed");
        Ok(user.into())
    }
    .await;

    result.map(ok).map_err(failure)
}

/// Public donor directory search
///
/// GET /api/v1/users/search-donors
#[utoipa::path(
    get,
    path = "/api/v1/users/search-donors",
    params(
        ("blood_group" = Option<String>, Query, description = "Blood group, e.g. O+"),
        ("district" = Option<String>, Query, description = "District"),
        ("upazila" = Option<String>, Query, description = "Upazila"),
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated donors", body = ApiResponse<Paginated<DonorView>>),
        (status = 400, description = "Invalid blood group filter")
    ),
    tag = "Users"
)]
pub async fn search_donors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DonorSearchQuery>,
) -> ApiResult<Paginated<DonorView>> {
    let result: Result<Paginated<DonorView>, AppError> = async {
        let blood_group = query
            .blood_group
            .as_deref()
            .map(|g| {
                g.parse::<BloodGroup>()
                    .map_err(|_| AppError::validation("Invalid blood group filter"))
            })
            .transpose()?;

        let params = PageParams::new(query.page, query.limit);
        let (donors, total) = UserRepository::search_donors(
            state.db.pool(),
            blood_group,
            query.district.as_deref(),
            query.upazila.as_deref(),
            params,
        )
        .await?;
        Ok(Paginated::new(donors, params, total).map(DonorView::from))
    }
    .await;

    result.map(ok).map_err(failure)
}
