//! Donation request HTTP handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::models::{
    CreateRequestInput, DonationRequest, PublicRequestView, RequestId, RequestListQuery,
    StatusChangeInput, UpdateRequestInput,
};
use crate::auth::service::Identity;
use crate::error::AppError;
use crate::gateway::response::{ApiResponse, ApiResult, created, failure, ok};
use crate::gateway::state::AppState;
use crate::types::{PageParams, Paginated};

fn parse_id(raw: &str) -> Result<RequestId, AppError> {
    raw.parse::<RequestId>()
        .map_err(|_| AppError::validation("Invalid request id"))
}

/// Create a donation request
///
/// POST /api/v1/requests
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = CreateRequestInput,
    responses(
        (status = 201, description = "Request created", body = ApiResponse<DonationRequest>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Blocked users cannot create requests")
    ),
    tag = "Requests"
)]
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<CreateRequestInput>,
) -> ApiResult<DonationRequest> {
    match state.requests.create(&identity, input).await {
        Ok(record) => Ok(created(record)),
        Err(e) => Err(failure(e)),
    }
}

/// Caller's own requests (as requester)
///
/// GET /api/v1/requests/my
#[utoipa::path(
    get,
    path = "/api/v1/requests/my",
    params(
        ("status" = Option<String>, Query, description = "Optional status filter"),
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated requests", body = ApiResponse<Paginated<DonationRequest>>)
    ),
    tag = "Requests"
)]
pub async fn my_requests(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<Paginated<DonationRequest>> {
    let params = PageParams::new(query.page, query.limit);
    state
        .requests
        .list_mine(&identity, query.status.as_deref(), params)
        .await
        .map(ok)
        .map_err(failure)
}

/// Requests the caller accepted as donor
///
/// GET /api/v1/requests/assigned/my
#[utoipa::path(
    get,
    path = "/api/v1/requests/assigned/my",
    params(
        ("status" = Option<String>, Query, description = "Optional status filter"),
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated requests", body = ApiResponse<Paginated<DonationRequest>>)
    ),
    tag = "Requests"
)]
pub async fn assigned_requests(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<Paginated<DonationRequest>> {
    let params = PageParams::new(query.page, query.limit);
    state
        .requests
        .list_assigned_to_me(&identity, query.status.as_deref(), params)
        .await
        .map(ok)
        .map_err(failure)
}

/// Every request (admin)
///
/// GET /api/v1/requests/all
#[utoipa::path(
    get,
    path = "/api/v1/requests/all",
    params(
        ("status" = Option<String>, Query, description = "Optional status filter"),
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated requests", body = ApiResponse<Paginated<DonationRequest>>),
        (status = 403, description = "Admin only")
    ),
    tag = "Requests"
)]
pub async fn all_requests(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<Paginated<DonationRequest>> {
    let params = PageParams::new(query.page, query.limit);
    state
        .requests
        .list_all_for_admin(&identity, query.status.as_deref(), params)
        .await
        .map(ok)
        .map_err(failure)
}

/// Pending public requests (no authentication)
///
/// GET /api/v1/requests/pending-public
#[utoipa::path(
    get,
    path = "/api/v1/requests/pending-public",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated public requests", body = ApiResponse<Paginated<PublicRequestView>>)
    ),
    tag = "Requests"
)]
pub async fn public_pending(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<Paginated<PublicRequestView>> {
    let params = PageParams::new(query.page, query.limit);
    state
        .requests
        .list_public_pending(params)
        .await
        .map(ok)
        .map_err(failure)
}

/// Request details (authenticated)
///
/// GET /api/v1/requests/{id}
#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request details", body = ApiResponse<DonationRequest>),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests"
)]
pub async fn get_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DonationRequest> {
    let result: Result<DonationRequest, AppError> = async {
        let id = parse_id(&id)?;
        state.requests.get(id).await
    }
    .await;

    result.map(ok).map_err(failure)
}

/// Public request details with privacy projection (no authentication)
///
/// GET /api/v1/public/requests/{id}
#[utoipa::path(
    get,
    path = "/api/v1/public/requests/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Public request details", body = ApiResponse<PublicRequestView>),
        (status = 403, description = "Request is not public"),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests"
)]
pub async fn get_public_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<PublicRequestView> {
    let result: Result<PublicRequestView, AppError> = async {
        let id = parse_id(&id)?;
        state.requests.get_public(id).await
    }
    .await;

    result.map(ok).map_err(failure)
}

/// Update a request (owner or admin)
///
/// PUT /api/v1/requests/{id}
#[utoipa::path(
    put,
    path = "/api/v1/requests/{id}",
    params(("id" = String, Path, description = "Request id")),
    request_body = UpdateRequestInput,
    responses(
        (status = 200, description = "Updated request", body = ApiResponse<DonationRequest>),
        (status = 403, description = "Not allowed to edit this request"),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests"
)]
pub async fn update_request(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRequestInput>,
) -> ApiResult<DonationRequest> {
    let result: Result<DonationRequest, AppError> = async {
        let id = parse_id(&id)?;
        state.requests.update(&identity, id, input).await
    }
    .await;

    result.map(ok).map_err(failure)
}

/// Accept a pending request as donor
///
/// PATCH /api/v1/requests/{id}/donate
#[utoipa::path(
    patch,
    path = "/api/v1/requests/{id}/donate",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request accepted", body = ApiResponse<DonationRequest>),
        (status = 403, description = "Blocked users cannot donate"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    ),
    tag = "Requests"
)]
pub async fn donate(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<DonationRequest> {
    let result: Result<DonationRequest, AppError> = async {
        let id = parse_id(&id)?;
        state.requests.accept_donation(&identity, id).await
    }
    .await;

    result.map(ok).map_err(failure)
}

/// Change request status (admin, owner, or assigned donor)
///
/// PATCH /api/v1/requests/{id}/status
#[utoipa::path(
    patch,
    path = "/api/v1/requests/{id}/status",
    params(("id" = String, Path, description = "Request id")),
    request_body = StatusChangeInput,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<DonationRequest>),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Not a party to this request"),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests"
)]
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(input): Json<StatusChangeInput>,
) -> ApiResult<DonationRequest> {
    let result: Result<DonationRequest, AppError> = async {
        let id = parse_id(&id)?;
        state
            .requests
            .change_status(&identity, id, input.status.as_deref().unwrap_or_default())
            .await
    }
    .await;

    result.map(ok).map_err(failure)
}

/// Delete a request (owner or admin)
///
/// DELETE /api/v1/requests/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/requests/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request deleted"),
        (status = 403, description = "Not allowed to delete this request"),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests"
)]
pub async fn delete_request(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let result: Result<(), AppError> = async {
        let id = parse_id(&id)?;
        state.requests.delete(&identity, id).await
    }
    .await;

    result.map(ok).map_err(failure)
}
