//! Funding ledger HTTP handlers

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::models::{FundingRecord, RecordPaymentInput};
use crate::auth::service::Identity;
use crate::gateway::response::{ApiResponse, ApiResult, created, failure, ok};
use crate::gateway::state::AppState;
use crate::types::{PageParams, PageQuery, Paginated};

/// Ledger grand total
#[derive(Debug, Serialize, ToSchema)]
pub struct FundingTotal {
    #[schema(value_type = String, example = "1500.00")]
    pub total: Decimal,
}

/// Record a confirmed payment (idempotent on the external reference)
///
/// POST /api/v1/funding/payments
#[utoipa::path(
    post,
    path = "/api/v1/funding/payments",
    request_body = RecordPaymentInput,
    responses(
        (status = 201, description = "Payment recorded (or already present)", body = ApiResponse<FundingRecord>),
        (status = 400, description = "Missing reference, currency, or non-positive amount")
    ),
    tag = "Funding"
)]
pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<RecordPaymentInput>,
) -> ApiResult<FundingRecord> {
    match state.funding.record_payment(&identity, input).await {
        Ok(record) => Ok(created(record)),
        Err(e) => Err(failure(e)),
    }
}

/// All funding records
///
/// GET /api/v1/funding
#[utoipa::path(
    get,
    path = "/api/v1/funding",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated funding records", body = ApiResponse<Paginated<FundingRecord>>)
    ),
    tag = "Funding"
)]
pub async fn list_funding(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Paginated<FundingRecord>> {
    let params = PageParams::new(query.page, query.limit);
    state.funding.list_all(params).await.map(ok).map_err(failure)
}

/// Caller's own funding records
///
/// GET /api/v1/funding/my
#[utoipa::path(
    get,
    path = "/api/v1/funding/my",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated funding records", body = ApiResponse<Paginated<FundingRecord>>)
    ),
    tag = "Funding"
)]
pub async fn my_funding(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Paginated<FundingRecord>> {
    let params = PageParams::new(query.page, query.limit);
    state
        .funding
        .list_mine(&identity, params)
        .await
        .map(ok)
        .map_err(failure)
}

/// Sum of all recorded amounts
///
/// GET /api/v1/funding/total
#[utoipa::path(
    get,
    path = "/api/v1/funding/total",
    responses(
        (status = 200, description = "Ledger total", body = ApiResponse<FundingTotal>)
    ),
    tag = "Funding"
)]
pub async fn funding_total(State(state): State<Arc<AppState>>) -> ApiResult<FundingTotal> {
    state
        .funding
        .total()
        .await
        .map(|total| ok(FundingTotal { total }))
        .map_err(failure)
}
