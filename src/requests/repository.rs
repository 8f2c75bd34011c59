//! Request persistence layer
//!
//! PostgreSQL-backed storage for donation requests. The accept transition
//! is an atomic CAS (conditional UPDATE on `status = 'pending'`), never a
//! read-then-write.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::models::{
    DonationRequest, PersonSnapshot, Recipient, RequestId, RequestStatus,
};
use crate::error::AppError;
use crate::types::{BloodGroup, PageParams};

const COLUMNS: &str = "request_id, recipient_name, recipient_district, recipient_upazila, \
                       hospital_name, full_address, blood_group, donation_date, donation_time, \
                       request_message, status, \
                       requester_user_id, requester_name, requester_email, requester_district, \
                       requester_upazila, requester_blood_group, \
                       donor_user_id, donor_name, donor_email, donor_district, donor_upazila, \
                       donor_blood_group, is_public, created_at, updated_at";

/// Request database operations
pub struct RequestRepository;

impl RequestRepository {
    /// Insert a freshly created aggregate and return it as stored.
    pub async fn insert(
        &self,
        pool: &PgPool,
        id: RequestId,
        recipient: &Recipient,
        hospital_name: &str,
        full_address: &str,
        blood_group: BloodGroup,
        donation_date: &str,
        donation_time: &str,
        request_message: Option<&str>,
        is_public: bool,
        requester: &PersonSnapshot,
    ) -> Result<DonationRequest, AppError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO donation_requests_tb
                (request_id, recipient_name, recipient_district, recipient_upazila,
                 hospital_name, full_address, blood_group, donation_date, donation_time,
                 request_message, status,
                 requester_user_id, requester_name, requester_email, requester_district,
                 requester_upazila, requester_blood_group, is_public)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending',
                 $11, $12, $13, $14, $15, $16, $17)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.to_string())
        .bind(&recipient.name)
        .bind(&recipient.district)
        .bind(&recipient.upazila)
        .bind(hospital_name)
        .bind(full_address)
        .bind(blood_group.as_str())
        .bind(donation_date)
        .bind(donation_time)
        .bind(request_message)
        .bind(requester.user_id)
        .bind(&requester.name)
        .bind(&requester.email)
        .bind(&requester.district)
        .bind(&requester.upazila)
        .bind(requester.blood_group.as_str())
        .bind(is_public)
        .fetch_one(pool)
        .await?;

        row_to_request(&row)
    }

    /// Get a request by id
    pub async fn get(
        &self,
        pool: &PgPool,
        id: RequestId,
    ) -> Result<Option<DonationRequest>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM donation_requests_tb WHERE request_id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

        row.map(|r| row_to_request(&r)).transpose()
    }

    /// Atomic CAS accept: pending -> inprogress with the donor snapshot, in
    /// one conditional UPDATE.
    ///
    /// Returns the updated aggregate when this caller won, `None` when the
    /// row was missing or no longer pending (the losers of a race land
    /// here). Never splits the status check from the write.
    pub async fn accept_if_pending(
        &self,
        pool: &PgPool,
        id: RequestId,
        donor: &PersonSnapshot,
    ) -> Result<Option<DonationRequest>, AppError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE donation_requests_tb
            SET status = 'inprogress',
                donor_user_id = $1, donor_name = $2, donor_email = $3,
                donor_district = $4, donor_upazila = $5, donor_blood_group = $6,
                updated_at = NOW()
            WHERE request_id = $7 AND status = 'pending'
            RETURNING {COLUMNS}
            "#
        ))
        .bind(donor.user_id)
        .bind(&donor.name)
        .bind(&donor.email)
        .bind(&donor.district)
        .bind(&donor.upazila)
        .bind(donor.blood_group.as_str())
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

        row.map(|r| row_to_request(&r)).transpose()
    }

    /// Set status unconditionally (policy already checked by the engine).
    /// The donor snapshot is never touched here.
    pub async fn set_status(
        &self,
        pool: &PgPool,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<Option<DonationRequest>, AppError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE donation_requests_tb
            SET status = $1, updated_at = NOW()
            WHERE request_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(status.as_str())
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

        row.map(|r| row_to_request(&r)).transpose()
    }

    /// Partial field update; unset fields keep their current value.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_fields(
        &self,
        pool: &PgPool,
        id: RequestId,
        recipient_name: Option<&str>,
        recipient_district: Option<&str>,
        recipient_upazila: Option<&str>,
        hospital_name: Option<&str>,
        full_address: Option<&str>,
        blood_group: Option<BloodGroup>,
        donation_date: Option<&str>,
        donation_time: Option<&str>,
        request_message: Option<&str>,
        is_public: Option<bool>,
    ) -> Result<Option<DonationRequest>, AppError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE donation_requests_tb
            SET recipient_name = COALESCE($1, recipient_name),
                recipient_district = COALESCE($2, recipient_district),
                recipient_upazila = COALESCE($3, recipient_upazila),
                hospital_name = COALESCE($4, hospital_name),
                full_address = COALESCE($5, full_address),
                blood_group = COALESCE($6, blood_group),
                donation_date = COALESCE($7, donation_date),
                donation_time = COALESCE($8, donation_time),
                request_message = COALESCE($9, request_message),
                is_public = COALESCE($10, is_public),
                updated_at = NOW()
            WHERE request_id = $11
            RETURNING {COLUMNS}
            "#
        ))
        .bind(recipient_name)
        .bind(recipient_district)
        .bind(recipient_upazila)
        .bind(hospital_name)
        .bind(full_address)
        .bind(blood_group.map(|g| g.as_str()))
        .bind(donation_date)
        .bind(donation_time)
        .bind(request_message)
        .bind(is_public)
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

        row.map(|r| row_to_request(&r)).transpose()
    }

    /// Delete the aggregate permanently. Returns false when it was missing.
    pub async fn delete(&self, pool: &PgPool, id: RequestId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM donation_requests_tb WHERE request_id = $1")
            .bind(id.to_string())
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Requests created by the given user, newest first.
    pub async fn list_by_requester(
        &self,
        pool: &PgPool,
        requester_id: i64,
        status: Option<RequestStatus>,
        params: PageParams,
    ) -> Result<(Vec<DonationRequest>, i64), AppError> {
        let filter = "requester_user_id = $1 AND ($2::text IS NULL OR status = $2)";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM donation_requests_tb WHERE {filter}"
        ))
        .bind(requester_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_one(pool)
        .await?;

        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM donation_requests_tb WHERE {filter} \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(requester_id)
        .bind(status.map(|s| s.as_str()))
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

        Ok((rows_to_requests(rows)?, total))
    }

    /// Requests the given user accepted as donor, newest first.
    pub async fn list_by_donor(
        &self,
        pool: &PgPool,
        donor_id: i64,
        status: Option<RequestStatus>,
        params: PageParams,
    ) -> Result<(Vec<DonationRequest>, i64), AppError> {
        let filter = "donor_user_id = $1 AND ($2::text IS NULL OR status = $2)";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM donation_requests_tb WHERE {filter}"
        ))
        .bind(donor_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_one(pool)
        .await?;

        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM donation_requests_tb WHERE {filter} \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(donor_id)
        .bind(status.map(|s| s.as_str()))
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

        Ok((rows_to_requests(rows)?, total))
    }

    /// Every request, newest first (admin view).
    pub async fn list_all(
        &self,
        pool: &PgPool,
        status: Option<RequestStatus>,
        params: PageParams,
    ) -> Result<(Vec<DonationRequest>, i64), AppError> {
        let filter = "($1::text IS NULL OR status = $1)";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM donation_requests_tb WHERE {filter}"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_one(pool)
        .await?;

        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM donation_requests_tb WHERE {filter} \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

        Ok((rows_to_requests(rows)?, total))
    }

    /// Pending and public requests, newest first (unauthenticated view).
    pub async fn list_public_pending(
        &self,
        pool: &PgPool,
        params: PageParams,
    ) -> Result<(Vec<DonationRequest>, i64), AppError> {
        let filter = "status = 'pending' AND is_public = TRUE";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM donation_requests_tb WHERE {filter}"
        ))
        .fetch_one(pool)
        .await?;

        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM donation_requests_tb WHERE {filter} \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

        Ok((rows_to_requests(rows)?, total))
    }
}

fn rows_to_requests(rows: Vec<PgRow>) -> Result<Vec<DonationRequest>, AppError> {
    rows.iter().map(row_to_request).collect()
}

/// Convert a database row to a DonationRequest
fn row_to_request(row: &PgRow) -> Result<DonationRequest, AppError> {
    let id: String = row.get("request_id");
    let id = id
        .parse::<RequestId>()
        .map_err(|_| AppError::Internal(format!("Invalid request_id format: {}", id)))?;

    let status: String = row.get("status");
    let status = status
        .parse::<RequestStatus>()
        .map_err(|_| AppError::Internal(format!("Invalid status in store: {}", status)))?;

    let blood_group: String = row.get("blood_group");
    let blood_group = blood_group
        .parse::<BloodGroup>()
        .map_err(|_| AppError::Internal(format!("Invalid blood_group in store: {}", blood_group)))?;

    let requester = PersonSnapshot {
        user_id: row.get("requester_user_id"),
        name: row.get("requester_name"),
        email: row.get("requester_email"),
        district: row.get("requester_district"),
        upazila: row.get("requester_upazila"),
        blood_group: parse_group(row, "requester_blood_group")?,
    };

    // Donor columns are nullable as a group; donor_user_id decides presence.
    let donor = match row.get::<Option<i64>, _>("donor_user_id") {
        Some(user_id) => Some(PersonSnapshot {
            user_id,
            name: row.get("donor_name"),
            email: row.get("donor_email"),
            district: row.get("donor_district"),
            upazila: row.get("donor_upazila"),
            blood_group: parse_group(row, "donor_blood_group")?,
        }),
        None => None,
    };

    Ok(DonationRequest {
        id,
        recipient: Recipient {
            name: row.get("recipient_name"),
            district: row.get("recipient_district"),
            upazila: row.get("recipient_upazila"),
        },
        hospital_name: row.get("hospital_name"),
        full_address: row.get("full_address"),
        blood_group,
        donation_date: row.get("donation_date"),
        donation_time: row.get("donation_time"),
        request_message: row.get("request_message"),
        status,
        requester,
        donor,
        is_public: row.get("is_public"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn parse_group(row: &PgRow, column: &str) -> Result<BloodGroup, AppError> {
    let raw: String = row.get(column);
    raw.parse::<BloodGroup>()
        .map_err(|_| AppError::Internal(format!("Invalid {} in store: {}", column, raw)))
}
