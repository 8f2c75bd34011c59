//! Request Lifecycle Engine
//!
//! Owns every mutation of the donation-request aggregate. Each operation
//! runs validation, then the authorization policy, then a single store
//! write; the engine itself is stateless per call.

use sqlx::PgPool;

use super::models::{
    CreateRequestInput, DonationRequest, PersonSnapshot, PublicRequestView, Recipient, RequestId,
    RequestStatus, UpdateRequestInput,
};
use super::repository::RequestRepository;
use crate::auth::policy;
use crate::auth::service::Identity;
use crate::error::AppError;
use crate::types::{BloodGroup, PageParams, Paginated};
use crate::users::models::User;
use crate::users::repository::UserRepository;

pub struct RequestEngine {
    db: PgPool,
    repo: RequestRepository,
}

impl RequestEngine {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            repo: RequestRepository,
        }
    }

    /// Create a new donation request in `pending`, requester snapshotted
    /// from the caller's current account.
    pub async fn create(
        &self,
        actor: &Identity,
        input: CreateRequestInput,
    ) -> Result<DonationRequest, AppError> {
        let fields = ValidatedCreate::try_from(input)?;

        // Fresh account read: the snapshot and the blocked check must see
        // the account as it is now, not as the token remembers it.
        let user = self.load_actor(actor).await?;
        policy::require_active(user.is_blocked(), "create requests")?;

        let requester = PersonSnapshot::capture(&user);
        let record = self
            .repo
            .insert(
                &self.db,
                RequestId::new(),
                &fields.recipient,
                &fields.hospital_name,
                &fields.full_address,
                fields.blood_group,
                &fields.donation_date,
                &fields.donation_time,
                fields.request_message.as_deref(),
                fields.is_public,
                &requester,
            )
            .await?;

        tracing::info!(
            request_id = %record.id,
            requester = record.requester.user_id,
            blood_group = %record.blood_group,
            "Donation request created"
        );
        Ok(record)
    }

    /// Accept a pending request as donor: pending -> inprogress.
    ///
    /// The status precondition and the write are one atomic compare-and-set
    /// in the store; with N concurrent acceptors exactly one wins and the
    /// rest observe Conflict.
    pub async fn accept_donation(
        &self,
        actor: &Identity,
        id: RequestId,
    ) -> Result<DonationRequest, AppError> {
        // Read-only precondition pass for error precedence; the CAS below
        // remains the only authority on who wins.
        let current = self.get(id).await?;
        if current.status != RequestStatus::Pending {
            return Err(AppError::conflict("Request is not pending"));
        }

        let user = self.load_actor(actor).await?;
        policy::require_active(user.is_blocked(), "donate")?;

        let donor = PersonSnapshot::capture(&user);
        match self.repo.accept_if_pending(&self.db, id, &donor).await? {
            Some(record) => {
                tracing::info!(
                    request_id = %record.id,
                    donor = donor.user_id,
                    "Donation request accepted"
                );
                Ok(record)
            }
            // CAS missed: either the row is gone or somebody got there
            // first. One follow-up read disambiguates the error kind.
            None => match self.repo.get(&self.db, id).await? {
                Some(_) => Err(AppError::conflict("Request is not pending")),
                None => Err(AppError::not_found("Request not found")),
            },
        }
    }

    /// Change status (admin, owner, or the assigned donor). Any enumerated
    /// status may be set; there is deliberately no transition graph beyond
    /// the accept path, matching the dashboards built on this behavior.
    pub async fn change_status(
        &self,
        actor: &Identity,
        id: RequestId,
        new_status: &str,
    ) -> Result<DonationRequest, AppError> {
        let new_status = new_status
            .parse::<RequestStatus>()
            .map_err(|_| AppError::validation("Invalid status"))?;

        let record = self.get(id).await?;
        policy::require_party_or_admin(actor, record.requester.user_id, record.donor_user_id())?;

        let updated = self
            .repo
            .set_status(&self.db, id, new_status)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;

        tracing::info!(
            request_id = %id,
            from = %record.status,
            to = %new_status,
            actor = actor.user_id,
            "Request status changed"
        );
        Ok(updated)
    }

    /// Partial update of mutable fields (owner or admin).
    pub async fn update(
        &self,
        actor: &Identity,
        id: RequestId,
        input: UpdateRequestInput,
    ) -> Result<DonationRequest, AppError> {
        let blood_group = input
            .blood_group
            .as_deref()
            .map(|s| {
                s.parse::<BloodGroup>()
                    .map_err(|_| AppError::validation("Invalid blood group"))
            })
            .transpose()?;

        let record = self.get(id).await?;
        policy::require_owner_or_admin(actor, record.requester.user_id)?;

        self.repo
            .update_fields(
                &self.db,
                id,
                input.recipient_name.as_deref(),
                input.recipient_district.as_deref(),
                input.recipient_upazila.as_deref(),
                input.hospital_name.as_deref(),
                input.full_address.as_deref(),
                blood_group,
                input.donation_date.as_deref(),
                input.donation_time.as_deref(),
                input.request_message.as_deref(),
                input.is_public,
            )
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))
    }

    /// Delete the request permanently (owner or admin).
    pub async fn delete(&self, actor: &Identity, id: RequestId) -> Result<(), AppError> {
        let record = self.get(id).await?;
        policy::require_owner_or_admin(actor, record.requester.user_id)?;

        if !self.repo.delete(&self.db, id).await? {
            return Err(AppError::not_found("Request not found"));
        }
        tracing::info!(request_id = %id, actor = actor.user_id, "Request deleted");
        Ok(())
    }

    /// Authenticated detail view.
    pub async fn get(&self, id: RequestId) -> Result<DonationRequest, AppError> {
        self.repo
            .get(&self.db, id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))
    }

    /// Unauthenticated detail view: public requests only, contact
    /// identifiers stripped.
    pub async fn get_public(&self, id: RequestId) -> Result<PublicRequestView, AppError> {
        let record = self.get(id).await?;
        if !record.is_public {
            return Err(AppError::forbidden("This request is not public"));
        }
        Ok(record.into())
    }

    /// Requests created by the caller.
    pub async fn list_mine(
        &self,
        actor: &Identity,
        status: Option<&str>,
        params: PageParams,
    ) -> Result<Paginated<DonationRequest>, AppError> {
        let status = parse_status_filter(status)?;
        let (items, total) = self
            .repo
            .list_by_requester(&self.db, actor.user_id, status, params)
            .await?;
        Ok(Paginated::new(items, params, total))
    }

    /// Requests the caller accepted as donor.
    pub async fn list_assigned_to_me(
        &self,
        actor: &Identity,
        status: Option<&str>,
        params: PageParams,
    ) -> Result<Paginated<DonationRequest>, AppError> {
        let status = parse_status_filter(status)?;
        let (items, total) = self
            .repo
            .list_by_donor(&self.db, actor.user_id, status, params)
            .await?;
        Ok(Paginated::new(items, params, total))
    }

    /// Every request (admin only).
    pub async fn list_all_for_admin(
        &self,
        actor: &Identity,
        status: Option<&str>,
        params: PageParams,
    ) -> Result<Paginated<DonationRequest>, AppError> {
        policy::require_admin(actor)?;
        let status = parse_status_filter(status)?;
        let (items, total) = self.repo.list_all(&self.db, status, params).await?;
        Ok(Paginated::new(items, params, total))
    }

    /// Pending public requests, no authentication required.
    pub async fn list_public_pending(
        &self,
        params: PageParams,
    ) -> Result<Paginated<PublicRequestView>, AppError> {
        let (items, total) = self.repo.list_public_pending(&self.db, params).await?;
        Ok(Paginated::new(items, params, total).map(PublicRequestView::from))
    }

    async fn load_actor(&self, actor: &Identity) -> Result<User, AppError> {
        UserRepository::get_by_id(&self.db, actor.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found"))
    }
}

fn parse_status_filter(status: Option<&str>) -> Result<Option<RequestStatus>, AppError> {
    status
        .map(|s| {
            s.parse::<RequestStatus>()
                .map_err(|_| AppError::validation("Invalid status filter"))
        })
        .transpose()
}

/// Creation payload after presence and enumeration checks.
#[derive(Debug)]
struct ValidatedCreate {
    recipient: Recipient,
    hospital_name: String,
    full_address: String,
    blood_group: BloodGroup,
    donation_date: String,
    donation_time: String,
    request_message: Option<String>,
    is_public: bool,
}

impl TryFrom<CreateRequestInput> for ValidatedCreate {
    type Error = AppError;

    fn try_from(input: CreateRequestInput) -> Result<Self, Self::Error> {
        let required = |field: Option<String>, name: &str| -> Result<String, AppError> {
            match field {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(AppError::validation(format!("Missing required field: {}", name))),
            }
        };

        let blood_group = required(input.blood_group, "blood_group")?
            .parse::<BloodGroup>()
            .map_err(|_| AppError::validation("Invalid blood group"))?;

        Ok(Self {
            recipient: Recipient {
                name: required(input.recipient_name, "recipient_name")?,
                district: required(input.recipient_district, "recipient_district")?,
                upazila: required(input.recipient_upazila, "recipient_upazila")?,
            },
            hospital_name: required(input.hospital_name, "hospital_name")?,
            full_address: required(input.full_address, "full_address")?,
            blood_group,
            donation_date: required(input.donation_date, "donation_date")?,
            donation_time: required(input.donation_time, "donation_time")?,
            request_message: input.request_message,
            is_public: input.is_public.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_input() -> CreateRequestInput {
        CreateRequestInput {
            recipient_name: Some("Patient".into()),
            recipient_district: Some("Dhaka".into()),
            recipient_upazila: Some("Savar".into()),
            hospital_name: Some("City Hospital".into()),
            full_address: Some("12 Road, Savar".into()),
            blood_group: Some("O-".into()),
            donation_date: Some("2026-02-01".into()),
            donation_time: Some("09:30".into()),
            request_message: None,
            is_public: None,
        }
    }

    #[test]
    fn test_validated_create_accepts_full_input() {
        let v = ValidatedCreate::try_from(full_input()).unwrap();
        assert_eq!(v.blood_group, BloodGroup::ONeg);
        assert!(v.is_public);
        assert!(v.request_message.is_none());
    }

    #[test]
    fn test_validated_create_requires_every_field() {
        let cases: Vec<fn(&mut CreateRequestInput)> = vec![
            |i| i.recipient_name = None,
            |i| i.recipient_district = None,
            |i| i.recipient_upazila = None,
            |i| i.hospital_name = None,
            |i| i.full_address = None,
            |i| i.blood_group = None,
            |i| i.donation_date = None,
            |i| i.donation_time = None,
        ];

        for strip in cases {
            let mut input = full_input();
            strip(&mut input);
            let err = ValidatedCreate::try_from(input).unwrap_err();
            assert_eq!(err.code(), "VALIDATION");
        }
    }

    #[test]
    fn test_validated_create_rejects_blank_and_bad_group() {
        let mut input = full_input();
        input.hospital_name = Some("   ".into());
        assert_eq!(
            ValidatedCreate::try_from(input).unwrap_err().code(),
            "VALIDATION"
        );

        let mut input = full_input();
        input.blood_group = Some("X+".into());
        let err = ValidatedCreate::try_from(input).unwrap_err();
        assert_eq!(err.to_string(), "Invalid blood group");
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("done")).unwrap(),
            Some(RequestStatus::Done)
        );
        assert!(parse_status_filter(Some("finished")).is_err());
    }
}
