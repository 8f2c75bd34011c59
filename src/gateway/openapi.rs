//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:5000/docs`
//! - OpenAPI JSON: `http://localhost:5000/api-docs/openapi.json`

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::service::{AuthResponse, LoginRequest, RegisterRequest};
use crate::funding::handlers::FundingTotal;
use crate::funding::models::{FundingRecord, RecordPaymentInput};
use crate::gateway::handlers::HealthResponse;
use crate::requests::models::{
    CreateRequestInput, DonationRequest, PublicRequestView, StatusChangeInput, UpdateRequestInput,
};
use crate::users::models::{DonorView, ProfilePatch, UserView};

/// JWT bearer security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bloodlink API",
        version = "1.0.0",
        description = "Blood donation coordination: request lifecycle, donor matching, funding ledger.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        // Auth
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        // Users
        crate::users::handlers::get_me,
        crate::users::handlers::update_me,
        crate::users::handlers::list_users,
        crate::users::handlers::block_user,
        crate::users::handlers::unblock_user,
        crate::users::handlers::make_admin,
        crate::users::handlers::make_volunteer,
        crate::users::handlers::search_donors,
        // Requests
        crate::requests::handlers::create_request,
        crate::requests::handlers::my_requests,
        crate::requests::handlers::assigned_requests,
        crate::requests::handlers::all_requests,
        crate::requests::handlers::public_pending,
        crate::requests::handlers::get_request,
        crate::requests::handlers::get_public_request,
        crate::requests::handlers::update_request,
        crate::requests::handlers::donate,
        crate::requests::handlers::change_status,
        crate::requests::handlers::delete_request,
        // Funding
        crate::funding::handlers::record_payment,
        crate::funding::handlers::list_funding,
        crate::funding::handlers::my_funding,
        crate::funding::handlers::funding_total,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserView,
            DonorView,
            ProfilePatch,
            DonationRequest,
            PublicRequestView,
            CreateRequestInput,
            UpdateRequestInput,
            StatusChangeInput,
            FundingRecord,
            RecordPaymentInput,
            FundingTotal,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Profiles, administration and the donor directory"),
        (name = "Requests", description = "Donation request lifecycle"),
        (name = "Funding", description = "Funding ledger")
    )
)]
pub struct ApiDoc;
