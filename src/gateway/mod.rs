//! HTTP Gateway
//!
//! Router assembly and server startup. Route groups mirror the API areas;
//! protected groups get the JWT middleware layered on top.

pub mod handlers;
pub mod openapi;
pub mod response;
pub mod state;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth;
use crate::funding;
use crate::requests;
use crate::users;
use state::AppState;

/// Build the complete application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let jwt = |s: &Arc<AppState>| from_fn_with_state(s.clone(), auth::middleware::jwt_auth_middleware);

    // ==========================================================================
    // Auth routes (public)
    // ==========================================================================
    let auth_routes = Router::new()
        .route("/register", post(auth::handlers::register))
        .route("/login", post(auth::handlers::login));

    // ==========================================================================
    // User routes: public donor directory + JWT-protected profile/admin
    // ==========================================================================
    let user_routes = Router::new()
        .route("/search-donors", get(users::handlers::search_donors))
        .merge(
            Router::new()
                .route(
                    "/me",
                    get(users::handlers::get_me).patch(users::handlers::update_me),
                )
                .route("/", get(users::handlers::list_users))
                .route("/{id}/block", patch(users::handlers::block_user))
                .route("/{id}/unblock", patch(users::handlers::unblock_user))
                .route("/{id}/make-admin", patch(users::handlers::make_admin))
                .route("/{id}/make-volunteer", patch(users::handlers::make_volunteer))
                .layer(jwt(&state)),
        );

    // ==========================================================================
    // Request routes: public listing + JWT-protected lifecycle operations
    // ==========================================================================
    let request_routes = Router::new()
        .route("/pending-public", get(requests::handlers::public_pending))
        .merge(
            Router::new()
                .route("/", post(requests::handlers::create_request))
                .route("/my", get(requests::handlers::my_requests))
                .route("/assigned/my", get(requests::handlers::assigned_requests))
                .route("/all", get(requests::handlers::all_requests))
                .route(
                    "/{id}",
                    get(requests::handlers::get_request)
                        .put(requests::handlers::update_request)
                        .delete(requests::handlers::delete_request),
                )
                .route("/{id}/donate", patch(requests::handlers::donate))
                .route("/{id}/status", patch(requests::handlers::change_status))
                .layer(jwt(&state)),
        );

    // ==========================================================================
    // Funding routes (JWT)
    // ==========================================================================
    let funding_routes = Router::new()
        .route("/payments", post(funding::handlers::record_payment))
        .route("/", get(funding::handlers::list_funding))
        .route("/my", get(funding::handlers::my_funding))
        .route("/total", get(funding::handlers::funding_total))
        .layer(jwt(&state));

    // Public request details with the privacy projection
    let public_routes =
        Router::new().route("/requests/{id}", get(requests::handlers::get_public_request));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/users", user_routes)
        .nest("/api/v1/requests", request_routes)
        .nest("/api/v1/funding", funding_routes)
        .nest("/api/v1/public", public_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP gateway server.
pub async fn run_server(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API docs: http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
