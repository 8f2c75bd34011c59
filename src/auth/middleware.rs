use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::gateway::{
    response::{ApiResponse, error_codes},
    state::AppState,
};

/// Bearer-token middleware: resolves the caller to an [`Identity`] and
/// injects it into request extensions for handlers to pick up.
///
/// Missing header, wrong scheme and failed verification all produce the
/// same 401 body; callers cannot tell which check rejected them.
///
/// [`Identity`]: crate::auth::Identity
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ApiResponse<()>>)> {
    let unauthorized = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(
                error_codes::AUTH_FAILED,
                "Unauthorized",
            )),
        )
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(unauthorized)?;

    match state.auth.authenticate(token) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(_) => Err(unauthorized()),
    }
}
