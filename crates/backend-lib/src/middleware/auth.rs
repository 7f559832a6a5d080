// crates/backend-lib/src/middleware/auth.rs

//! Bearer-token guard for protected routes.
use crate::auth::decode_token;
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

/// Require a valid login token; stores the claims in request extensions
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Auth("missing authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("malformed authorization header".to_string()))?;

    let claims = decode_token(token, &state.settings.jwt_secret)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
