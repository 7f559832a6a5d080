// ============================
// backend-lib/src/router.rs
// ============================
//! HTTP router construction.
use crate::handlers::{catalog, users};
use crate::middleware::{rate_limit, require_auth};
use crate::AppState;
use axum::{
    middleware as axum_mw,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the full router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Routes that require a valid login token
    let protected = Router::new()
        .route("/api/users/logout", post(users::logout))
        .route("/api/users", get(users::list_users))
        .route(
            "/api/users/{id}",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/catalog/folders", get(catalog::folders))
        .route("/catalog/subfolders", get(catalog::subfolders))
        .route("/catalog/assets", get(catalog::assets))
        .route("/catalog/all-assets", get(catalog::all_assets))
        .route("/catalog/upload", post(catalog::upload))
        .layer(axum_mw::from_fn_with_state(state.clone(), require_auth));

    // Public routes (no auth)
    let public = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .route(
            "/api/users/reset-password-request",
            post(users::reset_password_request),
        )
        .route("/api/users/reset-password", post(users::reset_password))
        .route(
            "/api/users/verify-reset-token",
            get(users::verify_reset_token),
        );

    public
        .merge(protected)
        .layer(axum_mw::from_fn_with_state(state.clone(), rate_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
