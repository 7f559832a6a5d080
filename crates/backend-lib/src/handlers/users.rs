// ============================
// backend-lib/src/handlers/users.rs
// ============================
//! Account handlers: registration, login, password reset, admin CRUD.
use crate::auth::{
    generate_reset_token, hash_password_secure, issue_token, validate_password_strength,
    verify_password, Claims, ResetToken,
};
use crate::error::AppError;
use crate::users::UserRecord;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use boathouse_common::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest, ResetPasswordPayload,
    ResetRequestPayload, ResetRequestResponse, Role, UpdateUserRequest, UserProfile,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Load the acting user's record and require the admin role
async fn require_admin(state: &AppState, claims: &Claims) -> Result<UserRecord, AppError> {
    let actor = state
        .users
        .get(claims.sub)
        .await?
        .ok_or_else(|| AppError::Auth("unknown subject".to_string()))?;
    if actor.role != Role::Admin {
        return Err(AppError::Forbidden);
    }
    Ok(actor)
}

/// `POST /api/users/register`
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if payload.email.is_empty() || payload.password.is_empty() || payload.name.is_empty() {
        return Err(AppError::Validation(
            "email, password and name are required".to_string(),
        ));
    }
    if !validate_password_strength(&payload.password, &state.settings.password_requirements) {
        return Err(AppError::Validation(
            "password does not meet the complexity requirements".to_string(),
        ));
    }

    let password_hash = hash_password_secure(&mut payload.password)?;
    let record = UserRecord {
        id: Uuid::new_v4(),
        email: payload.email,
        name: payload.name,
        role: payload.role,
        password_hash,
        reset_token: None,
    };

    state.users.create(record.clone()).await?;

    let token = issue_token(
        record.id,
        state.settings.token_ttl_secs,
        &state.settings.jwt_secret,
    )?;
    tracing::info!(user = %record.email, "registered new account");

    Ok(Json(AuthResponse {
        user: record.profile(),
        token,
    }))
}

/// `POST /api/users/login`
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let record = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&record.password_hash, &payload.password) {
        tracing::debug!(user = %payload.email, "password mismatch");
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(
        record.id,
        state.settings.token_ttl_secs,
        &state.settings.jwt_secret,
    )?;

    Ok(Json(AuthResponse {
        user: record.profile(),
        token,
    }))
}

/// `POST /api/users/logout`
///
/// Tokens are stateless, so there is nothing to revoke server-side; the
/// endpoint exists so clients can notify best-effort and always succeeds.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "logged out".to_string(),
    })
}

/// `POST /api/users/reset-password-request`
pub async fn reset_password_request(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequestPayload>,
) -> Result<Json<ResetRequestResponse>, AppError> {
    if payload.email.is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }

    let token = ResetToken {
        token: generate_reset_token(),
        expires_at: Utc::now() + Duration::seconds(state.settings.reset_token_ttl_secs as i64),
    };
    state
        .users
        .set_reset_token(&payload.email, token.clone())
        .await?;

    let reset_url = format!(
        "{}/reset-password?token={}",
        state.settings.public_url, token.token
    );

    Ok(Json(ResetRequestResponse {
        message: "password reset link issued".to_string(),
        reset_url,
    }))
}

/// `POST /api/users/reset-password`
pub async fn reset_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ResetPasswordPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    if !validate_password_strength(&payload.new_password, &state.settings.password_requirements) {
        return Err(AppError::Validation(
            "password does not meet the complexity requirements".to_string(),
        ));
    }

    let mut record = state.users.take_by_reset_token(&payload.token).await?;
    record.password_hash = hash_password_secure(&mut payload.new_password)?;
    state.users.update(record).await?;

    Ok(Json(MessageResponse {
        message: "password updated".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyTokenQuery {
    pub token: String,
}

/// `GET /api/users/verify-reset-token?token=`
pub async fn verify_reset_token(
    State(state): State<AppState>,
    Query(query): Query<VerifyTokenQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    match state.users.find_by_reset_token(&query.token).await? {
        Some(_) => Ok(Json(MessageResponse {
            message: "token is valid".to_string(),
        })),
        None => Err(AppError::InvalidResetToken),
    }
}

/// `GET /api/users` (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    require_admin(&state, &claims).await?;

    let records = state.users.list().await?;
    Ok(Json(records.iter().map(UserRecord::profile).collect()))
}

/// `PUT /api/users/{id}` (admin)
pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, AppError> {
    require_admin(&state, &claims).await?;

    let mut record = state
        .users
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    if let Some(name) = payload.name {
        record.name = name;
    }
    if let Some(role) = payload.role {
        record.role = role;
    }

    state.users.update(record.clone()).await?;
    Ok(Json(record.profile()))
}

/// `DELETE /api/users/{id}` (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let actor = require_admin(&state, &claims).await?;
    if actor.id == id {
        return Err(AppError::Validation(
            "cannot delete the acting account".to_string(),
        ));
    }

    state.users.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "user deleted".to_string(),
    }))
}
