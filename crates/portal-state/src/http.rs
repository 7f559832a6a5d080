// ============================
// portal-state/src/http.rs
// ============================
//! Reqwest-backed clients for the backend's auth and catalog routes.
use crate::error::StateError;
use crate::menu::CatalogClient;
use crate::session::{AuthClient, SessionManager};
use async_trait::async_trait;
use boathouse_common::{
    AssetListing, AssetRecord, AuthResponse, FolderListing, LoginRequest, MessageResponse,
    ResetPasswordPayload, ResetRequestPayload, ResetRequestResponse, SubfolderListing,
    BRAND_LOGOS_KEY,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Pull the service-provided message out of an error body, if present
async fn error_message(response: reqwest::Response, fallback: &str) -> String {
    let body: Option<serde_json::Value> = response.json().await.ok();
    body.as_ref()
        .and_then(|v| v.pointer("/error/message"))
        .and_then(|m| m.as_str())
        .unwrap_or(fallback)
        .to_string()
}

async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, StateError> {
    let status = response.status();
    if !status.is_success() {
        if status.is_client_error() {
            return Err(StateError::Auth(error_message(response, fallback).await));
        }
        return Err(StateError::Service(error_message(response, fallback).await));
    }
    Ok(response.json().await?)
}

fn build_client() -> Result<reqwest::Client, StateError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?)
}

/// Auth client speaking to the backend's `/api/users` routes
pub struct HttpAuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, StateError> {
        Ok(Self {
            http: build_client()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, StateError> {
        let response = self
            .http
            .post(format!("{}/api/users/login", self.base_url))
            .json(&request)
            .send()
            .await?;
        parse_response(response, "Login failed").await
    }

    async fn logout(&self, token: &str) -> Result<(), StateError> {
        self.http
            .post(format!("{}/api/users/logout", self.base_url))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()
            .map_err(StateError::from)?;
        Ok(())
    }

    async fn request_reset(
        &self,
        payload: ResetRequestPayload,
    ) -> Result<ResetRequestResponse, StateError> {
        let response = self
            .http
            .post(format!("{}/api/users/reset-password-request", self.base_url))
            .json(&payload)
            .send()
            .await?;
        parse_response(response, "Reset request failed").await
    }

    async fn reset_password(
        &self,
        payload: ResetPasswordPayload,
    ) -> Result<MessageResponse, StateError> {
        let response = self
            .http
            .post(format!("{}/api/users/reset-password", self.base_url))
            .json(&payload)
            .send()
            .await?;
        parse_response(response, "Reset password failed").await
    }

    async fn verify_reset_token(&self, token: &str) -> Result<MessageResponse, StateError> {
        let response = self
            .http
            .get(format!(
                "{}/api/users/verify-reset-token?token={token}",
                self.base_url
            ))
            .send()
            .await?;
        parse_response(response, "Token verification failed").await
    }
}

/// Catalog client speaking to the backend's `/catalog` routes.
///
/// Attaches the session's bearer token to every request, so queries only
/// succeed while the session is authenticated.
pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl HttpCatalogClient {
    pub fn new(
        base_url: impl Into<String>,
        session: Arc<SessionManager>,
    ) -> Result<Self, StateError> {
        Ok(Self {
            http: build_client()?,
            base_url: base_url.into(),
            session,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, StateError> {
        let token = self
            .session
            .token()
            .await
            .ok_or_else(|| StateError::Auth("not authenticated".to_string()))?;

        let response = self
            .http
            .get(format!("{}{path_and_query}", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        parse_response(response, "Catalog query failed").await
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_menu(&self) -> Result<FolderListing, StateError> {
        self.get_json("/catalog/folders").await
    }

    async fn fetch_boats(&self, year: &str) -> Result<Vec<String>, StateError> {
        let listing: SubfolderListing = self
            .get_json(&format!("/catalog/subfolders?year={year}"))
            .await?;
        Ok(listing.boats)
    }

    async fn fetch_assets(
        &self,
        year: &str,
        boat: &str,
        resource_type: Option<&str>,
    ) -> Result<Vec<AssetRecord>, StateError> {
        let mut path = format!("/catalog/assets?year={year}&boat={boat}");
        if let Some(type_key) = resource_type {
            path.push_str(&format!("&type={type_key}"));
        }
        let listing: AssetListing = self.get_json(&path).await?;
        Ok(listing.assets)
    }

    async fn fetch_brand_logos(&self) -> Result<Vec<AssetRecord>, StateError> {
        let listing: AssetListing = self
            .get_json(&format!("/catalog/assets?type={BRAND_LOGOS_KEY}"))
            .await?;
        Ok(listing.assets)
    }
}
