// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! shared between the boathouse backend and the portal state core.
//! This module defines the HTTP API payloads and supporting types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resource-type key that is kept out of the general type list and served
/// from its own fixed folder, independent of year and boat model.
pub const BRAND_LOGOS_KEY: &str = "brand_logos";

/// Display label for a provider-native resource-type key.
///
/// Unrecognized keys pass through verbatim as their own label, since the
/// type list is built from provider-controlled folder names.
pub fn resource_type_label(key: &str) -> String {
    match key {
        "photos" => "Photos".to_string(),
        "videos" => "Videos".to_string(),
        "brand-guidelines-logos" => "Brand Guidelines & Logos".to_string(),
        "specification-sheets" => "Specification Sheets".to_string(),
        "performance-reports" => "Performance Reports".to_string(),
        "ramcap" => "RAMCAP".to_string(),
        BRAND_LOGOS_KEY => "Brand Logos".to_string(),
        other => other.to_string(),
    }
}

/// Whether a top-level folder name is a model year.
///
/// The provider tree mixes year folders with fixed collections (brand
/// logos and the like); only numeric-looking names count as years.
pub fn is_model_year(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_digit())
}

/// User roles as stored in the account documents
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Press,
    Viewer,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// Public view of a user account (never carries the password hash)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// A single media asset returned by a catalog query
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AssetRecord {
    /// Delivery URL of the asset
    pub url: String,
    /// Human-readable name, derived from the provider filename
    pub display_name: String,
    /// When the asset was uploaded to the provider
    pub created_at: DateTime<Utc>,
}

/// Response of `GET /catalog/folders`
///
/// Folder names are raw provider keys; the state core turns them into
/// labeled filter options.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FolderListing {
    /// Top-level folder names (model years, by convention)
    pub years: Vec<String>,
    /// Boat-model folders for the first available year
    pub boats: Vec<String>,
    /// Resource-type folder names
    pub types: Vec<String>,
}

/// Response of `GET /catalog/subfolders?year=`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SubfolderListing {
    pub boats: Vec<String>,
}

/// Response of `GET /catalog/assets` and `GET /catalog/all-assets`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AssetListing {
    pub assets: Vec<AssetRecord>,
}

/// Request body for `POST /api/users/register`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

/// Request body for `POST /api/users/login`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login/registration response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

/// Request body for `POST /api/users/reset-password-request`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResetRequestPayload {
    pub email: String,
}

/// Response of a reset request; `reset_url` carries the single-use token
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequestResponse {
    pub message: String,
    pub reset_url: String,
}

/// Request body for `POST /api/users/reset-password`
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordPayload {
    pub token: String,
    pub new_password: String,
}

/// Request body for `PUT /api/users/{id}`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
}

/// Generic message-only response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Press).unwrap();
        assert_eq!(json, "\"press\"");

        let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn test_register_request_default_role() {
        let json = r#"{"email":"a@b.com","password":"pw","name":"A"}"#;
        let parsed: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.role, Role::User);
    }

    #[test]
    fn test_resource_type_labels() {
        assert_eq!(resource_type_label("photos"), "Photos");
        assert_eq!(resource_type_label("videos"), "Videos");
        assert_eq!(
            resource_type_label("specification-sheets"),
            "Specification Sheets"
        );
        // Unknown keys are their own label
        assert_eq!(resource_type_label("owner-manuals"), "owner-manuals");
    }

    #[test]
    fn test_is_model_year() {
        assert!(is_model_year("2022"));
        assert!(is_model_year("1999"));
        assert!(!is_model_year("brandlogo"));
        assert!(!is_model_year("2022-archive"));
        assert!(!is_model_year(""));
    }

    #[test]
    fn test_asset_record_roundtrip() {
        let record = AssetRecord {
            url: "https://cdn.example.com/2022/ns231/hero.jpg".to_string(),
            display_name: "hero.jpg".to_string(),
            created_at: "2022-03-04T10:00:00Z".parse().unwrap(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: AssetRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
