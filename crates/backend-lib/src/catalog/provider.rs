// ============================
// backend-lib/src/catalog/provider.rs
// ============================
//! HTTP client for the cloud asset-storage provider's Admin and Search APIs.
use crate::config::CatalogSettings;
use crate::error::AppError;
use async_trait::async_trait;
use boathouse_common::AssetRecord;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

/// A folder as returned by the provider's folder-listing API
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderFolder {
    pub name: String,
    pub path: String,
}

/// An asset as returned by the provider's search API
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderResource {
    pub secure_url: String,
    pub public_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProviderResource {
    /// Convert to the wire record served to clients
    pub fn into_record(self) -> AssetRecord {
        let display_name = self
            .filename
            .unwrap_or_else(|| {
                self.public_id
                    .rsplit('/')
                    .next()
                    .unwrap_or(&self.public_id)
                    .to_string()
            });
        AssetRecord {
            url: self.secure_url,
            display_name,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FolderListResponse {
    folders: Vec<ProviderFolder>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    resources: Vec<ProviderResource>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Trait for catalog provider backends
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// List the immediate subfolders of a folder path
    async fn sub_folders(&self, path: &str) -> Result<Vec<ProviderFolder>, AppError>;

    /// Search assets matching an expression, newest first
    async fn search_assets(
        &self,
        expression: &str,
        max_results: u32,
    ) -> Result<Vec<AssetRecord>, AppError>;

    /// List image assets across the whole library
    async fn resources(&self, max_results: u32) -> Result<Vec<AssetRecord>, AppError>;

    /// Upload a file into a folder, returning its delivery URL
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError>;
}

/// Reqwest-backed implementation against the provider's HTTP API
pub struct CloudAssetProvider {
    http: reqwest::Client,
    settings: CatalogSettings,
}

impl CloudAssetProvider {
    pub fn new(settings: CatalogSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, settings })
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/v1_1/{}/{}",
            self.settings.api_base, self.settings.cloud_name, path
        )
    }

    /// Issue an authenticated GET and parse the JSON response
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.settings.api_key, Some(&self.settings.api_secret))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Service(format!(
                "provider returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogProvider for CloudAssetProvider {
    async fn sub_folders(&self, path: &str) -> Result<Vec<ProviderFolder>, AppError> {
        let url = self.api_url(&format!("folders/{path}"));
        let listing: FolderListResponse = self.get_json(&url).await?;
        Ok(listing.folders)
    }

    async fn search_assets(
        &self,
        expression: &str,
        max_results: u32,
    ) -> Result<Vec<AssetRecord>, AppError> {
        let url = self.api_url("resources/search");
        let body = serde_json::json!({
            "expression": expression,
            "sort_by": [{"created_at": "desc"}],
            "max_results": max_results,
        });

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.settings.api_key, Some(&self.settings.api_secret))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Service(format!(
                "provider search returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let search: SearchResponse = response.json().await?;
        Ok(search
            .resources
            .into_iter()
            .map(ProviderResource::into_record)
            .collect())
    }

    async fn resources(&self, max_results: u32) -> Result<Vec<AssetRecord>, AppError> {
        let url = self.api_url(&format!("resources/image?max_results={max_results}"));
        let listing: SearchResponse = self.get_json(&url).await?;
        Ok(listing
            .resources
            .into_iter()
            .map(ProviderResource::into_record)
            .collect())
    }

    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let url = self.api_url("image/upload");
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("folder", folder.to_string())
            .part("file", part);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.settings.api_key, Some(&self.settings.api_secret))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Service(format!(
                "provider upload returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let uploaded: UploadResponse = response.json().await?;
        Ok(uploaded.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_display_name_prefers_filename() {
        let resource = ProviderResource {
            secure_url: "https://cdn.example.com/a.jpg".to_string(),
            public_id: "nauticstar/2022/ns231/a1b2c3".to_string(),
            filename: Some("bow-shot.jpg".to_string()),
            created_at: Utc::now(),
        };
        assert_eq!(resource.into_record().display_name, "bow-shot.jpg");
    }

    #[test]
    fn test_resource_display_name_falls_back_to_public_id_tail() {
        let resource = ProviderResource {
            secure_url: "https://cdn.example.com/a.jpg".to_string(),
            public_id: "nauticstar/2022/ns231/a1b2c3".to_string(),
            filename: None,
            created_at: Utc::now(),
        };
        assert_eq!(resource.into_record().display_name, "a1b2c3");
    }

    #[test]
    fn test_search_response_parsing() {
        let json = r#"{
            "resources": [
                {
                    "secure_url": "https://cdn.example.com/x.jpg",
                    "public_id": "nauticstar/2022/ns231/x",
                    "created_at": "2022-03-04T10:00:00Z"
                }
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.resources.len(), 1);
        assert_eq!(
            parsed.resources[0].secure_url,
            "https://cdn.example.com/x.jpg"
        );
    }
}
