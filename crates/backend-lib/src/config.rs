// ============================
// backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Public base URL, used to build password-reset links
    pub public_url: String,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Secret used to sign login tokens
    pub jwt_secret: String,
    /// Login token TTL in seconds
    pub token_ttl_secs: u64,
    /// Password-reset token TTL in seconds
    pub reset_token_ttl_secs: u64,
    /// Catalog provider settings
    pub catalog: CatalogSettings,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
    /// Rate limit settings
    pub rate_limit: RateLimitSettings,
}

/// Cloud asset-storage provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Provider API base URL
    pub api_base: String,
    /// Provider cloud name (first path segment of every API call)
    pub cloud_name: String,
    /// API key, sent as the basic-auth username
    pub api_key: String,
    /// API secret, sent as the basic-auth password
    pub api_secret: String,
    /// Brand root folder under which the year/boat/type tree lives
    pub root_folder: String,
    /// Maximum results per asset search
    pub max_results: u32,
}

/// Password complexity requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRequirements {
    /// Minimum password length
    pub min_length: usize,
    /// Require uppercase letters
    pub require_uppercase: bool,
    /// Require lowercase letters
    pub require_lowercase: bool,
    /// Require digits
    pub require_digit: bool,
    /// Require special characters
    pub require_special: bool,
}

/// Fixed-window rate limit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Window length in seconds
    pub window_secs: u64,
    /// Maximum requests per window per client
    pub max_requests: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".parse().unwrap(),
            public_url: "http://localhost:5173".to_string(),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            jwt_secret: "change-me".to_string(),
            token_ttl_secs: 60 * 60 * 24, // 1 day
            reset_token_ttl_secs: 60 * 60, // 1 hour
            catalog: CatalogSettings::default(),
            password_requirements: PasswordRequirements::default(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.cloudinary.com".to_string(),
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            root_folder: "nauticstar".to_string(),
            max_results: 50,
        }
    }
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: 10,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 100,
        }
    }
}

impl Settings {
    /// Load settings from config files and environment variables
    pub fn load() -> Result<Settings> {
        // Defaults first, then config files, then environment overrides
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"))
            .merge(Yaml::file("config.yaml"))
            .merge(Json::file("config.json"))
            .merge(Env::prefixed("BOATHOUSE_").split("__"))
            .extract()?;

        Ok(settings)
    }

    /// Load settings from an explicit TOML file path
    pub fn load_from(path: &str) -> Result<Settings> {
        let settings = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("BOATHOUSE_").split("__"))
            .extract()?;

        Ok(settings)
    }
}
