// ============================
// backend-lib/src/lib.rs
// ============================
//! Core backend functionality for the boathouse media portal server.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod users;

use crate::catalog::{CatalogProvider, CloudAssetProvider};
use crate::config::Settings;
use crate::middleware::rate_limit::RateLimitEntry;
use crate::users::{FlatFileUserStore, UserStore};
use dashmap::DashMap;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// User account store
    pub users: Arc<dyn UserStore>,
    /// Cloud catalog provider
    pub catalog: Arc<dyn CatalogProvider>,
    /// Settings
    pub settings: Arc<Settings>,
    /// Per-client rate limit windows
    pub rate_limits: Arc<DashMap<String, RateLimitEntry>>,
}

impl AppState {
    /// Create a new application state
    pub fn new(
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogProvider>,
        settings: Settings,
    ) -> Self {
        Self {
            users,
            catalog,
            settings: Arc::new(settings),
            rate_limits: Arc::new(DashMap::new()),
        }
    }

    /// Create application state backed by the flat-file store and the cloud
    /// provider configured in `settings`
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let users = Arc::new(FlatFileUserStore::new(&settings.data_dir)?);
        let catalog = Arc::new(CloudAssetProvider::new(settings.catalog.clone())?);
        Ok(Self::new(users, catalog, settings))
    }
}
