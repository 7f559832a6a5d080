// ============================
// portal-state/src/menu.rs
// ============================
//! Filter and catalog state: the selected year/boat/type tuple, the menu
//! options resolved for it, and the asset list the selection maps to.
use crate::error::StateError;
use crate::session::SessionManager;
use async_trait::async_trait;
use boathouse_common::{
    is_model_year, resource_type_label, AssetRecord, FolderListing, Role, BRAND_LOGOS_KEY,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Resource-type keys visible to press accounts
const PRESS_ALLOWED_TYPE_KEYS: &[&str] = &[
    "photos",
    "videos",
    "brand-guidelines-logos",
    "specification-sheets",
    "ramcap",
    "performance-reports",
];

/// A selectable menu option: provider key plus display label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub key: String,
    pub label: String,
}

impl FilterOption {
    /// Option whose label is its key, for provider-controlled folder names
    pub fn verbatim(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
        }
    }
}

/// The filter field being changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Year,
    Boat,
    ResourceType,
}

/// The currently selected filter tuple.
///
/// Boat options are only valid for the selected year; a year change clears
/// the boat selection before anything else happens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub year: Option<FilterOption>,
    pub boat: Option<FilterOption>,
    pub resource_type: Option<FilterOption>,
}

/// Menu options resolved from the catalog service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogMenu {
    pub years: Vec<FilterOption>,
    /// Scoped to the selected year
    pub boats: Vec<FilterOption>,
    pub types: Vec<FilterOption>,
    /// The brand-logo collection, kept out of the general type list
    pub brand_logos: Option<FilterOption>,
}

impl CatalogMenu {
    /// Menu as visible to a role; press accounts see a restricted type list
    pub fn for_role(&self, role: Role) -> CatalogMenu {
        let mut menu = self.clone();
        if role == Role::Press {
            menu.types
                .retain(|t| PRESS_ALLOWED_TYPE_KEYS.contains(&t.key.as_str()));
        }
        menu
    }
}

/// Client of the external catalog query service
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Full folder listing: years, boats for the default year, type keys
    async fn fetch_menu(&self) -> Result<FolderListing, StateError>;

    /// Boat-model folders for a year
    async fn fetch_boats(&self, year: &str) -> Result<Vec<String>, StateError>;

    /// Assets for a year/boat selection, optionally narrowed by type
    async fn fetch_assets(
        &self,
        year: &str,
        boat: &str,
        resource_type: Option<&str>,
    ) -> Result<Vec<AssetRecord>, StateError>;

    /// Assets of the fixed brand-logo collection
    async fn fetch_brand_logos(&self) -> Result<Vec<AssetRecord>, StateError>;
}

/// Owns the filter selection and the fetched asset list.
///
/// Queries are permitted only while the session is authenticated. Within
/// one action the dependent steps run sequentially (boats before assets);
/// across overlapping actions a generation counter makes the last *issued*
/// query win, discarding stale responses.
pub struct MenuState {
    session: Arc<SessionManager>,
    catalog: Arc<dyn CatalogClient>,
    menu: RwLock<CatalogMenu>,
    active: RwLock<FilterSelection>,
    assets: RwLock<Vec<AssetRecord>>,
    generation: AtomicU64,
}

impl MenuState {
    pub fn new(session: Arc<SessionManager>, catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            session,
            catalog,
            menu: RwLock::new(CatalogMenu::default()),
            active: RwLock::new(FilterSelection::default()),
            assets: RwLock::new(Vec::new()),
            generation: AtomicU64::new(0),
        }
    }

    async fn ensure_authenticated(&self) -> Result<(), StateError> {
        if !self.session.is_authenticated().await {
            return Err(StateError::Auth("not authenticated".to_string()));
        }
        Ok(())
    }

    /// Resolve the full menu and select the first available year.
    ///
    /// Non-numeric top-level folder names are discarded; the brand-logo
    /// type key is partitioned into its own slot. On service error the
    /// menu collapses to empty and the error is reported, not escalated.
    pub async fn load_menu(&self) -> Result<(), StateError> {
        self.ensure_authenticated().await?;

        let listing = match self.catalog.fetch_menu().await {
            Ok(listing) => listing,
            Err(err) => {
                *self.menu.write().await = CatalogMenu::default();
                self.assets.write().await.clear();
                tracing::warn!(%err, "menu fetch failed");
                return Err(err);
            },
        };

        let years: Vec<FilterOption> = listing
            .years
            .iter()
            .filter(|key| is_model_year(key))
            .map(FilterOption::verbatim)
            .collect();

        let boats: Vec<FilterOption> = listing
            .boats
            .iter()
            .map(FilterOption::verbatim)
            .collect();

        let mut types = Vec::new();
        let mut brand_logos = None;
        for key in &listing.types {
            let option = FilterOption {
                key: key.clone(),
                label: resource_type_label(key),
            };
            if key == BRAND_LOGOS_KEY {
                brand_logos = Some(option);
            } else {
                types.push(option);
            }
        }

        let first_year = years.first().cloned();
        *self.menu.write().await = CatalogMenu {
            years,
            boats,
            types,
            brand_logos,
        };

        {
            let mut active = self.active.write().await;
            active.year = first_year;
            active.boat = None;
            active.resource_type = None;
        }

        // Missing boat makes this a local no-op, which is fine here
        match self.load_assets().await {
            Err(StateError::Validation(_)) | Ok(()) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Update one filter field and re-resolve the dependent state.
    ///
    /// A year change re-resolves the boat options for the new year (the
    /// current boat selection is cleared first); any change while the
    /// brand-logo collection is being viewed exits that mode.
    pub async fn set_filter(
        &self,
        field: FilterField,
        value: FilterOption,
    ) -> Result<(), StateError> {
        self.ensure_authenticated().await?;

        {
            let mut active = self.active.write().await;

            if field != FilterField::ResourceType {
                let viewing_brand_logos = active
                    .resource_type
                    .as_ref()
                    .map(|t| t.key == BRAND_LOGOS_KEY)
                    .unwrap_or(false);
                if viewing_brand_logos {
                    active.resource_type = None;
                }
            }

            match field {
                FilterField::Year => {
                    active.year = Some(value.clone());
                    active.boat = None;
                },
                FilterField::Boat => active.boat = Some(value.clone()),
                FilterField::ResourceType => active.resource_type = Some(value.clone()),
            }
        }

        if field == FilterField::Year {
            // Boat options must be re-scoped before any asset query
            match self.catalog.fetch_boats(&value.key).await {
                Ok(boats) => {
                    self.menu.write().await.boats =
                        boats.iter().map(FilterOption::verbatim).collect();
                },
                Err(err) => {
                    self.menu.write().await.boats = Vec::new();
                    self.assets.write().await.clear();
                    tracing::warn!(%err, year = %value.key, "boat re-resolution failed");
                    return Err(err);
                },
            }
        }

        match self.load_assets().await {
            // Missing required fields after a cascade is a local no-op
            Err(StateError::Validation(_)) | Ok(()) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Query assets for the current selection and replace the list.
    ///
    /// Requires year and boat, unless the brand-logo collection is
    /// selected, which queries its fixed folder instead. Missing fields
    /// are a local precondition failure: no network call is made and the
    /// asset list is left untouched.
    pub async fn load_assets(&self) -> Result<(), StateError> {
        self.ensure_authenticated().await?;

        let selection = self.active.read().await.clone();
        let brand_logos_selected = selection
            .resource_type
            .as_ref()
            .map(|t| t.key == BRAND_LOGOS_KEY)
            .unwrap_or(false);

        let (year, boat) = if brand_logos_selected {
            (None, None)
        } else {
            match (&selection.year, &selection.boat) {
                (Some(y), Some(b)) => (Some(y.key.clone()), Some(b.key.clone())),
                _ => {
                    return Err(StateError::Validation(
                        "year and boat model are required".to_string(),
                    ))
                },
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = if brand_logos_selected {
            self.catalog.fetch_brand_logos().await
        } else {
            self.catalog
                .fetch_assets(
                    year.as_deref().unwrap_or_default(),
                    boat.as_deref().unwrap_or_default(),
                    selection.resource_type.as_ref().map(|t| t.key.as_str()),
                )
                .await
        };

        // A later call supersedes this one; drop the stale response
        if self.generation.load(Ordering::SeqCst) != generation {
            return Ok(());
        }

        match result {
            Ok(assets) => {
                *self.assets.write().await = assets;
                Ok(())
            },
            Err(err) => {
                self.assets.write().await.clear();
                tracing::warn!(%err, "asset query failed");
                Err(err)
            },
        }
    }

    /// Clear the selection back to its unset state
    pub async fn reset_filter(&self) {
        *self.active.write().await = FilterSelection::default();
    }

    /// Snapshot of the resolved menu
    pub async fn menu(&self) -> CatalogMenu {
        self.menu.read().await.clone()
    }

    /// Snapshot of the current selection
    pub async fn selection(&self) -> FilterSelection {
        self.active.read().await.clone()
    }

    /// Snapshot of the fetched asset list
    pub async fn assets(&self) -> Vec<AssetRecord> {
        self.assets.read().await.clone()
    }

    /// Menu as visible to the authenticated user's role
    pub async fn menu_for_current_role(&self) -> CatalogMenu {
        let menu = self.menu.read().await.clone();
        match self.session.current_user().await {
            Some(user) => menu.for_role(user.role),
            None => menu,
        }
    }
}
