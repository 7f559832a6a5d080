// ============================
// backend-lib/src/handlers/catalog.rs
// ============================
//! Catalog handlers: folder listings, asset search, upload.
use crate::catalog::{
    brand_logos_folder, folder_path, resource_kind, search_expression, TYPE_KEYS,
};
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use boathouse_common::{AssetListing, FolderListing, SubfolderListing, BRAND_LOGOS_KEY};
use serde::Deserialize;

/// `GET /catalog/folders`
///
/// Top-level folders are model years by convention; boat models are
/// resolved for the first available year as the default selection.
pub async fn folders(State(state): State<AppState>) -> Result<Json<FolderListing>, AppError> {
    let root = &state.settings.catalog.root_folder;
    let top = state.catalog.sub_folders(root).await?;
    let years: Vec<String> = top.into_iter().map(|f| f.name).collect();

    let mut boats = Vec::new();
    if let Some(first_year) = years.first() {
        let path = format!("{root}/{first_year}");
        boats = state
            .catalog
            .sub_folders(&path)
            .await?
            .into_iter()
            .map(|f| f.name)
            .collect();
    }

    Ok(Json(FolderListing {
        years,
        boats,
        types: TYPE_KEYS.iter().map(|k| k.to_string()).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SubfolderQuery {
    pub year: String,
}

/// `GET /catalog/subfolders?year=`
pub async fn subfolders(
    State(state): State<AppState>,
    Query(query): Query<SubfolderQuery>,
) -> Result<Json<SubfolderListing>, AppError> {
    let path = format!("{}/{}", state.settings.catalog.root_folder, query.year);
    let boats = state
        .catalog
        .sub_folders(&path)
        .await?
        .into_iter()
        .map(|f| f.name)
        .collect();

    Ok(Json(SubfolderListing { boats }))
}

#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    pub year: Option<String>,
    pub boat: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
}

/// `GET /catalog/assets?year=&boat=&type=`
///
/// The brand-logos type is served from its fixed folder and ignores the
/// year/boat parameters; every other query requires both.
pub async fn assets(
    State(state): State<AppState>,
    Query(query): Query<AssetQuery>,
) -> Result<Json<AssetListing>, AppError> {
    let settings = &state.settings.catalog;

    let (folder, kind) = match query.resource_type.as_deref() {
        Some(BRAND_LOGOS_KEY) => (brand_logos_folder(&settings.root_folder), "image"),
        type_key => {
            let (year, boat) = match (query.year.as_deref(), query.boat.as_deref()) {
                (Some(y), Some(b)) if !y.is_empty() && !b.is_empty() => (y, b),
                _ => {
                    return Err(AppError::Validation(
                        "missing year or boat parameter".to_string(),
                    ))
                },
            };
            (
                folder_path(&settings.root_folder, year, boat, type_key),
                type_key.map(resource_kind).unwrap_or("image"),
            )
        },
    };

    let expression = search_expression(&folder, kind);
    tracing::debug!(%expression, "catalog asset search");

    let assets = state
        .catalog
        .search_assets(&expression, settings.max_results)
        .await?;

    Ok(Json(AssetListing { assets }))
}

/// `GET /catalog/all-assets`
pub async fn all_assets(State(state): State<AppState>) -> Result<Json<AssetListing>, AppError> {
    let assets = state.catalog.resources(100).await?;
    Ok(Json(AssetListing { assets }))
}

/// `POST /catalog/upload` (multipart: `folder` text field + `file` part)
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut folder: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("folder") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid folder field: {e}")))?;
                folder = Some(value);
            },
            Some("file") => {
                let filename = field
                    .file_name()
                    .unwrap_or("upload.bin")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid file field: {e}")))?;
                file = Some((filename, bytes.to_vec()));
            },
            _ => {},
        }
    }

    let folder = folder
        .ok_or_else(|| AppError::Validation("missing folder field".to_string()))?;
    let (filename, bytes) =
        file.ok_or_else(|| AppError::Validation("missing file field".to_string()))?;

    let url = state.catalog.upload(&folder, &filename, bytes).await?;
    tracing::info!(%folder, %filename, "uploaded asset");

    Ok(Json(serde_json::json!({ "url": url })))
}
