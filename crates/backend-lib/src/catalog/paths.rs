// ============================
// backend-lib/src/catalog/paths.rs
// ============================
//! The folder-path convention: `brand/year/boat[/type]` nested folders in
//! the asset-storage provider, and the search expressions built from them.
use boathouse_common::BRAND_LOGOS_KEY;

/// Resource-type folder names served to clients.
///
/// The brand-logos collection rides along here; the state core pulls it
/// out of the general list into its own slot.
pub const TYPE_KEYS: &[&str] = &[
    "photos",
    "videos",
    "specification-sheets",
    "performance-reports",
    "ramcap",
    BRAND_LOGOS_KEY,
];

/// Provider resource kind searched for a given resource-type key.
///
/// Everything except videos lives as image assets (PDFs included).
pub fn resource_kind(type_key: &str) -> &'static str {
    if type_key == "videos" {
        "video"
    } else {
        "image"
    }
}

/// Folder path for a year/boat selection, optionally narrowed by type
pub fn folder_path(root: &str, year: &str, boat: &str, type_key: Option<&str>) -> String {
    match type_key {
        Some(t) if t != "photos" => format!("{root}/{year}/{boat}/{t}"),
        _ => format!("{root}/{year}/{boat}"),
    }
}

/// The fixed folder serving brand logos, outside the year/boat tree
pub fn brand_logos_folder(root: &str) -> String {
    format!("{root}/{BRAND_LOGOS_KEY}")
}

/// Provider search expression for a folder and resource kind
pub fn search_expression(folder: &str, kind: &str) -> String {
    format!("folder:\"{folder}\" AND resource_type:{kind}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_path() {
        assert_eq!(
            folder_path("nauticstar", "2022", "ns231", None),
            "nauticstar/2022/ns231"
        );
        assert_eq!(
            folder_path("nauticstar", "2022", "ns231", Some("videos")),
            "nauticstar/2022/ns231/videos"
        );
        // Photos are the folder's direct contents, not a subfolder
        assert_eq!(
            folder_path("nauticstar", "2022", "ns231", Some("photos")),
            "nauticstar/2022/ns231"
        );
    }

    #[test]
    fn test_search_expression() {
        assert_eq!(
            search_expression("nauticstar/2022/ns231", "image"),
            "folder:\"nauticstar/2022/ns231\" AND resource_type:image"
        );
    }

    #[test]
    fn test_brand_logos_folder() {
        assert_eq!(brand_logos_folder("nauticstar"), "nauticstar/brand_logos");
    }

    #[test]
    fn test_resource_kind() {
        assert_eq!(resource_kind("videos"), "video");
        assert_eq!(resource_kind("photos"), "image");
        assert_eq!(resource_kind("specification-sheets"), "image");
    }
}
