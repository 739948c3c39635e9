/// Shared data structures for the site icon state
///
/// These structs represent the data model that flows between
/// the catalog layer and the two workflow stages.

use serde::{Deserialize, Serialize};

/// Catalog ID of a stored asset
pub type AssetId = i64;

/// Asset context for the published icon master
pub const CONTEXT_SITE_ICON: &str = "site-icon";
/// Asset context for throwaway preview images
pub const CONTEXT_TEMP: &str = "site-icon-temp";
/// Asset context for files uploaded through the icon workflow
pub const CONTEXT_UPLOAD: &str = "site-icon-upload";

/// The request context every operation runs in.
/// Replaces the ambient "current blog" lookup of a multi-site host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteContext {
    pub site_id: i64,
}

impl SiteContext {
    pub fn new(site_id: i64) -> Self {
        Self { site_id }
    }
}

impl Default for SiteContext {
    fn default() -> Self {
        Self { site_id: 1 }
    }
}

/// A file stored in the asset catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Unique database ID
    pub id: AssetId,
    /// Site the asset was uploaded to
    pub site_id: i64,
    pub title: String,
    /// Full path to the file on disk
    pub path: String,
    /// Public URL of the file
    pub url: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    /// Asset this one was derived from, if any
    pub parent_id: Option<AssetId>,
    /// What created the asset (e.g. "site-icon", "site-icon-temp")
    pub context: String,
}

/// Everything needed to register a file that is already on disk
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub title: String,
    pub path: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub parent_id: Option<AssetId>,
    pub context: String,
}

/// A square size derivative stored alongside an asset
#[derive(Debug, Clone, PartialEq)]
pub struct AssetVariant {
    /// Target size in pixels (both sides)
    pub size: u32,
    pub path: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// A generated variant file waiting to be attached to its asset
#[derive(Debug, Clone, PartialEq)]
pub struct NewVariant {
    pub size: u32,
    pub path: String,
    pub width: u32,
    pub height: u32,
}

/// The original uploaded image. Owned by the catalog, only referenced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceImage {
    pub id: AssetId,
    pub path: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
}

impl From<&Asset> for SourceImage {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id,
            path: asset.path.clone(),
            url: asset.url.clone(),
            width: asset.width,
            height: asset.height,
            mime_type: asset.mime_type.clone(),
        }
    }
}

/// Downscaled copy of the source shown in the crop step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewImage {
    /// Temporary asset holding the preview file
    pub id: AssetId,
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// source width / preview width, always >= 1.0
    pub scale_ratio: f64,
}

/// Rectangle chosen by the user, in preview pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSelection {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropSelection {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the rectangle lies within a `width` x `height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// The committed icon: a square master plus its smaller variants
#[derive(Debug, Clone, PartialEq)]
pub struct SiteIcon {
    pub master: Asset,
    /// Sorted largest first
    pub variants: Vec<AssetVariant>,
}

impl SiteIcon {
    pub fn id(&self) -> AssetId {
        self.master.id
    }

    /// Smallest variant at least `size` pixels wide, or the master
    /// when nothing smaller is big enough.
    pub fn url_for_size(&self, size: u32) -> &str {
        if size >= self.master.width {
            return &self.master.url;
        }
        self.variants
            .iter()
            .filter(|v| v.size >= size)
            .min_by_key(|v| v.size)
            .map(|v| v.url.as_str())
            .unwrap_or(self.master.url.as_str())
    }
}
