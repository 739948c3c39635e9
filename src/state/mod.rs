/// State management module
///
/// This module handles all persisted state, including:
/// - The SQLite catalog of stored files and settings (library.rs)
/// - Shared data structures (data.rs)
/// - The pending upload/crop workflow (workflow.rs)
///
/// The workflow only talks to storage through the two traits below,
/// so a host can plug in its own media library and options table.

pub mod data;
pub mod library;
pub mod workflow;

use std::path::Path;

use crate::error::Result;
use data::{Asset, AssetId, AssetVariant, NewAsset, NewVariant, SiteContext};

/// Binary asset storage with metadata
pub trait AssetStore {
    /// Directory new files are written to before being registered
    fn upload_dir(&self) -> &Path;

    /// Register a file that already exists under `upload_dir`
    fn insert_asset(&self, ctx: &SiteContext, asset: &NewAsset) -> Result<Asset>;

    fn get_asset(&self, id: AssetId) -> Result<Option<Asset>>;

    /// Attach a generated size variant to an asset
    fn add_variant(&self, id: AssetId, variant: &NewVariant) -> Result<AssetVariant>;

    /// Variants of an asset, largest first
    fn variants(&self, id: AssetId) -> Result<Vec<AssetVariant>>;

    /// Delete an asset, its file and all variant files.
    /// Returns false when no such asset exists.
    fn delete_asset(&self, id: AssetId) -> Result<bool>;
}

/// Named singleton values scoped to a site
pub trait SettingsStore {
    fn get_option(&self, ctx: &SiteContext, name: &str) -> Result<Option<String>>;

    fn set_option(&self, ctx: &SiteContext, name: &str, value: &str) -> Result<()>;

    /// Returns false when the option was not set
    fn delete_option(&self, ctx: &SiteContext, name: &str) -> Result<bool>;
}
