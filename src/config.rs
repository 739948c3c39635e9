//! Site icon configuration
//!
//! Settings are read from a TOML file. Every key is optional; anything
//! missing falls back to the defaults below.
//!
//! ```toml
//! min_size = 512
//! page_crop = 512
//! extra_sizes = [192, 64]
//! commit_strategy = "write-then-swap"
//! base_url = "https://example.com/uploads"
//! ```

use crate::error::{IconError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum (and master) icon size in pixels
pub const DEFAULT_MIN_SIZE: u32 = 512;

/// Longest side of the preview shown in the crop step
pub const DEFAULT_PAGE_CROP: u32 = 512;

/// Tile (270), touch icon (180) and favicon (32)
pub const DEFAULT_SIZES: [u32; 3] = [270, 180, 32];

/// The only size generated for temporary images
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 150;

/// Environment variable naming the config file used by the binary
pub const CONFIG_ENV: &str = "SITE_ICON_CONFIG";

/// How a new icon replaces the previous one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CommitStrategy {
    /// Delete the old icon, then store the new one. A failure in between
    /// leaves the site without an icon.
    #[default]
    DeleteThenWrite,
    /// Store the new icon, swap the pointer, then delete the old one.
    WriteThenSwap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IconConfig {
    pub min_size: u32,
    pub page_crop: u32,
    /// Variant sizes generated on top of [`DEFAULT_SIZES`]
    pub extra_sizes: Vec<u32>,
    pub thumbnail_size: u32,
    pub commit_strategy: CommitStrategy,
    /// Public URL prefix of the uploads directory
    pub base_url: String,
    /// Where the catalog database and uploads live
    pub data_dir: PathBuf,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            page_crop: DEFAULT_PAGE_CROP,
            extra_sizes: Vec::new(),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            commit_strategy: CommitStrategy::default(),
            base_url: "/uploads".to_string(),
            data_dir: default_data_dir(),
        }
    }
}

/// Get the default data directory
/// Returns ~/.local/share/site-icon on Linux
pub fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push("site-icon");
    path
}

impl IconConfig {
    /// Load configuration from a TOML file.
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: IconConfig = toml::from_str(&content)
            .map_err(|e| IconError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `$SITE_ICON_CONFIG`, falling back to defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_size == 0 {
            return Err(IconError::Config("min_size must be greater than 0".into()));
        }
        if self.page_crop == 0 {
            return Err(IconError::Config("page_crop must be greater than 0".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(IconError::Config("base_url must not be empty".into()));
        }
        Ok(())
    }

    /// Default sizes plus the configured extras, unfiltered
    pub fn requested_sizes(&self) -> Vec<u32> {
        DEFAULT_SIZES
            .iter()
            .chain(self.extra_sizes.iter())
            .copied()
            .collect()
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("site_icon.db")
    }
}
