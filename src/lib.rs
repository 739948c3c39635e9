//! Site icon management
//!
//! Lets a site administrator upload an image, crop it to a square and
//! publish it as the site's icon at several fixed sizes.
//!
//! The work happens in two requests. The upload step validates the image
//! and writes a downscaled preview; the crop step maps the selection made
//! on that preview back to the original and renders the icon. What the
//! second request needs from the first is kept as a [`WorkflowState`] in
//! the settings store.

pub mod admin;
pub mod config;
pub mod error;
pub mod icon;
pub mod manager;
pub mod markup;
pub mod state;

pub use config::{CommitStrategy, IconConfig};
pub use error::{Dimension, IconError, Result};
pub use icon::codec::{ImageEditor, RasterEditor};
pub use manager::{CropPage, IconObserver, SiteIconManager, UploadSource};
pub use state::data::{AssetId, CropSelection, SiteContext, SiteIcon};
pub use state::library::Library;
pub use state::workflow::{WorkflowState, WorkflowStep};
pub use state::{AssetStore, SettingsStore};
