/// Crop/commit stage image work
///
/// Produces the published icon:
/// - The square master at the minimum size (PNG)
/// - One center-cropped variant per configured size below the master

use std::fs;
use std::path::Path;

use super::codec::ImageEditor;
use super::geometry::rescale_selection;
use super::sizes::variant_sizes;
use super::thumbnail::generate_sizes;
use super::unique_path;
use crate::config::IconConfig;
use crate::error::Result;
use crate::state::data::{Asset, CropSelection, NewAsset, SiteContext, SiteIcon, CONTEXT_SITE_ICON};
use crate::state::workflow::WorkflowState;
use crate::state::AssetStore;

/// Master file name built from the commit time, e.g. `6530f1a2-site-icon.png`
pub fn master_file_name(timestamp: i64) -> String {
    format!("{:x}-site-icon.png", timestamp.max(0))
}

/// Crop the workflow's source image to the square master and store it.
/// No variants are generated and the current-icon pointer is untouched.
///
/// On failure nothing new is left in the catalog or on disk.
pub fn render_master(
    editor: &dyn ImageEditor,
    store: &dyn AssetStore,
    ctx: &SiteContext,
    state: &WorkflowState,
    selection: &CropSelection,
    config: &IconConfig,
) -> Result<Asset> {
    let rect = rescale_selection(selection, state.scale_ratio());
    tracing::debug!(
        "Crop ({}, {}, {}x{}) on preview -> ({}, {}, {}x{}) on source",
        selection.x,
        selection.y,
        selection.width,
        selection.height,
        rect.x,
        rect.y,
        rect.width,
        rect.height
    );

    let src = Path::new(&state.source.path);
    let dest = unique_path(
        store.upload_dir(),
        &master_file_name(chrono::Utc::now().timestamp()),
    );

    if let Err(e) = editor.crop_to_square(src, &dest, rect, config.min_size) {
        let _ = fs::remove_file(&dest);
        return Err(e);
    }

    let master = store.insert_asset(
        ctx,
        &NewAsset {
            title: "Site Icon".to_string(),
            path: dest.to_string_lossy().to_string(),
            mime_type: "image/png".to_string(),
            width: config.min_size,
            height: config.min_size,
            parent_id: None,
            context: CONTEXT_SITE_ICON.to_string(),
        },
    );
    if master.is_err() {
        let _ = fs::remove_file(&dest);
    }
    master
}

/// Generate every configured variant below the master size.
///
/// On failure the master is deleted along with whatever variants were
/// already written.
pub fn render_variants(
    editor: &dyn ImageEditor,
    store: &dyn AssetStore,
    master: Asset,
    config: &IconConfig,
) -> Result<SiteIcon> {
    let sizes = variant_sizes(&config.requested_sizes(), config.min_size);
    let variants = match generate_sizes(editor, store, &master, &sizes) {
        Ok(variants) => variants,
        Err(e) => {
            if let Err(cleanup) = store.delete_asset(master.id) {
                tracing::warn!("⚠️  Could not delete unfinished icon {}: {}", master.id, cleanup);
            }
            return Err(e);
        }
    };

    tracing::info!(
        "✅ Rendered {}px site icon with {} variants: {}",
        config.min_size,
        variants.len(),
        master.path
    );

    Ok(SiteIcon { master, variants })
}

/// Master and variants in one go
pub fn render_icon(
    editor: &dyn ImageEditor,
    store: &dyn AssetStore,
    ctx: &SiteContext,
    state: &WorkflowState,
    selection: &CropSelection,
    config: &IconConfig,
) -> Result<SiteIcon> {
    let master = render_master(editor, store, ctx, state, selection, config)?;
    render_variants(editor, store, master, config)
}
