/// Upload/resize stage
///
/// Accepts the candidate image, checks its type and size, and writes the
/// downscaled preview the crop page works on.

use std::fs;
use std::path::Path;

use super::codec::ImageEditor;
use super::geometry::scale_ratio;
use super::thumbnail::generate_thumbnail;
use super::{sanitize_file_name, unique_path};
use crate::config::IconConfig;
use crate::error::{Dimension, IconError, Result};
use crate::state::data::{Asset, NewAsset, PreviewImage, SiteContext, CONTEXT_TEMP, CONTEXT_UPLOAD};
use crate::state::AssetStore;

/// Copy an uploaded file into the catalog.
///
/// The type is checked before anything is written, so a rejected upload
/// leaves no trace.
pub fn import_upload(
    editor: &dyn ImageEditor,
    store: &dyn AssetStore,
    ctx: &SiteContext,
    upload: &Path,
    original_name: &str,
) -> Result<Asset> {
    if !upload.is_file() {
        return Err(IconError::not_found(format!("Upload does not exist: {}", upload.display())));
    }

    let info = editor.probe(upload)?;

    let file_name = sanitize_file_name(original_name);
    let dest = unique_path(store.upload_dir(), &file_name);
    fs::copy(upload, &dest)?;

    let title = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or(file_name);

    let asset = store.insert_asset(
        ctx,
        &NewAsset {
            title,
            path: dest.to_string_lossy().to_string(),
            mime_type: info.mime_type,
            width: info.width,
            height: info.height,
            parent_id: None,
            context: CONTEXT_UPLOAD.to_string(),
        },
    );

    match asset {
        Ok(asset) => {
            tracing::info!("📥 Accepted upload {} ({}x{})", asset.title, asset.width, asset.height);
            Ok(asset)
        }
        Err(e) => {
            let _ = fs::remove_file(&dest);
            Err(e)
        }
    }
}

/// Reject images below the minimum size. Width is checked first.
pub fn check_min_size(width: u32, height: u32, min_size: u32) -> Result<()> {
    if width < min_size {
        return Err(IconError::TooSmall {
            dimension: Dimension::Width,
            actual: width,
            min: min_size,
        });
    }
    if height < min_size {
        return Err(IconError::TooSmall {
            dimension: Dimension::Height,
            actual: height,
            min: min_size,
        });
    }
    Ok(())
}

/// Generate the crop preview for a source image.
///
/// The preview is stored as a temporary asset with a single thumbnail
/// and nothing else. Returns the preview together with the
/// source/preview scale ratio.
pub fn create_preview(
    editor: &dyn ImageEditor,
    store: &dyn AssetStore,
    ctx: &SiteContext,
    source: &Asset,
    config: &IconConfig,
) -> Result<PreviewImage> {
    let src = Path::new(&source.path);
    let info = editor.probe(src)?;
    check_min_size(info.width, info.height, config.min_size)?;

    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    let dest = unique_path(store.upload_dir(), &format!("{}-temp.{}", stem, info.extension));

    let (width, height) = match editor.resize_within(src, &dest, config.page_crop) {
        Ok(dims) => dims,
        Err(e) => {
            let _ = fs::remove_file(&dest);
            return Err(e);
        }
    };

    let asset = match store.insert_asset(
        ctx,
        &NewAsset {
            title: "Temporary Resized Image for Site Icon".to_string(),
            path: dest.to_string_lossy().to_string(),
            mime_type: info.mime_type,
            width,
            height,
            parent_id: Some(source.id),
            context: CONTEXT_TEMP.to_string(),
        },
    ) {
        Ok(asset) => asset,
        Err(e) => {
            let _ = fs::remove_file(&dest);
            return Err(e);
        }
    };

    if let Err(e) = generate_thumbnail(editor, store, &asset, config.thumbnail_size) {
        store.delete_asset(asset.id)?;
        return Err(e);
    }

    let ratio = scale_ratio(info.width, width);
    tracing::info!(
        "🖼️  Preview {}x{} for {}x{} source (ratio {:.3})",
        width,
        height,
        info.width,
        info.height,
        ratio
    );

    Ok(PreviewImage {
        id: asset.id,
        url: asset.url,
        width,
        height,
        scale_ratio: ratio,
    })
}
