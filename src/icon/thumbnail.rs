use std::fs;
use std::path::{Path, PathBuf};

use super::codec::ImageEditor;
use super::sizes::temporary_sizes;
use crate::error::Result;
use crate::state::data::{Asset, AssetVariant, NewVariant};
use crate::state::AssetStore;

/// Path of the `size` x `size` variant next to `path`
/// (`icon.png` -> `icon-32x32.png`)
pub fn variant_path(path: &Path, size: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{}-{}x{}.{}", stem, size, size, ext.to_string_lossy()),
        None => format!("{}-{}x{}", stem, size, size),
    };
    path.with_file_name(name)
}

/// Generate one square variant per size and register it on the asset.
///
/// Stops at the first failure. Variants registered before the failure
/// stay attached to the asset, so deleting the asset cleans them up.
pub fn generate_sizes(
    editor: &dyn ImageEditor,
    store: &dyn AssetStore,
    asset: &Asset,
    sizes: &[u32],
) -> Result<Vec<AssetVariant>> {
    let src = Path::new(&asset.path);
    let mut variants = Vec::with_capacity(sizes.len());

    for &size in sizes {
        let dest = variant_path(src, size);
        let (width, height) = match editor.square_variant(src, &dest, size) {
            Ok(dims) => dims,
            Err(e) => {
                let _ = fs::remove_file(&dest);
                return Err(e);
            }
        };

        let variant = store.add_variant(
            asset.id,
            &NewVariant {
                size,
                path: dest.to_string_lossy().to_string(),
                width,
                height,
            },
        )?;
        tracing::debug!("   → {}px variant: {}", size, variant.path);
        variants.push(variant);
    }

    Ok(variants)
}

/// Generate the single thumbnail a temporary image is allowed to have
pub fn generate_thumbnail(
    editor: &dyn ImageEditor,
    store: &dyn AssetStore,
    asset: &Asset,
    thumbnail_size: u32,
) -> Result<Vec<AssetVariant>> {
    let sizes = temporary_sizes(thumbnail_size, asset.width, asset.height);
    generate_sizes(editor, store, asset, &sizes)
}
