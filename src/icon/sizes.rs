//! Which square variants get generated for an icon.

use std::collections::BTreeSet;

/// Variant sizes for a master of `min_size` pixels.
///
/// Sizes at or above the master size are dropped (the master already
/// covers them), duplicates and zero are removed, and the result is
/// ordered largest first.
pub fn variant_sizes(requested: &[u32], min_size: u32) -> Vec<u32> {
    let unique: BTreeSet<u32> = requested
        .iter()
        .copied()
        .filter(|&size| size > 0 && size < min_size)
        .collect();
    unique.into_iter().rev().collect()
}

/// Sizes generated for a temporary image: just the thumbnail, and only
/// when it is actually smaller than the image.
pub fn temporary_sizes(thumbnail_size: u32, width: u32, height: u32) -> Vec<u32> {
    if thumbnail_size > 0 && thumbnail_size < width.max(height) {
        vec![thumbnail_size]
    } else {
        Vec::new()
    }
}
