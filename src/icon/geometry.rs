//! Coordinate math between the crop preview and the source image.

use serde::Serialize;

use crate::state::data::CropSelection;

/// Crop rectangle in source image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Source-to-preview linear scale factor
pub fn scale_ratio(source_width: u32, preview_width: u32) -> f64 {
    if preview_width == 0 {
        return 1.0;
    }
    source_width as f64 / preview_width as f64
}

fn scale_floor(value: u32, ratio: f64) -> u32 {
    (value as f64 * ratio).floor() as u32
}

/// Map a selection made on the preview back onto the source image.
/// Every component is multiplied by `ratio` and floored, never rounded.
pub fn rescale_selection(selection: &CropSelection, ratio: f64) -> SourceRect {
    SourceRect {
        x: scale_floor(selection.x, ratio),
        y: scale_floor(selection.y, ratio),
        width: scale_floor(selection.width, ratio),
        height: scale_floor(selection.height, ratio),
    }
}

/// Initial placement of the crop box in the preview, plus the smallest
/// box that still yields a full-size icon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InitialCropBox {
    pub init_x: u32,
    pub init_y: u32,
    pub init_size: u32,
    /// min_size / scale ratio, in preview pixels
    pub min_size: f64,
}

/// Center a square box on the preview.
///
/// Landscape previews get a height-sized box centered horizontally,
/// portrait previews a width-sized box centered vertically, and square
/// previews a box covering everything.
pub fn initial_crop_box(
    preview_width: u32,
    preview_height: u32,
    page_crop: u32,
    min_size: u32,
    ratio: f64,
) -> InitialCropBox {
    let (init_x, init_y, init_size) = if preview_width > preview_height {
        (page_crop.saturating_sub(preview_height) / 2, 0, preview_height)
    } else if preview_height > preview_width {
        (0, page_crop.saturating_sub(preview_width) / 2, preview_width)
    } else {
        (0, 0, preview_height)
    };

    let ratio = if ratio > 0.0 { ratio } else { 1.0 };
    InitialCropBox {
        init_x,
        init_y,
        init_size,
        min_size: min_size as f64 / ratio,
    }
}

/// Size of `width` x `height` after fitting it inside a `max` x `max`
/// box, keeping the aspect ratio and never enlarging.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }
    if width >= height {
        let h = (height as u64 * max as u64 / width as u64).max(1) as u32;
        (max, h)
    } else {
        let w = (width as u64 * max as u64 / height as u64).max(1) as u32;
        (w, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_floors_each_component() {
        let sel = CropSelection::new(10, 4, 100, 100);
        assert_eq!(
            rescale_selection(&sel, 2.5),
            SourceRect { x: 25, y: 10, width: 250, height: 250 }
        );
    }

    #[test]
    fn test_rescale_truncates_instead_of_rounding() {
        // 3 * 1.9 = 5.7, 7 * 1.9 = 13.3
        let sel = CropSelection::new(3, 7, 3, 7);
        let rect = rescale_selection(&sel, 1.9);
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (5, 13, 5, 13));
    }

    #[test]
    fn test_rescale_matches_floor_for_many_ratios() {
        for ratio in [1.0, 1.25, 1.5, 2.0, 2.5, 3.3333, 7.81] {
            for (x, y, w, h) in [(0, 0, 1, 1), (1, 2, 3, 4), (17, 33, 120, 121), (255, 0, 256, 511)] {
                let rect = rescale_selection(&CropSelection::new(x, y, w, h), ratio);
                assert_eq!(rect.x, (x as f64 * ratio).floor() as u32);
                assert_eq!(rect.y, (y as f64 * ratio).floor() as u32);
                assert_eq!(rect.width, (w as f64 * ratio).floor() as u32);
                assert_eq!(rect.height, (h as f64 * ratio).floor() as u32);
            }
        }
    }

    #[test]
    fn test_full_preview_maps_to_full_source() {
        let ratio = scale_ratio(1024, 512);
        assert_eq!(ratio, 2.0);
        let rect = rescale_selection(&CropSelection::new(0, 0, 512, 512), ratio);
        assert_eq!(rect, SourceRect { x: 0, y: 0, width: 1024, height: 1024 });
    }

    #[test]
    fn test_landscape_box_is_centered_horizontally() {
        let hint = initial_crop_box(800, 600, 800, 512, 1.0);
        assert_eq!(hint.init_size, 600);
        assert_eq!(hint.init_x, (800 - 600) / 2);
        assert_eq!(hint.init_y, 0);

        // a page crop smaller than the box never yields a negative offset
        let hint = initial_crop_box(800, 600, 512, 512, 1.0);
        assert_eq!((hint.init_x, hint.init_size), (0, 600));

        let hint = initial_crop_box(512, 384, 512, 512, 2.0);
        assert_eq!((hint.init_x, hint.init_y, hint.init_size), (64, 0, 384));
        assert_eq!(hint.min_size, 256.0);
    }

    #[test]
    fn test_portrait_box_is_centered_vertically() {
        let hint = initial_crop_box(384, 512, 512, 512, 2.0);
        assert_eq!((hint.init_x, hint.init_y, hint.init_size), (0, 64, 384));
    }

    #[test]
    fn test_square_box_covers_preview() {
        let hint = initial_crop_box(512, 512, 512, 512, 2.0);
        assert_eq!((hint.init_x, hint.init_y, hint.init_size), (0, 0, 512));
    }

    #[test]
    fn test_fit_within_never_upscales() {
        assert_eq!(fit_within(1024, 1024, 512), (512, 512));
        assert_eq!(fit_within(2000, 1000, 512), (512, 256));
        assert_eq!(fit_within(1000, 2000, 512), (256, 512));
        assert_eq!(fit_within(400, 300, 512), (400, 300));
    }
}
