//! Image editor used by both workflow stages.
//!
//! The stages only need a handful of operations on files, so they go
//! through [`ImageEditor`]. [`RasterEditor`] implements it on top of the
//! `image` crate.

use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::path::Path;

use super::geometry::{fit_within, SourceRect};
use crate::error::{IconError, Result};

/// Raster formats accepted as icon sources
pub const ACCEPTED_FORMATS: [ImageFormat; 3] = [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Gif];

/// What a probe learns about an image file without decoding the pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    /// File extension matching the detected format
    pub extension: String,
}

pub trait ImageEditor {
    /// Detect the file type and read the dimensions.
    /// Fails with `UnsupportedType` for anything but JPEG, PNG and GIF.
    fn probe(&self, path: &Path) -> Result<ImageInfo>;

    /// Shrink to fit inside `max` x `max`, keeping aspect ratio and never
    /// enlarging, and save to `dest` in the source format.
    /// Returns the saved dimensions.
    fn resize_within(&self, src: &Path, dest: &Path, max: u32) -> Result<(u32, u32)>;

    /// Cut `rect` out of the source and scale it to exactly
    /// `size` x `size`, saving a PNG. Non-square rectangles are stretched.
    fn crop_to_square(&self, src: &Path, dest: &Path, rect: SourceRect, size: u32) -> Result<()>;

    /// Center-crop a square `size` x `size` variant and save it in the
    /// source format. Returns the saved dimensions.
    fn square_variant(&self, src: &Path, dest: &Path, size: u32) -> Result<(u32, u32)>;
}

/// [`ImageEditor`] backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterEditor;

impl RasterEditor {
    pub fn new() -> Self {
        Self
    }

    fn load(path: &Path) -> Result<DynamicImage> {
        let img = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| IconError::processing(format!("Failed to decode {}: {}", path.display(), e)))?;
        Ok(img)
    }

    fn save(img: &DynamicImage, dest: &Path, format: ImageFormat) -> Result<()> {
        // JPEG has no alpha channel, the GIF encoder wants RGBA
        let result = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()).save_with_format(dest, format),
            ImageFormat::Gif => DynamicImage::ImageRgba8(img.to_rgba8()).save_with_format(dest, format),
            _ => img.save_with_format(dest, format),
        };
        result.map_err(|e| IconError::processing(format!("Failed to save {}: {}", dest.display(), e)))
    }

    fn output_format(path: &Path) -> ImageFormat {
        ImageFormat::from_path(path).unwrap_or(ImageFormat::Png)
    }
}

fn unsupported(path: &Path, format: Option<ImageFormat>) -> IconError {
    let mime = format
        .or_else(|| ImageFormat::from_path(path).ok())
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    IconError::UnsupportedType { mime }
}

impl ImageEditor for RasterEditor {
    fn probe(&self, path: &Path) -> Result<ImageInfo> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = match reader.format() {
            Some(format) if ACCEPTED_FORMATS.contains(&format) => format,
            other => return Err(unsupported(path, other)),
        };

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| IconError::processing(format!("Failed to read {}: {}", path.display(), e)))?;

        Ok(ImageInfo {
            width,
            height,
            mime_type: format.to_mime_type().to_string(),
            extension: format.extensions_str().first().copied().unwrap_or("img").to_string(),
        })
    }

    fn resize_within(&self, src: &Path, dest: &Path, max: u32) -> Result<(u32, u32)> {
        let img = Self::load(src)?;
        let (width, height) = img.dimensions();
        let (target_w, target_h) = fit_within(width, height, max);

        let resized = if (target_w, target_h) == (width, height) {
            img
        } else {
            img.resize_exact(target_w, target_h, FilterType::Lanczos3)
        };

        Self::save(&resized, dest, Self::output_format(dest))?;
        Ok(resized.dimensions())
    }

    fn crop_to_square(&self, src: &Path, dest: &Path, rect: SourceRect, size: u32) -> Result<()> {
        let img = Self::load(src)?;
        let (img_width, img_height) = img.dimensions();

        if rect.x >= img_width || rect.y >= img_height {
            return Err(IconError::processing(format!(
                "Crop position ({}, {}) is outside image bounds ({}x{})",
                rect.x, rect.y, img_width, img_height
            )));
        }

        // Clamp width/height to image bounds
        let width = rect.width.min(img_width - rect.x);
        let height = rect.height.min(img_height - rect.y);
        if width == 0 || height == 0 || size == 0 {
            return Err(IconError::processing("Crop region would have zero dimensions"));
        }

        let cropped = img.crop_imm(rect.x, rect.y, width, height);
        let square = cropped.resize_exact(size, size, FilterType::Lanczos3);
        Self::save(&square, dest, ImageFormat::Png)
    }

    fn square_variant(&self, src: &Path, dest: &Path, size: u32) -> Result<(u32, u32)> {
        if size == 0 {
            return Err(IconError::processing("Variant size must be greater than 0"));
        }
        let img = Self::load(src)?;
        let variant = img.resize_to_fill(size, size, FilterType::Lanczos3);
        Self::save(&variant, dest, Self::output_format(dest))?;
        Ok(variant.dimensions())
    }
}
