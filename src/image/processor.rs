use super::ImageService;
use crate::models::Bounds;
use crate::{Error, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Largest size within `bounds` that keeps the aspect ratio of `width`×`height`.
///
/// Images that already fit are returned at their original size.
pub fn fit_within(width: u32, height: u32, bounds: Bounds) -> (u32, u32) {
    if width <= bounds.width && height <= bounds.height {
        return (width, height);
    }

    let ratio = f64::min(
        bounds.width as f64 / width as f64,
        bounds.height as f64 / height as f64,
    );
    let scaled = |side: u32, max: u32| ((side as f64 * ratio).round() as u32).clamp(1, max);

    (scaled(width, bounds.width), scaled(height, bounds.height))
}

fn output_format(extension: &str) -> Result<ImageFormat> {
    ImageFormat::from_extension(extension)
        .filter(|format| format.writing_enabled())
        .ok_or_else(|| Error::UnsupportedFormat(extension.to_string()))
}

#[derive(Debug, Clone, Default)]
pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    fn resize_contain_sync(image_data: &[u8], bounds: Bounds, format: ImageFormat) -> Result<Vec<u8>> {
        let img = image::load_from_memory(image_data)?;
        let (width, height) = fit_within(img.width(), img.height(), bounds);

        let resized = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            debug!(
                "Resizing {}x{} -> {}x{}",
                img.width(),
                img.height(),
                width,
                height
            );
            img.resize_exact(width, height, FilterType::Lanczos3)
        };

        let encodable = match format {
            // No alpha channel in JPEG
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
            ImageFormat::WebP | ImageFormat::Gif => match resized {
                DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => resized,
                other => DynamicImage::ImageRgba8(other.to_rgba8()),
            },
            _ => resized,
        };

        let mut bytes = Vec::new();
        encodable.write_to(&mut Cursor::new(&mut bytes), format)?;
        Ok(bytes)
    }
}

#[async_trait]
impl ImageService for ImageProcessor {
    async fn resize_contain(
        &self,
        image_data: Vec<u8>,
        bounds: Bounds,
        extension: &str,
    ) -> Result<Vec<u8>> {
        let format = output_format(extension)?;

        tokio::task::spawn_blocking(move || Self::resize_contain_sync(&image_data, bounds, format))
            .await
            .map_err(|e| Error::Join(e.to_string()))?
    }
}
