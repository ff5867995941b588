//! Image decoding, contain-fit resizing and re-encoding
//!
//! Page images are scaled down to fit a bounding box (never up, never
//! cropped) and re-encoded in the requested output format.

pub mod mock;
pub mod processor;

pub use mock::MockImageProcessor;
pub use processor::{fit_within, ImageProcessor};

use crate::models::Bounds;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageService: Send + Sync {
    /// Fit `image_data` inside `bounds` and encode it as `extension` (e.g. `png`, `jpg`).
    async fn resize_contain(
        &self,
        image_data: Vec<u8>,
        bounds: Bounds,
        extension: &str,
    ) -> Result<Vec<u8>>;
}
