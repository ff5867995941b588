use super::ImageService;
use crate::models::Bounds;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Pass-through codec: returns the input bytes untouched, or fails on demand.
#[derive(Clone, Default)]
pub struct MockImageProcessor {
    process_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
    extensions: Arc<Mutex<Vec<String>>>,
}

impl MockImageProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_process_count(&self) -> usize {
        *self.process_count.lock().unwrap()
    }

    /// Output extensions requested so far, in call order.
    pub fn get_extensions(&self) -> Vec<String> {
        self.extensions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageService for MockImageProcessor {
    async fn resize_contain(
        &self,
        image_data: Vec<u8>,
        _bounds: Bounds,
        extension: &str,
    ) -> Result<Vec<u8>> {
        *self.process_count.lock().unwrap() += 1;
        self.extensions.lock().unwrap().push(extension.to_string());

        if *self.should_fail.lock().unwrap() {
            return Err(Error::Codec(image::ImageError::IoError(
                std::io::Error::other("Mock failure"),
            )));
        }

        Ok(image_data)
    }
}
