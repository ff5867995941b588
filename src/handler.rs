//! Resize handler: turns one pipeline event into resized wip images.

use crate::image::{ImageProcessor, ImageService};
use crate::models::{
    page_wip_key, single_image_wip_key, Bounds, Config, Job, JobRequest, JobResponse, PageResult,
};
use crate::storage::{ObjectStore, S3ObjectStore};
use crate::{Error, Result};
use futures::stream::{self, StreamExt};
use tracing::{error, info};

/// Batch pages are always stored as PNG, whatever the request's extension.
const BATCH_EXTENSION: &str = "png";

/// Fetches, resizes and stores the images described by a [`JobRequest`].
pub struct ResizeHandler {
    store: Box<dyn ObjectStore>,
    image: Box<dyn ImageService>,
    bounds: Bounds,
    batch_concurrency: usize,
}

/// Injectable service bundle used to construct [`ResizeHandler`] in tests/harnesses.
pub struct HandlerServices {
    pub store: Box<dyn ObjectStore>,
    pub image: Box<dyn ImageService>,
}

impl ResizeHandler {
    /// Build a handler from concrete service dependencies.
    pub fn with_services(services: HandlerServices, batch_concurrency: usize) -> Self {
        Self {
            store: services.store,
            image: services.image,
            bounds: Bounds::PAGE,
            batch_concurrency: batch_concurrency.max(1),
        }
    }

    /// Construct a handler backed by S3 and the `image` crate.
    pub async fn new(config: &Config) -> Result<Self> {
        let store = S3ObjectStore::new(config).await?;
        info!(
            "Batch concurrency: {}, endpoint: {}",
            config.batch_concurrency,
            config.s3_endpoint_url.as_deref().unwrap_or("default")
        );

        Ok(Self::with_services(
            HandlerServices {
                store: Box::new(store),
                image: Box::new(ImageProcessor::new()),
            },
            config.batch_concurrency,
        ))
    }

    /// Process one invocation event.
    ///
    /// Request validation errors are returned as [`Error::Validation`] before
    /// any object is read. Every other failure comes back as
    /// [`Error::Processing`] wrapping the first underlying cause.
    pub async fn process(&self, request: JobRequest) -> Result<JobResponse> {
        let job = Job::try_from(request)?;
        info!("Resizing job {} in bucket {}", job.id(), job.bucket());

        match job {
            Job::Single {
                bucket,
                id,
                key,
                extension,
            } => {
                info!("Processing single image {}", key);
                self.process_single(bucket, id, key, extension).await
            }
            Job::Batch {
                bucket,
                id,
                image_keys,
                key,
            } => {
                info!("Processing {} page(s)", image_keys.len());
                self.process_batch(bucket, id, image_keys, key).await
            }
        }
    }

    async fn process_single(
        &self,
        bucket: String,
        id: String,
        key: String,
        extension: String,
    ) -> Result<JobResponse> {
        let wip_key = single_image_wip_key(&id, &extension);
        let content_type = format!("image/{}", extension);

        if let Err(e) = self
            .resize_object(&bucket, &key, &wip_key, &extension, &content_type)
            .await
        {
            error!("Error: {}", e);
            return Err(Error::processing(e));
        }

        info!("Resized image uploaded successfully.");
        Ok(JobResponse {
            pages: vec![PageResult {
                id,
                bucket,
                key: Some(key),
                wip_key,
            }],
        })
    }

    async fn process_batch(
        &self,
        bucket: String,
        id: String,
        image_keys: Vec<String>,
        key: Option<String>,
    ) -> Result<JobResponse> {
        let bucket_ref = bucket.as_str();
        let id_ref = id.as_str();

        let results: Vec<Result<String>> = stream::iter(image_keys.iter())
            .map(|image_key| {
                let wip_key = page_wip_key(id_ref, image_key);
                async move {
                    self.resize_object(
                        bucket_ref,
                        &wip_key,
                        &wip_key,
                        BATCH_EXTENSION,
                        "image/png",
                    )
                    .await?;
                    Ok::<_, Error>(wip_key)
                }
            })
            .buffered(self.batch_concurrency)
            .collect()
            .await;

        let mut pages = Vec::with_capacity(results.len());
        let mut first_failure = None;
        for (image_key, result) in image_keys.iter().zip(results) {
            match result {
                Ok(wip_key) => pages.push(PageResult {
                    id: id.clone(),
                    bucket: bucket.clone(),
                    key: key.clone(),
                    wip_key,
                }),
                Err(e) => {
                    error!("Error resizing page {}: {}", image_key, e);
                    if first_failure.is_none() {
                        first_failure = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_failure {
            return Err(Error::processing(e));
        }

        info!("Resized images uploaded successfully.");
        Ok(JobResponse { pages })
    }

    async fn resize_object(
        &self,
        bucket: &str,
        src_key: &str,
        dst_key: &str,
        extension: &str,
        content_type: &str,
    ) -> Result<()> {
        let original = self.store.get_object(bucket, src_key).await?;
        let resized = self
            .image
            .resize_contain(original, self.bounds, extension)
            .await?;
        self.store
            .put_object(bucket, dst_key, resized, content_type)
            .await?;

        info!("Stored s3://{}/{}", bucket, dst_key);
        Ok(())
    }
}
