//! Data models and structures
//!
//! Defines the invocation event, the parsed job it turns into, the page
//! manifest returned to the pipeline, and runtime configuration.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Reserved `image_keys` value selecting single-image (cover) mode.
pub const SINGLE_IMAGE_SENTINEL: &str = "single_image";

/// Raw invocation event as produced by the upstream pipeline step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobRequest {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_keys: Vec<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A validated job. The mode is decided once, here, and never re-inferred.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Single {
        bucket: String,
        id: String,
        key: String,
        extension: String,
    },
    Batch {
        bucket: String,
        id: String,
        image_keys: Vec<String>,
        key: Option<String>,
    },
}

fn required(field: Option<String>, name: &str) -> Result<String> {
    match field {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Validation(format!("{} is required", name))),
    }
}

impl TryFrom<JobRequest> for Job {
    type Error = Error;

    fn try_from(request: JobRequest) -> Result<Self> {
        let bucket = required(request.bucket, "bucket")?;
        let id = required(request.id, "id")?;

        let is_single =
            request.image_keys.len() == 1 && request.image_keys[0] == SINGLE_IMAGE_SENTINEL;

        if is_single {
            Ok(Job::Single {
                bucket,
                id,
                key: required(request.key, "key")?,
                extension: required(request.extension, "extension")?,
            })
        } else {
            Ok(Job::Batch {
                bucket,
                id,
                image_keys: request.image_keys,
                key: request.key,
            })
        }
    }
}

impl Job {
    pub fn id(&self) -> &str {
        match self {
            Job::Single { id, .. } | Job::Batch { id, .. } => id,
        }
    }

    pub fn bucket(&self) -> &str {
        match self {
            Job::Single { bucket, .. } | Job::Batch { bucket, .. } => bucket,
        }
    }
}

/// Destination of the resized cover image.
pub fn single_image_wip_key(id: &str, extension: &str) -> String {
    format!("wip/{}/{}/0.{}", id, SINGLE_IMAGE_SENTINEL, extension)
}

/// Source and destination of a batch page; pages are overwritten in place.
pub fn page_wip_key(id: &str, image_key: &str) -> String {
    format!("wip/{}/{}.png", id, image_key)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageResult {
    pub id: String,
    pub bucket: String,
    pub key: Option<String>,
    pub wip_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobResponse {
    pub pages: Vec<PageResult>,
}

/// Bounding box for contain-fit resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub const PAGE: Bounds = Bounds {
        width: 1000,
        height: 1000,
    };
}

// Configuration
pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub s3_endpoint_url: Option<String>,
    pub s3_force_path_style: bool,
    pub batch_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            s3_endpoint_url: None,
            s3_force_path_style: false,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let s3_endpoint_url = lookup("S3_ENDPOINT_URL").filter(|v| !v.trim().is_empty());

        let s3_force_path_style = match lookup("S3_FORCE_PATH_STYLE") {
            Some(v) => v.trim().parse::<bool>().map_err(|_| {
                Error::Config(format!(
                    "S3_FORCE_PATH_STYLE must be true or false, got '{}'",
                    v
                ))
            })?,
            None => false,
        };

        let batch_concurrency = match lookup("RESIZE_BATCH_CONCURRENCY") {
            Some(v) => match v.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(Error::Config(format!(
                        "RESIZE_BATCH_CONCURRENCY must be a positive integer, got '{}'",
                        v
                    )))
                }
            },
            None => DEFAULT_BATCH_CONCURRENCY,
        };

        Ok(Self {
            s3_endpoint_url,
            s3_force_path_style,
            batch_concurrency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(json: &str) -> JobRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_single_image_sentinel() {
        let job = Job::try_from(request(
            r#"{"bucket":"b","id":"doc1","image_keys":["single_image"],"key":"src/a.jpg","extension":"png"}"#,
        ))
        .unwrap();

        assert_eq!(
            job,
            Job::Single {
                bucket: "b".to_string(),
                id: "doc1".to_string(),
                key: "src/a.jpg".to_string(),
                extension: "png".to_string(),
            }
        );
    }

    #[test]
    fn test_sentinel_requires_exact_singleton() {
        let job = Job::try_from(request(
            r#"{"bucket":"b","id":"d","image_keys":["single_image","p1"]}"#,
        ))
        .unwrap();
        assert!(matches!(job, Job::Batch { ref image_keys, .. } if image_keys.len() == 2));

        let job = Job::try_from(request(r#"{"bucket":"b","id":"d","image_keys":["p0"]}"#)).unwrap();
        assert!(matches!(job, Job::Batch { .. }));

        let job =
            Job::try_from(request(r#"{"bucket":"b","id":"d","image_keys":["Single_Image"]}"#)).unwrap();
        assert!(matches!(job, Job::Batch { .. }));
    }

    #[test]
    fn test_missing_image_keys_is_empty_batch() {
        let job = Job::try_from(request(r#"{"bucket":"b","id":"d"}"#)).unwrap();
        assert_eq!(job.id(), "d");
        assert_eq!(job.bucket(), "b");
        assert!(matches!(job, Job::Batch { ref image_keys, .. } if image_keys.is_empty()));

        let job = Job::try_from(request(r#"{"bucket":"b","id":"d","image_keys":null}"#)).unwrap();
        assert!(matches!(job, Job::Batch { ref image_keys, .. } if image_keys.is_empty()));
    }

    #[test]
    fn test_missing_bucket_or_id() {
        let err = Job::try_from(request(r#"{"id":"d","image_keys":["p0"]}"#)).unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("bucket")));

        let err = Job::try_from(request(r#"{"bucket":"b","image_keys":["p0"]}"#)).unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("id")));

        let err = Job::try_from(request(r#"{"bucket":"","id":"d"}"#)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_single_image_requires_key_and_extension() {
        let err = Job::try_from(request(
            r#"{"bucket":"b","id":"d","image_keys":["single_image"],"extension":"png"}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("key")));

        let err = Job::try_from(request(
            r#"{"bucket":"b","id":"d","image_keys":["single_image"],"key":"a.jpg"}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("extension")));
    }

    #[test]
    fn test_wip_keys() {
        assert_eq!(
            single_image_wip_key("doc1", "png"),
            "wip/doc1/single_image/0.png"
        );
        assert_eq!(page_wip_key("doc2", "p0"), "wip/doc2/p0.png");
    }

    #[test]
    fn test_page_result_serialization() {
        let response = JobResponse {
            pages: vec![PageResult {
                id: "d".to_string(),
                bucket: "b".to_string(),
                key: None,
                wip_key: "wip/d/0.png".to_string(),
            }],
        };

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"pages":[{"id":"d","bucket":"b","key":null,"wip_key":"wip/d/0.png"}]}"#
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.s3_endpoint_url, None);
        assert!(!config.s3_force_path_style);
        assert_eq!(config.batch_concurrency, DEFAULT_BATCH_CONCURRENCY);
    }

    #[test]
    fn test_config_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("S3_ENDPOINT_URL", "http://localhost:4566"),
            ("S3_FORCE_PATH_STYLE", "true"),
            ("RESIZE_BATCH_CONCURRENCY", "3"),
        ]);
        let config = Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(
            config.s3_endpoint_url.as_deref(),
            Some("http://localhost:4566")
        );
        assert!(config.s3_force_path_style);
        assert_eq!(config.batch_concurrency, 3);
    }

    #[test]
    fn test_config_rejects_zero_concurrency() {
        let err = Config::from_lookup(|name| {
            (name == "RESIZE_BATCH_CONCURRENCY").then(|| "0".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
