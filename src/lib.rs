//! Page image resizer for the document-processing pipeline
//!
//! Fetches page images from S3, scales them to fit within 1000×1000 without
//! cropping or upscaling, and writes them back under the job's `wip/` prefix.

pub mod error;
pub mod handler;
pub mod image;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
