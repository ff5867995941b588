//! Error handling and custom error types
//!
//! Provides unified error handling across the resizer using thiserror. Per-image
//! failures keep their type; the handler wraps them in [`Error::Processing`]
//! before handing them back to the pipeline.

use lambda_runtime::Diagnostic;
use thiserror::Error;

/// Message presented to the caller for any failed fetch/resize/store.
pub const PROCESSING_FAILED: &str = "Image resizing and uploading failed.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Failed to fetch s3://{bucket}/{key}: {reason}")]
    Fetch {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Failed to store s3://{bucket}/{key}: {reason}")]
    Store {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Image processing task join error: {0}")]
    Join(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{}", PROCESSING_FAILED)]
    Processing(#[source] Box<Error>),
}

impl Error {
    pub(crate) fn processing(cause: Error) -> Self {
        Error::Processing(Box::new(cause))
    }

    /// The typed failure behind a [`Error::Processing`], or `self` for any other variant.
    pub fn cause_of_failure(&self) -> &Error {
        match self {
            Error::Processing(cause) => cause,
            other => other,
        }
    }

    /// Stable error type name reported to the invoking pipeline.
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::Validation(_) => "ValidationError",
            Error::Fetch { .. } => "FetchError",
            Error::Store { .. } => "StoreError",
            Error::Codec(_) | Error::UnsupportedFormat(_) | Error::Join(_) => "CodecError",
            Error::Config(_) => "ConfigError",
            Error::Processing(_) => "ProcessingError",
        }
    }
}

impl From<Error> for Diagnostic {
    fn from(error: Error) -> Self {
        Diagnostic {
            error_type: error.error_type().to_string(),
            error_message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
