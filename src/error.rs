use thiserror::Error;

use crate::backend::BackendVersion;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("No applicable image backend for reported version '{reported_version}'. Supported: {supported_versions:?}")]
    NoApplicableImplementation {
        reported_version: String,
        supported_versions: Vec<String>,
    },

    #[error("Image '{image_id}' carries neither 'visibility' nor 'is_public'")]
    UnsupportedRecordShape {
        image_id: String,
        version: Option<BackendVersion>,
    },

    #[error("Invalid image record: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by the cloud SDK behind the facade.
///
/// The facade never translates these; they surface through
/// [`ServiceError::Backend`] exactly as the backend produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Image API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Improper visibility value: {visibility} in {supported:?}")]
    InvalidVisibility {
        visibility: String,
        supported: Vec<String>,
    },

    #[error("Operation '{operation}' is not supported by Glance v{version}")]
    Unsupported { operation: String, version: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Environment variable error: {0}")]
    EnvVar(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
