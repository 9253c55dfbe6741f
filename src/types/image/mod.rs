/// Image service types
///
/// `common` holds the version-independent shapes the facade exposes; `v1` and
/// `v2` hold the records and SDK parameters of each Glance API version.
pub mod common;
pub mod v1;
pub mod v2;

pub use common::*;
pub use v1::ImageV1;
pub use v2::ImageV2;

use serde::Serialize;
use serde_json::Value;

use crate::backend::BackendVersion;
use crate::error::ServiceError;

/// A record exactly as one backend version returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawImage {
    V1(ImageV1),
    V2(ImageV2),
}

impl RawImage {
    /// Classify an untyped record by the fields it carries: `visibility`
    /// makes it a v2 record, otherwise `is_public` makes it a v1 record.
    pub fn from_json(value: Value) -> Result<Self, ServiceError> {
        let has_field = |field: &str| value.get(field).is_some_and(|v| !v.is_null());

        if has_field("visibility") {
            return Ok(Self::V2(serde_json::from_value(value)?));
        }
        if has_field("is_public") {
            return Ok(Self::V1(serde_json::from_value(value)?));
        }

        Err(ServiceError::UnsupportedRecordShape {
            image_id: value
                .get("id")
                .and_then(|id| id.as_str())
                .unwrap_or("unknown")
                .to_string(),
            version: None,
        })
    }

    pub fn version(&self) -> BackendVersion {
        match self {
            Self::V1(_) => BackendVersion::V1,
            Self::V2(_) => BackendVersion::V2,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::V1(image) => &image.id,
            Self::V2(image) => &image.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::V1(image) => image.name.as_deref(),
            Self::V2(image) => image.name.as_deref(),
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            Self::V1(image) => image.status.as_deref(),
            Self::V2(image) => image.status.as_deref(),
        }
    }

    pub fn normalize(&self) -> Result<UnifiedImage, ServiceError> {
        match self {
            Self::V1(image) => image.normalize(),
            Self::V2(image) => image.normalize(),
        }
    }
}

impl From<ImageV1> for RawImage {
    fn from(image: ImageV1) -> Self {
        Self::V1(image)
    }
}

impl From<ImageV2> for RawImage {
    fn from(image: ImageV2) -> Self {
        Self::V2(image)
    }
}

impl AsImageId for RawImage {
    fn image_id(&self) -> &str {
        self.id()
    }
}
