/// Glance v1 records and SDK parameter types
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::common::{timestamp, PublicFlag, UnifiedImage};
use crate::backend::BackendVersion;
use crate::error::ServiceError;

/// Image record as returned by Glance v1
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageV1 {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    /// Absent only on malformed records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<PublicFlag>,

    #[serde(default)]
    pub container_format: Option<String>,

    #[serde(default)]
    pub disk_format: Option<String>,

    #[serde(default)]
    pub min_disk: u64,

    #[serde(default)]
    pub min_ram: u64,

    #[serde(default)]
    pub size: Option<u64>,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl ImageV1 {
    pub fn normalize(&self) -> Result<UnifiedImage, ServiceError> {
        let visibility = self
            .is_public
            .as_ref()
            .map(PublicFlag::to_visibility)
            .ok_or_else(|| ServiceError::UnsupportedRecordShape {
                image_id: self.id.clone(),
                version: Some(BackendVersion::V1),
            })?;

        Ok(UnifiedImage {
            id: self.id.clone(),
            name: self.name.clone(),
            visibility,
            status: self.status.clone(),
        })
    }
}

/// `images.create` parameters for Glance v1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct V1CreateParams {
    pub name: Option<String>,
    pub container_format: Option<String>,
    pub disk_format: Option<String>,
    pub is_public: bool,
    pub min_disk: Option<u64>,
    pub min_ram: Option<u64>,
    /// v1 imports the image data server-side from this location
    pub copy_from: Option<String>,
    pub properties: HashMap<String, String>,
}

/// `images.list` filters for Glance v1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct V1ListFilters {
    pub status: Option<String>,
    pub is_public: Option<bool>,
    pub owner: Option<String>,
}

/// `images.update` parameters for Glance v1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct V1UpdateParams {
    pub name: Option<String>,
    pub is_public: Option<bool>,
    pub min_disk: Option<u64>,
    pub min_ram: Option<u64>,
}
