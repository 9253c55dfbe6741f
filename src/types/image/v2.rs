/// Glance v2 records and SDK parameter types
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::common::{timestamp, UnifiedImage};
use crate::backend::BackendVersion;
use crate::error::ServiceError;

/// Image record as returned by Glance v2
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageV2 {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,

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

    /// v2 flattens custom properties into the image body
    #[serde(flatten)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl ImageV2 {
    pub fn normalize(&self) -> Result<UnifiedImage, ServiceError> {
        let visibility =
            self.visibility
                .clone()
                .ok_or_else(|| ServiceError::UnsupportedRecordShape {
                    image_id: self.id.clone(),
                    version: Some(BackendVersion::V2),
                })?;

        Ok(UnifiedImage {
            id: self.id.clone(),
            name: self.name.clone(),
            visibility,
            status: self.status.clone(),
        })
    }
}

/// `images.create` parameters for Glance v2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct V2CreateParams {
    pub name: Option<String>,
    pub container_format: Option<String>,
    pub disk_format: Option<String>,
    pub visibility: Option<String>,
    pub min_disk: Option<u64>,
    pub min_ram: Option<u64>,
    pub properties: HashMap<String, String>,
}

/// `images.list` filters for Glance v2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct V2ListFilters {
    pub status: Option<String>,
    pub visibility: Option<String>,
    pub owner: Option<String>,
}

/// `images.update` parameters for Glance v2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct V2UpdateParams {
    pub name: Option<String>,
    pub visibility: Option<String>,
    pub min_disk: Option<u64>,
    pub min_ram: Option<u64>,
    pub remove_props: Vec<String>,
}
