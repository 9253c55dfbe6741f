/// Image types shared by every backend version
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::ImageDefaults;

/// Version-independent view of an image.
///
/// Built fresh from a raw backend record on every read and never mutated
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnifiedImage {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub visibility: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// The `is_public` attribute of a v1 image.
///
/// Glance v1 reports a boolean, but older deployments and some SDK shims hand
/// back a visibility label in the same slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PublicFlag {
    Flag(bool),
    Label(String),
}

impl PublicFlag {
    /// Visibility label for this flag. Labels are returned verbatim.
    pub fn to_visibility(&self) -> String {
        match self {
            Self::Flag(true) => "public".to_string(),
            Self::Flag(false) => "private".to_string(),
            Self::Label(label) => label.clone(),
        }
    }
}

impl From<bool> for PublicFlag {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Arguments of `create_image`, handed to the backend untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateImageRequest {
    pub image_name: Option<String>,
    pub container_format: Option<String>,
    pub image_location: Option<String>,
    pub disk_format: Option<String>,
    pub visibility: Option<String>,
    pub min_disk: Option<u64>,
    pub min_ram: Option<u64>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl CreateImageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a request from configured defaults. Fields can still be
    /// overridden with the builder methods.
    pub fn from_defaults(defaults: &ImageDefaults) -> Self {
        Self {
            image_name: None,
            container_format: defaults.container_format.clone(),
            image_location: defaults.image_location.clone(),
            disk_format: defaults.disk_format.clone(),
            visibility: defaults.visibility.clone(),
            min_disk: defaults.min_disk,
            min_ram: defaults.min_ram,
            properties: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.image_name = Some(name.into());
        self
    }

    pub fn with_container_format(mut self, format: impl Into<String>) -> Self {
        self.container_format = Some(format.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.image_location = Some(location.into());
        self
    }

    pub fn with_disk_format(mut self, format: impl Into<String>) -> Self {
        self.disk_format = Some(format.into());
        self
    }

    pub fn with_visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = Some(visibility.into());
        self
    }

    pub fn with_min_disk(mut self, min_disk: u64) -> Self {
        self.min_disk = Some(min_disk);
        self
    }

    pub fn with_min_ram(mut self, min_ram: u64) -> Self {
        self.min_ram = Some(min_ram);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Filters accepted by `list_images`. `None` means "do not filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListImagesFilter {
    pub status: Option<String>,
    pub visibility: Option<String>,
    pub owner: Option<String>,
}

impl ListImagesFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = Some(visibility.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// Arguments of `update_image`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateImageRequest {
    pub image_name: Option<String>,
    pub min_disk: Option<u64>,
    pub min_ram: Option<u64>,
    #[serde(default)]
    pub remove_props: Vec<String>,
}

/// Anything that can stand in for an image id: a plain id or a record
/// exposing one.
pub trait AsImageId {
    fn image_id(&self) -> &str;
}

impl AsImageId for str {
    fn image_id(&self) -> &str {
        self
    }
}

impl AsImageId for String {
    fn image_id(&self) -> &str {
        self.as_str()
    }
}

impl AsImageId for UnifiedImage {
    fn image_id(&self) -> &str {
        &self.id
    }
}

impl<T: AsImageId + ?Sized> AsImageId for &T {
    fn image_id(&self) -> &str {
        (**self).image_id()
    }
}

/// Timestamps as Glance reports them: RFC 3339 with an offset, or the bare
/// `2014-02-24T15:11:31.000000` form older v1 endpoints send, read as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(stamp) => Ok(stamp.with_timezone(&Utc)),
            Err(_) => NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT).map(|naive| naive.and_utc()),
        }
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
