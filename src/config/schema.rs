use serde::{Deserialize, Serialize};

use crate::backend::BackendVersion;
use crate::types::image::ListImagesFilter;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub defaults: ImageDefaults,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which backend versions discovery may select.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_enabled_versions")]
    pub enabled_versions: Vec<BackendVersion>,
}

impl DiscoveryConfig {
    pub fn is_enabled(&self, version: BackendVersion) -> bool {
        self.enabled_versions.contains(&version)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled_versions: default_enabled_versions(),
        }
    }
}

/// Values used to seed image requests. The service never applies these on
/// its own; callers opt in through `CreateImageRequest::from_defaults`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageDefaults {
    #[serde(default = "default_container_format")]
    pub container_format: Option<String>,
    #[serde(default = "default_disk_format")]
    pub disk_format: Option<String>,
    #[serde(default = "default_visibility")]
    pub visibility: Option<String>,
    #[serde(default = "default_min_size")]
    pub min_disk: Option<u64>,
    #[serde(default = "default_min_size")]
    pub min_ram: Option<u64>,
    #[serde(default)]
    pub image_location: Option<String>,
    #[serde(default = "default_list_status")]
    pub list_status: Option<String>,
}

impl ImageDefaults {
    /// Filter listing images in the configured status
    pub fn list_filter(&self) -> ListImagesFilter {
        ListImagesFilter {
            status: self.list_status.clone(),
            ..Default::default()
        }
    }
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            container_format: default_container_format(),
            disk_format: default_disk_format(),
            visibility: default_visibility(),
            min_disk: default_min_size(),
            min_ram: default_min_size(),
            image_location: None,
            list_status: default_list_status(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value functions
fn default_enabled_versions() -> Vec<BackendVersion> {
    BackendVersion::ALL.to_vec()
}

fn default_container_format() -> Option<String> {
    Some("bare".to_string())
}

fn default_disk_format() -> Option<String> {
    Some("qcow2".to_string())
}

fn default_visibility() -> Option<String> {
    Some("private".to_string())
}

fn default_min_size() -> Option<u64> {
    Some(0)
}

fn default_list_status() -> Option<String> {
    Some("active".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}
