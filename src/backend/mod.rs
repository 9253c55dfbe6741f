mod glance_v1;
mod glance_v2;
mod version;

pub use glance_v1::GlanceV1Service;
pub use glance_v2::GlanceV2Service;
pub use version::BackendVersion;

use async_trait::async_trait;
use std::sync::Arc;

use crate::client::ClientHandle;
use crate::config::DiscoveryConfig;
use crate::error::{BackendError, ServiceError};
use crate::types::image::{CreateImageRequest, ListImagesFilter, RawImage, UpdateImageRequest};

/// One version-specific implementation of the image operations.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Image API version this backend speaks
    fn version(&self) -> BackendVersion;

    async fn create_image(&self, request: CreateImageRequest) -> Result<RawImage, BackendError>;

    async fn get_image(&self, image_id: &str) -> Result<RawImage, BackendError>;

    async fn list_images(&self, filter: ListImagesFilter) -> Result<Vec<RawImage>, BackendError>;

    async fn set_visibility(
        &self,
        image_id: &str,
        visibility: &str,
    ) -> Result<RawImage, BackendError>;

    async fn update_image(
        &self,
        image_id: &str,
        request: UpdateImageRequest,
    ) -> Result<RawImage, BackendError>;

    async fn delete_image(&self, image_id: &str) -> Result<(), BackendError>;
}

/// Pick the backend for `client`.
///
/// The reported version is read once, then the enabled versions are tried in
/// [`BackendVersion::ALL`] order and the first match wins.
pub fn discover_backend(
    client: Arc<dyn ClientHandle>,
    config: &DiscoveryConfig,
) -> Result<Arc<dyn ImageBackend>, ServiceError> {
    let reported = client.glance_version();

    let selected = BackendVersion::ALL
        .into_iter()
        .filter(|candidate| config.is_enabled(*candidate))
        .find(|candidate| applies(*candidate, &reported));

    match selected {
        Some(version) => {
            tracing::info!(
                reported_version = %reported,
                selected = %version,
                "Selected image backend"
            );
            Ok(create_backend(version, client))
        }
        None => {
            let supported_versions: Vec<String> = BackendVersion::ALL
                .into_iter()
                .filter(|candidate| config.is_enabled(*candidate))
                .map(|candidate| candidate.as_str().to_string())
                .collect();
            tracing::warn!(
                reported_version = %reported,
                supported_versions = ?supported_versions,
                "No image backend applies to the reported version"
            );
            Err(ServiceError::NoApplicableImplementation {
                reported_version: reported,
                supported_versions,
            })
        }
    }
}

/// Applicability predicate of the backend for `version`, against a version
/// string that has already been read.
fn applies(version: BackendVersion, reported: &str) -> bool {
    match version {
        BackendVersion::V1 => GlanceV1Service::supports_version(reported),
        BackendVersion::V2 => GlanceV2Service::supports_version(reported),
    }
}

/// Build the backend for a known version.
pub fn create_backend(
    version: BackendVersion,
    client: Arc<dyn ClientHandle>,
) -> Arc<dyn ImageBackend> {
    match version {
        BackendVersion::V1 => Arc::new(GlanceV1Service::new(client)),
        BackendVersion::V2 => Arc::new(GlanceV2Service::new(client)),
    }
}
