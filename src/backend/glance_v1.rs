/// Glance v1 backend
///
/// v1 has no `visibility` field: it is mapped onto the `is_public` flag, and
/// only `public` and `private` can be expressed.
use async_trait::async_trait;
use std::sync::Arc;

use super::{BackendVersion, ImageBackend};
use crate::client::{ClientHandle, GlanceV1Api};
use crate::error::BackendError;
use crate::types::image::v1::{V1CreateParams, V1ListFilters, V1UpdateParams};
use crate::types::image::{CreateImageRequest, ListImagesFilter, RawImage, UpdateImageRequest};

pub struct GlanceV1Service {
    client: Arc<dyn ClientHandle>,
}

impl GlanceV1Service {
    pub fn new(client: Arc<dyn ClientHandle>) -> Self {
        Self { client }
    }

    /// Reads the reported version once.
    pub fn is_applicable(client: &dyn ClientHandle) -> bool {
        Self::supports_version(&client.glance_version())
    }

    pub fn supports_version(reported: &str) -> bool {
        BackendVersion::V1.matches(reported)
    }

    fn images(&self) -> Result<Arc<dyn GlanceV1Api>, BackendError> {
        self.client.glance_v1()
    }

    fn check_visibility(visibility: Option<&str>) -> Result<(), BackendError> {
        let supported = BackendVersion::V1.visibility_values();
        match visibility {
            Some(value) if !supported.contains(&value) => {
                tracing::warn!(
                    visibility = value,
                    "Glance v1 cannot represent this visibility"
                );
                Err(BackendError::InvalidVisibility {
                    visibility: value.to_string(),
                    supported: supported.iter().map(|s| s.to_string()).collect(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ImageBackend for GlanceV1Service {
    fn version(&self) -> BackendVersion {
        BackendVersion::V1
    }

    async fn create_image(&self, request: CreateImageRequest) -> Result<RawImage, BackendError> {
        Self::check_visibility(request.visibility.as_deref())?;

        let params = V1CreateParams {
            name: request.image_name,
            container_format: request.container_format,
            disk_format: request.disk_format,
            is_public: request.visibility.as_deref() == Some("public"),
            min_disk: request.min_disk,
            min_ram: request.min_ram,
            copy_from: request.image_location,
            properties: request.properties,
        };

        tracing::debug!(name = ?params.name, "Creating image through Glance v1");
        let image = self.images()?.create(params).await?;
        Ok(RawImage::V1(image))
    }

    async fn get_image(&self, image_id: &str) -> Result<RawImage, BackendError> {
        let image = self.images()?.get(image_id).await?;
        Ok(RawImage::V1(image))
    }

    async fn list_images(&self, filter: ListImagesFilter) -> Result<Vec<RawImage>, BackendError> {
        Self::check_visibility(filter.visibility.as_deref())?;

        let filters = V1ListFilters {
            status: filter.status,
            is_public: filter.visibility.as_deref().map(|v| v == "public"),
            owner: filter.owner,
        };

        let images = self.images()?.list(filters).await?;
        Ok(images.into_iter().map(RawImage::V1).collect())
    }

    async fn set_visibility(
        &self,
        image_id: &str,
        visibility: &str,
    ) -> Result<RawImage, BackendError> {
        Self::check_visibility(Some(visibility))?;

        let params = V1UpdateParams {
            is_public: Some(visibility == "public"),
            ..Default::default()
        };
        let image = self.images()?.update(image_id, params).await?;
        Ok(RawImage::V1(image))
    }

    async fn update_image(
        &self,
        image_id: &str,
        request: UpdateImageRequest,
    ) -> Result<RawImage, BackendError> {
        if !request.remove_props.is_empty() {
            return Err(BackendError::Unsupported {
                operation: format!("remove properties {:?}", request.remove_props),
                version: BackendVersion::V1.as_str().to_string(),
            });
        }

        let params = V1UpdateParams {
            name: request.image_name,
            is_public: None,
            min_disk: request.min_disk,
            min_ram: request.min_ram,
        };
        let image = self.images()?.update(image_id, params).await?;
        Ok(RawImage::V1(image))
    }

    async fn delete_image(&self, image_id: &str) -> Result<(), BackendError> {
        self.images()?.delete(image_id).await
    }
}
