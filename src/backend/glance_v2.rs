/// Glance v2 backend
use async_trait::async_trait;
use std::sync::Arc;

use super::{BackendVersion, ImageBackend};
use crate::client::{ClientHandle, GlanceV2Api};
use crate::error::BackendError;
use crate::types::image::v2::{V2CreateParams, V2ListFilters, V2UpdateParams};
use crate::types::image::{CreateImageRequest, ListImagesFilter, RawImage, UpdateImageRequest};

pub struct GlanceV2Service {
    client: Arc<dyn ClientHandle>,
}

impl GlanceV2Service {
    pub fn new(client: Arc<dyn ClientHandle>) -> Self {
        Self { client }
    }

    /// Reads the reported version once.
    pub fn is_applicable(client: &dyn ClientHandle) -> bool {
        Self::supports_version(&client.glance_version())
    }

    pub fn supports_version(reported: &str) -> bool {
        BackendVersion::V2.matches(reported)
    }

    fn images(&self) -> Result<Arc<dyn GlanceV2Api>, BackendError> {
        self.client.glance_v2()
    }
}

#[async_trait]
impl ImageBackend for GlanceV2Service {
    fn version(&self) -> BackendVersion {
        BackendVersion::V2
    }

    /// Registers the image, then uploads its data when a location is given.
    async fn create_image(&self, request: CreateImageRequest) -> Result<RawImage, BackendError> {
        let images = self.images()?;

        let params = V2CreateParams {
            name: request.image_name,
            container_format: request.container_format,
            disk_format: request.disk_format,
            visibility: request.visibility,
            min_disk: request.min_disk,
            min_ram: request.min_ram,
            properties: request.properties,
        };

        tracing::debug!(name = ?params.name, "Creating image through Glance v2");
        let image = images.create(params).await?;

        let Some(location) = request.image_location else {
            return Ok(RawImage::V2(image));
        };

        tracing::debug!(image_id = %image.id, location = %location, "Uploading image data");
        images.upload(&image.id, &location).await?;
        let image = images.get(&image.id).await?;
        Ok(RawImage::V2(image))
    }

    async fn get_image(&self, image_id: &str) -> Result<RawImage, BackendError> {
        let image = self.images()?.get(image_id).await?;
        Ok(RawImage::V2(image))
    }

    async fn list_images(&self, filter: ListImagesFilter) -> Result<Vec<RawImage>, BackendError> {
        let filters = V2ListFilters {
            status: filter.status,
            visibility: filter.visibility,
            owner: filter.owner,
        };

        let images = self.images()?.list(filters).await?;
        Ok(images.into_iter().map(RawImage::V2).collect())
    }

    async fn set_visibility(
        &self,
        image_id: &str,
        visibility: &str,
    ) -> Result<RawImage, BackendError> {
        let params = V2UpdateParams {
            visibility: Some(visibility.to_string()),
            ..Default::default()
        };
        let image = self.images()?.update(image_id, params).await?;
        Ok(RawImage::V2(image))
    }

    async fn update_image(
        &self,
        image_id: &str,
        request: UpdateImageRequest,
    ) -> Result<RawImage, BackendError> {
        let params = V2UpdateParams {
            name: request.image_name,
            visibility: None,
            min_disk: request.min_disk,
            min_ram: request.min_ram,
            remove_props: request.remove_props,
        };
        let image = self.images()?.update(image_id, params).await?;
        Ok(RawImage::V2(image))
    }

    async fn delete_image(&self, image_id: &str) -> Result<(), BackendError> {
        self.images()?.delete(image_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeCloud;

    fn service() -> (Arc<FakeCloud>, GlanceV2Service) {
        let cloud = Arc::new(FakeCloud::new("2.0"));
        let service = GlanceV2Service::new(cloud.clone());
        (cloud, service)
    }

    #[tokio::test]
    async fn test_create_uploads_from_location() {
        let (cloud, service) = service();

        let request = CreateImageRequest::new()
            .with_name("cirros")
            .with_container_format("bare")
            .with_disk_format("qcow2")
            .with_location("/tmp/cirros.img")
            .with_visibility("community");

        let raw = service.create_image(request).await.unwrap();

        let RawImage::V2(image) = raw else {
            panic!("v2 backend must return v2 records");
        };
        assert_eq!(image.visibility.as_deref(), Some("community"));
        assert_eq!(image.status.as_deref(), Some("active"));
        assert_eq!(
            cloud.uploads().await,
            vec![(image.id.clone(), "/tmp/cirros.img".to_string())]
        );
    }

    #[tokio::test]
    async fn test_create_without_location_stays_queued() {
        let (cloud, service) = service();

        let raw = service
            .create_image(CreateImageRequest::new().with_name("empty"))
            .await
            .unwrap();

        assert_eq!(raw.status(), Some("queued"));
        assert!(cloud.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn test_custom_properties_reach_the_record() {
        let (_cloud, service) = service();

        let raw = service
            .create_image(CreateImageRequest::new().with_property("os_distro", "ubuntu"))
            .await
            .unwrap();

        let RawImage::V2(image) = raw else {
            panic!("v2 backend must return v2 records");
        };
        assert_eq!(
            image.properties.get("os_distro"),
            Some(&serde_json::json!("ubuntu"))
        );
    }

    #[tokio::test]
    async fn test_set_visibility_passes_value_through() {
        let (_cloud, service) = service();
        let raw = service
            .create_image(CreateImageRequest::new().with_visibility("private"))
            .await
            .unwrap();

        let updated = service.set_visibility(raw.id(), "shared").await.unwrap();

        assert_eq!(updated.normalize().unwrap().visibility, "shared");
    }

    #[tokio::test]
    async fn test_update_removes_properties() {
        let (_cloud, service) = service();
        let raw = service
            .create_image(
                CreateImageRequest::new()
                    .with_name("before")
                    .with_property("os_distro", "ubuntu"),
            )
            .await
            .unwrap();

        let request = UpdateImageRequest {
            image_name: Some("after".into()),
            remove_props: vec!["os_distro".into()],
            ..Default::default()
        };
        let updated = service.update_image(raw.id(), request).await.unwrap();

        let RawImage::V2(image) = updated else {
            panic!("v2 backend must return v2 records");
        };
        assert_eq!(image.name.as_deref(), Some("after"));
        assert!(!image.properties.contains_key("os_distro"));
    }

    #[tokio::test]
    async fn test_list_filters_by_status_and_visibility() {
        let (_cloud, service) = service();
        service
            .create_image(
                CreateImageRequest::new()
                    .with_name("ready")
                    .with_visibility("public")
                    .with_location("http://example.com/a.img"),
            )
            .await
            .unwrap();
        service
            .create_image(CreateImageRequest::new().with_name("pending").with_visibility("public"))
            .await
            .unwrap();

        let active = service
            .list_images(
                ListImagesFilter::new()
                    .with_status("active")
                    .with_visibility("public"),
            )
            .await
            .unwrap();

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name(), Some("ready"));
    }
}
