use std::sync::Arc;

use image_service_compat::config::DiscoveryConfig;
use image_service_compat::test_utils::FakeCloud;
use image_service_compat::{
    BackendError, BackendVersion, CreateImageRequest, ImageService, ListImagesFilter,
    ServiceError, UpdateImageRequest,
};

fn service_for(version: &str) -> (Arc<FakeCloud>, ImageService) {
    let cloud = Arc::new(FakeCloud::new(version));
    let service = ImageService::new(cloud.clone()).unwrap();
    (cloud, service)
}

#[test]
fn test_version_one_selects_v1_backend() {
    let (cloud, service) = service_for("1.0");
    assert_eq!(service.backend_version(), BackendVersion::V1);
    assert_eq!(cloud.version_reads(), 1);
}

#[test]
fn test_version_two_selects_v2_backend() {
    let (cloud, service) = service_for("2.0");
    assert_eq!(service.backend_version(), BackendVersion::V2);
    assert_eq!(cloud.version_reads(), 1);
}

#[test]
fn test_unrecognized_version_fails_construction() {
    let cloud = Arc::new(FakeCloud::new("3.1"));

    match ImageService::new(cloud.clone()) {
        Err(ServiceError::NoApplicableImplementation {
            reported_version, ..
        }) => assert_eq!(reported_version, "3.1"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("construction should fail"),
    }
    assert_eq!(cloud.version_reads(), 1);
}

#[test]
fn test_disabled_version_fails_construction() {
    let cloud = Arc::new(FakeCloud::new("1.0"));
    let config = DiscoveryConfig {
        enabled_versions: vec![BackendVersion::V2],
    };

    let result = ImageService::with_config(cloud, &config);

    assert!(matches!(
        result,
        Err(ServiceError::NoApplicableImplementation { .. })
    ));
}

#[tokio::test]
async fn test_backend_is_chosen_once() {
    let (cloud, service) = service_for("2.0");

    service
        .create_image(CreateImageRequest::new().with_name("a"))
        .await
        .unwrap();
    service.list_images(ListImagesFilter::new()).await.unwrap();

    assert_eq!(cloud.version_reads(), 1);
}

#[tokio::test]
async fn test_v2_lifecycle() {
    let (cloud, service) = service_for("2.0");

    let created = service
        .create_image(
            CreateImageRequest::new()
                .with_name("cirros")
                .with_container_format("bare")
                .with_disk_format("qcow2")
                .with_location("http://example.com/cirros.img")
                .with_visibility("private")
                .with_min_disk(1)
                .with_min_ram(256),
        )
        .await
        .unwrap();

    let image = service.get_image(&created).await.unwrap();
    assert_eq!(image.name.as_deref(), Some("cirros"));
    assert_eq!(image.visibility, "private");
    assert_eq!(image.status.as_deref(), Some("active"));

    service.set_visibility(&image.id, "shared").await.unwrap();
    let image = service.get_image(&image).await.unwrap();
    assert_eq!(image.visibility, "shared");

    let owned: Vec<_> = service
        .list_images(ListImagesFilter::new().with_owner(cloud.owner()))
        .await
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(owned, vec![image.clone()]);

    service.delete_image(&image.id).await.unwrap();
    assert_eq!(cloud.image_count(), 0);
}

#[tokio::test]
async fn test_v1_lifecycle() {
    let (cloud, service) = service_for("1");

    let created = service
        .create_image(
            CreateImageRequest::new()
                .with_name("fedora")
                .with_location("http://example.com/fedora.qcow2")
                .with_visibility("public"),
        )
        .await
        .unwrap();

    let image = service.get_image(created.id()).await.unwrap();
    assert_eq!(image.visibility, "public");

    let updated = service
        .update_image(
            &image.id,
            UpdateImageRequest {
                image_name: Some("fedora-40".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name.as_deref(), Some("fedora-40"));
    assert_eq!(updated.visibility, "public");

    service.set_visibility(&image.id, "private").await.unwrap();
    let private: Vec<_> = service
        .list_images(ListImagesFilter::new().with_visibility("private"))
        .await
        .unwrap()
        .map(|image| image.unwrap().id)
        .collect();
    assert_eq!(private, vec![image.id.clone()]);

    service.delete_image(&image.id).await.unwrap();
    assert_eq!(cloud.image_count(), 0);
}

#[tokio::test]
async fn test_v1_rejects_community_visibility() {
    let (cloud, service) = service_for("1.0");

    let err = service
        .create_image(CreateImageRequest::new().with_visibility("community"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Backend(BackendError::InvalidVisibility { .. })
    ));
    assert_eq!(cloud.image_count(), 0);
}

#[tokio::test]
async fn test_backend_failure_is_propagated_unchanged() {
    let (cloud, service) = service_for("2.0");
    cloud
        .fail_next(BackendError::Api {
            status: 503,
            message: "glance-api unavailable".into(),
        })
        .await;

    let err = service.get_image("anything").await.unwrap_err();

    match err {
        ServiceError::Backend(BackendError::Api { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "glance-api unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_image_is_not_found() {
    let (_cloud, service) = service_for("2.0");

    let err = service.get_image("missing").await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Backend(BackendError::NotFound(ref id)) if id == "missing"
    ));
}

#[tokio::test]
async fn test_record_without_visibility_surfaces_as_error() {
    for version in ["1.0", "2.0"] {
        let (cloud, service) = service_for(version);
        let id = cloud.insert_malformed("ghost");

        let err = service.get_image(id.as_str()).await.unwrap_err();

        assert!(
            matches!(err, ServiceError::UnsupportedRecordShape { ref image_id, .. } if *image_id == id),
            "{version}: {err}"
        );
    }
}
