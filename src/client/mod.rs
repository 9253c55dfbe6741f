//! Boundary to the cloud SDK.
//!
//! The facade never talks HTTP itself. It reaches the image API through these
//! traits, which a real SDK binding (or the `FakeCloud` fixture behind the `test-utils` feature)
//! implements.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::BackendError;
use crate::types::image::v1::{V1CreateParams, V1ListFilters, V1UpdateParams};
use crate::types::image::v2::{V2CreateParams, V2ListFilters, V2UpdateParams};
use crate::types::image::{ImageV1, ImageV2};

/// An authenticated connection to the cloud.
pub trait ClientHandle: Send + Sync + 'static {
    /// Image API version the endpoint reports, e.g. `"2.0"`.
    fn glance_version(&self) -> String;

    fn glance_v1(&self) -> Result<Arc<dyn GlanceV1Api>, BackendError>;

    fn glance_v2(&self) -> Result<Arc<dyn GlanceV2Api>, BackendError>;
}

/// Glance v1 `images` manager
#[async_trait]
pub trait GlanceV1Api: Send + Sync + 'static {
    async fn create(&self, params: V1CreateParams) -> Result<ImageV1, BackendError>;
    async fn get(&self, image_id: &str) -> Result<ImageV1, BackendError>;
    async fn list(&self, filters: V1ListFilters) -> Result<Vec<ImageV1>, BackendError>;
    async fn update(&self, image_id: &str, params: V1UpdateParams)
        -> Result<ImageV1, BackendError>;
    async fn delete(&self, image_id: &str) -> Result<(), BackendError>;
}

/// Glance v2 `images` manager
#[async_trait]
pub trait GlanceV2Api: Send + Sync + 'static {
    async fn create(&self, params: V2CreateParams) -> Result<ImageV2, BackendError>;

    /// Upload image data from a local path or URL into a queued image
    async fn upload(&self, image_id: &str, location: &str) -> Result<(), BackendError>;

    async fn get(&self, image_id: &str) -> Result<ImageV2, BackendError>;
    async fn list(&self, filters: V2ListFilters) -> Result<Vec<ImageV2>, BackendError>;
    async fn update(&self, image_id: &str, params: V2UpdateParams)
        -> Result<ImageV2, BackendError>;
    async fn delete(&self, image_id: &str) -> Result<(), BackendError>;
}
