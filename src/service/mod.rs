//! The unified image service.
//!
//! [`ImageService`] picks one backend when it is built and forwards every call
//! to it. Reads come back as [`UnifiedImage`] records whatever the backend
//! version; backend errors pass through untouched.

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::backend::{discover_backend, BackendVersion, ImageBackend};
use crate::client::ClientHandle;
use crate::config::DiscoveryConfig;
use crate::error::Result;
use crate::types::image::{
    AsImageId, CreateImageRequest, ListImagesFilter, RawImage, UnifiedImage, UpdateImageRequest,
};

pub struct ImageService {
    backend: Arc<dyn ImageBackend>,
}

impl ImageService {
    /// Discover the backend for `client` with every version enabled.
    pub fn new(client: Arc<dyn ClientHandle>) -> Result<Self> {
        Self::with_config(client, &DiscoveryConfig::default())
    }

    pub fn with_config(client: Arc<dyn ClientHandle>, config: &DiscoveryConfig) -> Result<Self> {
        let backend = discover_backend(client, config)?;
        Ok(Self { backend })
    }

    /// Wrap an already chosen backend, skipping discovery.
    pub fn from_backend(backend: Arc<dyn ImageBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_version(&self) -> BackendVersion {
        self.backend.version()
    }

    /// Returns the backend's record as is.
    pub async fn create_image(&self, request: CreateImageRequest) -> Result<RawImage> {
        tracing::debug!(
            backend = %self.backend.version(),
            name = ?request.image_name,
            "Delegating create_image"
        );
        Ok(self.backend.create_image(request).await?)
    }

    /// Accepts an id or any record exposing one.
    pub async fn get_image<I>(&self, image: &I) -> Result<UnifiedImage>
    where
        I: AsImageId + ?Sized,
    {
        let image_id = image.image_id();
        tracing::debug!(backend = %self.backend.version(), image_id, "Delegating get_image");
        let raw = self.backend.get_image(image_id).await?;
        self.unify_image(&raw)
    }

    /// Records are unified lazily, one per `next()`.
    pub async fn list_images(&self, filter: ListImagesFilter) -> Result<ImageIter> {
        tracing::debug!(
            backend = %self.backend.version(),
            status = ?filter.status,
            visibility = ?filter.visibility,
            "Delegating list_images"
        );
        let records = self.backend.list_images(filter).await?;
        Ok(ImageIter::new(records))
    }

    pub async fn set_visibility(&self, image_id: &str, visibility: &str) -> Result<RawImage> {
        tracing::debug!(
            backend = %self.backend.version(),
            image_id,
            visibility,
            "Delegating set_visibility"
        );
        Ok(self.backend.set_visibility(image_id, visibility).await?)
    }

    pub async fn update_image(
        &self,
        image_id: &str,
        request: UpdateImageRequest,
    ) -> Result<UnifiedImage> {
        tracing::debug!(backend = %self.backend.version(), image_id, "Delegating update_image");
        let raw = self.backend.update_image(image_id, request).await?;
        self.unify_image(&raw)
    }

    pub async fn delete_image(&self, image_id: &str) -> Result<()> {
        tracing::debug!(backend = %self.backend.version(), image_id, "Delegating delete_image");
        Ok(self.backend.delete_image(image_id).await?)
    }

    pub fn unify_image(&self, raw: &RawImage) -> Result<UnifiedImage> {
        raw.normalize()
    }
}

/// One-pass iterator over listed images.
pub struct ImageIter {
    records: std::vec::IntoIter<RawImage>,
}

impl ImageIter {
    fn new(records: Vec<RawImage>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl Iterator for ImageIter {
    type Item = Result<UnifiedImage>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|raw| raw.normalize())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for ImageIter {}

impl FusedIterator for ImageIter {}
