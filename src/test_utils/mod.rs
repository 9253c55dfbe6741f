//! Test doubles for the SDK boundary and for backends.
//!
//! [`FakeCloud`] is an in-memory image service speaking both Glance versions.
//! [`RecordingBackend`] stands in for a discovered backend and records every
//! call it receives.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::{BackendVersion, ImageBackend};
use crate::client::{ClientHandle, GlanceV1Api, GlanceV2Api};
use crate::error::BackendError;
use crate::types::image::v1::{V1CreateParams, V1ListFilters, V1UpdateParams};
use crate::types::image::v2::{V2CreateParams, V2ListFilters, V2UpdateParams};
use crate::types::image::{
    CreateImageRequest, ImageV1, ImageV2, ListImagesFilter, PublicFlag, RawImage,
    UpdateImageRequest,
};

/// Build a bare v1 record
pub fn v1_image(id: &str, name: &str, is_public: Option<PublicFlag>) -> ImageV1 {
    ImageV1 {
        id: id.to_string(),
        name: Some(name.to_string()),
        status: Some("active".to_string()),
        is_public,
        container_format: None,
        disk_format: None,
        min_disk: 0,
        min_ram: 0,
        size: None,
        owner: None,
        created_at: None,
        properties: HashMap::new(),
    }
}

/// Build a bare v2 record
pub fn v2_image(id: &str, name: &str, visibility: Option<&str>) -> ImageV2 {
    ImageV2 {
        id: id.to_string(),
        name: Some(name.to_string()),
        status: Some("active".to_string()),
        visibility: visibility.map(str::to_string),
        container_format: None,
        disk_format: None,
        min_disk: 0,
        min_ram: 0,
        size: None,
        owner: None,
        created_at: None,
        properties: HashMap::new(),
    }
}

#[derive(Debug, Clone)]
struct StoredImage {
    seq: u64,
    id: String,
    name: Option<String>,
    status: String,
    /// `None` models a record carrying neither `visibility` nor `is_public`
    visibility: Option<String>,
    container_format: Option<String>,
    disk_format: Option<String>,
    min_disk: u64,
    min_ram: u64,
    size: Option<u64>,
    owner: Option<String>,
    created_at: DateTime<Utc>,
    properties: HashMap<String, String>,
}

impl StoredImage {
    fn to_v1(&self) -> ImageV1 {
        ImageV1 {
            id: self.id.clone(),
            name: self.name.clone(),
            status: Some(self.status.clone()),
            is_public: self
                .visibility
                .as_deref()
                .map(|v| PublicFlag::Flag(v == "public")),
            container_format: self.container_format.clone(),
            disk_format: self.disk_format.clone(),
            min_disk: self.min_disk,
            min_ram: self.min_ram,
            size: self.size,
            owner: self.owner.clone(),
            created_at: Some(self.created_at),
            properties: self.properties.clone(),
        }
    }

    fn to_v2(&self) -> ImageV2 {
        ImageV2 {
            id: self.id.clone(),
            name: self.name.clone(),
            status: Some(self.status.clone()),
            visibility: self.visibility.clone(),
            container_format: self.container_format.clone(),
            disk_format: self.disk_format.clone(),
            min_disk: self.min_disk,
            min_ram: self.min_ram,
            size: self.size,
            owner: self.owner.clone(),
            created_at: Some(self.created_at),
            properties: self
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        }
    }
}

#[derive(Default)]
struct FakeStore {
    images: DashMap<String, StoredImage>,
    next_seq: AtomicU64,
    pending_failure: Mutex<Option<BackendError>>,
    v1_creates: Mutex<Vec<V1CreateParams>>,
    uploads: Mutex<Vec<(String, String)>>,
}

impl FakeStore {
    async fn check_failure(&self) -> Result<(), BackendError> {
        match self.pending_failure.lock().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn insert(&self, mut image: StoredImage) -> StoredImage {
        image.seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.images.insert(image.id.clone(), image.clone());
        image
    }

    fn find(&self, image_id: &str) -> Result<StoredImage, BackendError> {
        self.images
            .get(image_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BackendError::NotFound(image_id.to_string()))
    }

    fn modify<F>(&self, image_id: &str, apply: F) -> Result<StoredImage, BackendError>
    where
        F: FnOnce(&mut StoredImage),
    {
        let mut entry = self
            .images
            .get_mut(image_id)
            .ok_or_else(|| BackendError::NotFound(image_id.to_string()))?;
        apply(entry.value_mut());
        Ok(entry.value().clone())
    }

    fn remove(&self, image_id: &str) -> Result<(), BackendError> {
        self.images
            .remove(image_id)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(image_id.to_string()))
    }

    fn matching<P>(&self, predicate: P) -> Vec<StoredImage>
    where
        P: Fn(&StoredImage) -> bool,
    {
        let mut images: Vec<StoredImage> = self
            .images
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        images.sort_by_key(|image| image.seq);
        images
    }
}

/// In-memory cloud that answers as either Glance version.
pub struct FakeCloud {
    version: String,
    owner: String,
    version_reads: AtomicUsize,
    store: Arc<FakeStore>,
}

impl FakeCloud {
    /// A cloud whose image endpoint reports `version`
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            owner: Uuid::new_v4().simple().to_string(),
            version_reads: AtomicUsize::new(0),
            store: Arc::new(FakeStore::default()),
        }
    }

    /// Project id stamped on every image this cloud creates
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// How many times the reported version has been read
    pub fn version_reads(&self) -> usize {
        self.version_reads.load(Ordering::SeqCst)
    }

    pub fn image_count(&self) -> usize {
        self.store.images.len()
    }

    /// Make the next API call fail with `err`
    pub async fn fail_next(&self, err: BackendError) {
        *self.store.pending_failure.lock().await = Some(err);
    }

    /// Store an image that carries no visibility information at all
    pub fn insert_malformed(&self, name: &str) -> String {
        let image = self.store.insert(StoredImage {
            seq: 0,
            id: Uuid::new_v4().to_string(),
            name: Some(name.to_string()),
            status: "active".to_string(),
            visibility: None,
            container_format: None,
            disk_format: None,
            min_disk: 0,
            min_ram: 0,
            size: None,
            owner: Some(self.owner.clone()),
            created_at: Utc::now(),
            properties: HashMap::new(),
        });
        image.id
    }

    pub async fn last_v1_create(&self) -> Option<V1CreateParams> {
        self.store.v1_creates.lock().await.last().cloned()
    }

    pub async fn uploads(&self) -> Vec<(String, String)> {
        self.store.uploads.lock().await.clone()
    }
}

impl ClientHandle for FakeCloud {
    fn glance_version(&self) -> String {
        self.version_reads.fetch_add(1, Ordering::SeqCst);
        self.version.clone()
    }

    fn glance_v1(&self) -> Result<Arc<dyn GlanceV1Api>, BackendError> {
        Ok(Arc::new(FakeGlanceV1 {
            owner: self.owner.clone(),
            store: self.store.clone(),
        }))
    }

    fn glance_v2(&self) -> Result<Arc<dyn GlanceV2Api>, BackendError> {
        Ok(Arc::new(FakeGlanceV2 {
            owner: self.owner.clone(),
            store: self.store.clone(),
        }))
    }
}

struct FakeGlanceV1 {
    owner: String,
    store: Arc<FakeStore>,
}

#[async_trait]
impl GlanceV1Api for FakeGlanceV1 {
    async fn create(&self, params: V1CreateParams) -> Result<ImageV1, BackendError> {
        self.store.check_failure().await?;
        self.store.v1_creates.lock().await.push(params.clone());

        let status = if params.copy_from.is_some() {
            "active"
        } else {
            "queued"
        };
        let image = self.store.insert(StoredImage {
            seq: 0,
            id: Uuid::new_v4().to_string(),
            name: params.name,
            status: status.to_string(),
            visibility: Some(if params.is_public { "public" } else { "private" }.to_string()),
            container_format: params.container_format,
            disk_format: params.disk_format,
            min_disk: params.min_disk.unwrap_or_default(),
            min_ram: params.min_ram.unwrap_or_default(),
            size: None,
            owner: Some(self.owner.clone()),
            created_at: Utc::now(),
            properties: params.properties,
        });
        Ok(image.to_v1())
    }

    async fn get(&self, image_id: &str) -> Result<ImageV1, BackendError> {
        self.store.check_failure().await?;
        Ok(self.store.find(image_id)?.to_v1())
    }

    async fn list(&self, filters: V1ListFilters) -> Result<Vec<ImageV1>, BackendError> {
        self.store.check_failure().await?;
        let images = self.store.matching(|image| {
            filters.status.as_ref().map_or(true, |s| &image.status == s)
                && filters.owner.as_ref().map_or(true, |o| image.owner.as_ref() == Some(o))
                && filters.is_public.map_or(true, |public| {
                    image
                        .visibility
                        .as_deref()
                        .is_some_and(|v| (v == "public") == public)
                })
        });
        Ok(images.iter().map(StoredImage::to_v1).collect())
    }

    async fn update(&self, image_id: &str, params: V1UpdateParams) -> Result<ImageV1, BackendError> {
        self.store.check_failure().await?;
        let image = self.store.modify(image_id, |image| {
            if let Some(name) = params.name {
                image.name = Some(name);
            }
            if let Some(public) = params.is_public {
                image.visibility = Some(if public { "public" } else { "private" }.to_string());
            }
            if let Some(min_disk) = params.min_disk {
                image.min_disk = min_disk;
            }
            if let Some(min_ram) = params.min_ram {
                image.min_ram = min_ram;
            }
        })?;
        Ok(image.to_v1())
    }

    async fn delete(&self, image_id: &str) -> Result<(), BackendError> {
        self.store.check_failure().await?;
        self.store.remove(image_id)
    }
}

struct FakeGlanceV2 {
    owner: String,
    store: Arc<FakeStore>,
}

#[async_trait]
impl GlanceV2Api for FakeGlanceV2 {
    async fn create(&self, params: V2CreateParams) -> Result<ImageV2, BackendError> {
        self.store.check_failure().await?;
        let image = self.store.insert(StoredImage {
            seq: 0,
            id: Uuid::new_v4().to_string(),
            name: params.name,
            status: "queued".to_string(),
            visibility: Some(params.visibility.unwrap_or_else(|| "shared".to_string())),
            container_format: params.container_format,
            disk_format: params.disk_format,
            min_disk: params.min_disk.unwrap_or_default(),
            min_ram: params.min_ram.unwrap_or_default(),
            size: None,
            owner: Some(self.owner.clone()),
            created_at: Utc::now(),
            properties: params.properties,
        });
        Ok(image.to_v2())
    }

    async fn upload(&self, image_id: &str, location: &str) -> Result<(), BackendError> {
        self.store.check_failure().await?;
        self.store.modify(image_id, |image| {
            image.status = "active".to_string();
        })?;
        self.store
            .uploads
            .lock()
            .await
            .push((image_id.to_string(), location.to_string()));
        Ok(())
    }

    async fn get(&self, image_id: &str) -> Result<ImageV2, BackendError> {
        self.store.check_failure().await?;
        Ok(self.store.find(image_id)?.to_v2())
    }

    async fn list(&self, filters: V2ListFilters) -> Result<Vec<ImageV2>, BackendError> {
        self.store.check_failure().await?;
        let images = self.store.matching(|image| {
            filters.status.as_ref().map_or(true, |s| &image.status == s)
                && filters.owner.as_ref().map_or(true, |o| image.owner.as_ref() == Some(o))
                && filters
                    .visibility
                    .as_ref()
                    .map_or(true, |v| image.visibility.as_ref() == Some(v))
        });
        Ok(images.iter().map(StoredImage::to_v2).collect())
    }

    async fn update(&self, image_id: &str, params: V2UpdateParams) -> Result<ImageV2, BackendError> {
        self.store.check_failure().await?;
        let image = self.store.modify(image_id, |image| {
            if let Some(name) = params.name {
                image.name = Some(name);
            }
            if let Some(visibility) = params.visibility {
                image.visibility = Some(visibility);
            }
            if let Some(min_disk) = params.min_disk {
                image.min_disk = min_disk;
            }
            if let Some(min_ram) = params.min_ram {
                image.min_ram = min_ram;
            }
            for key in &params.remove_props {
                image.properties.remove(key);
            }
        })?;
        Ok(image.to_v2())
    }

    async fn delete(&self, image_id: &str) -> Result<(), BackendError> {
        self.store.check_failure().await?;
        self.store.remove(image_id)
    }
}

/// One call received by a [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    CreateImage(CreateImageRequest),
    GetImage(String),
    ListImages(ListImagesFilter),
    SetVisibility {
        image_id: String,
        visibility: String,
    },
    UpdateImage {
        image_id: String,
        request: UpdateImageRequest,
    },
    DeleteImage(String),
}

/// Backend that records its calls and answers from a fixed set of records.
pub struct RecordingBackend {
    version: BackendVersion,
    images: Vec<RawImage>,
    failure: Option<BackendError>,
    calls: Mutex<Vec<BackendCall>>,
}

impl RecordingBackend {
    pub fn new(version: BackendVersion) -> Self {
        Self {
            version,
            images: Vec::new(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Records returned by `list_images`; the first one also answers
    /// `create_image`, `set_visibility` and `update_image`.
    pub fn with_images(mut self, images: Vec<RawImage>) -> Self {
        self.images = images;
        self
    }

    /// Every call fails with `err` after being recorded
    pub fn failing_with(mut self, err: BackendError) -> Self {
        self.failure = Some(err);
        self
    }

    pub async fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: BackendCall) -> Result<(), BackendError> {
        self.calls.lock().await.push(call);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn first_image(&self) -> RawImage {
        self.images
            .first()
            .cloned()
            .unwrap_or_else(|| RawImage::V2(v2_image("recorded", "recorded", Some("private"))))
    }
}

#[async_trait]
impl ImageBackend for RecordingBackend {
    fn version(&self) -> BackendVersion {
        self.version
    }

    async fn create_image(&self, request: CreateImageRequest) -> Result<RawImage, BackendError> {
        self.record(BackendCall::CreateImage(request)).await?;
        Ok(self.first_image())
    }

    async fn get_image(&self, image_id: &str) -> Result<RawImage, BackendError> {
        self.record(BackendCall::GetImage(image_id.to_string()))
            .await?;
        self.images
            .iter()
            .find(|image| image.id() == image_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(image_id.to_string()))
    }

    async fn list_images(&self, filter: ListImagesFilter) -> Result<Vec<RawImage>, BackendError> {
        self.record(BackendCall::ListImages(filter)).await?;
        Ok(self.images.clone())
    }

    async fn set_visibility(
        &self,
        image_id: &str,
        visibility: &str,
    ) -> Result<RawImage, BackendError> {
        self.record(BackendCall::SetVisibility {
            image_id: image_id.to_string(),
            visibility: visibility.to_string(),
        })
        .await?;
        Ok(self.first_image())
    }

    async fn update_image(
        &self,
        image_id: &str,
        request: UpdateImageRequest,
    ) -> Result<RawImage, BackendError> {
        self.record(BackendCall::UpdateImage {
            image_id: image_id.to_string(),
            request,
        })
        .await?;
        Ok(self.first_image())
    }

    async fn delete_image(&self, image_id: &str) -> Result<(), BackendError> {
        self.record(BackendCall::DeleteImage(image_id.to_string()))
            .await
    }
}
