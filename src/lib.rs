//! A unified facade over the Glance v1 and v2 image service clients.
//!
//! ```ignore
//! let service = ImageService::new(client)?;
//! let image = service.get_image("6f1a...").await?;
//! println!("{} is {}", image.id, image.visibility);
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

pub use backend::{BackendVersion, ImageBackend};
pub use client::ClientHandle;
pub use error::{BackendError, Result, ServiceError};
pub use service::{ImageIter, ImageService};
pub use types::image::{
    CreateImageRequest, ListImagesFilter, RawImage, UnifiedImage, UpdateImageRequest,
};
