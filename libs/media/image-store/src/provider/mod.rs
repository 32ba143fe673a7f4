pub mod cloudinary;
pub mod memory;

pub use cloudinary::{CloudinaryConfig, CloudinaryImageStore, cloudinary_public_id};
pub use memory::InMemoryImageStore;

use crate::error::{ImageStoreError, ImageStoreResult};
use crate::file::{ImageFile, MAX_FILES};
use async_trait::async_trait;
use futures::future::try_join_all;

/// Remote object store for images.
///
/// Implementors provide `put`, `delete` and `public_id`; callers use
/// [`upload`](ImageStore::upload) and [`upload_many`](ImageStore::upload_many),
/// which validate before any network traffic.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores an already validated file and returns its public URL.
    async fn put(&self, file: ImageFile) -> ImageStoreResult<String>;

    /// Removes an image by its provider identifier.
    async fn delete(&self, public_id: &str) -> ImageStoreResult<()>;

    /// Extracts the provider identifier from a URL this store produced.
    /// Returns `None` for foreign or malformed URLs.
    fn public_id(&self, url: &str) -> Option<String>;

    async fn health_check(&self) -> ImageStoreResult<()>;

    fn name(&self) -> &'static str;

    async fn upload(&self, file: ImageFile) -> ImageStoreResult<String> {
        file.validate()?;
        self.put(file).await
    }

    /// Uploads up to [`MAX_FILES`] files concurrently. Either every URL is
    /// returned, in input order, or the first error is.
    async fn upload_many(&self, files: Vec<ImageFile>) -> ImageStoreResult<Vec<String>> {
        if files.is_empty() {
            return Err(ImageStoreError::NoFiles);
        }
        if files.len() > MAX_FILES {
            return Err(ImageStoreError::TooManyFiles(MAX_FILES));
        }
        for file in &files {
            file.validate()?;
        }

        try_join_all(files.into_iter().map(|file| self.put(file))).await
    }
}
