//! In-process store for tests and local development.

use super::ImageStore;
use crate::error::{ImageStoreError, ImageStoreResult};
use crate::file::ImageFile;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const MEMORY_URL_PREFIX: &str = "memory://images/";

/// Records every call. URLs look like `memory://images/<uuid>.<ext>` and
/// their identifier is `<uuid>`.
#[derive(Clone, Default)]
pub struct InMemoryImageStore {
    stored: Arc<Mutex<Vec<String>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    put_calls: Arc<Mutex<usize>>,
    fail_uploads: Option<String>,
    fail_deletes: Option<String>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `put` fails with `message`.
    pub fn failing_uploads(message: impl Into<String>) -> Self {
        Self {
            fail_uploads: Some(message.into()),
            ..Self::default()
        }
    }

    /// Every `delete` fails with `message`.
    pub fn failing_deletes(message: impl Into<String>) -> Self {
        Self {
            fail_deletes: Some(message.into()),
            ..Self::default()
        }
    }

    /// Number of `put` calls, successful or not.
    pub async fn put_count(&self) -> usize {
        *self.put_calls.lock().await
    }

    pub async fn stored_urls(&self) -> Vec<String> {
        self.stored.lock().await.clone()
    }

    /// Identifiers passed to `delete`, in call order, including failed calls.
    pub async fn deleted_ids(&self) -> Vec<String> {
        self.deleted.lock().await.clone()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn put(&self, file: ImageFile) -> ImageStoreResult<String> {
        *self.put_calls.lock().await += 1;

        if let Some(message) = &self.fail_uploads {
            return Err(ImageStoreError::Upload(message.clone()));
        }

        let url = format!("{}{}.{}", MEMORY_URL_PREFIX, Uuid::new_v4(), file.extension());
        self.stored.lock().await.push(url.clone());
        Ok(url)
    }

    async fn delete(&self, public_id: &str) -> ImageStoreResult<()> {
        self.deleted.lock().await.push(public_id.to_string());

        if let Some(message) = &self.fail_deletes {
            return Err(ImageStoreError::Delete(message.clone()));
        }

        self.stored
            .lock()
            .await
            .retain(|url| self.public_id(url).as_deref() != Some(public_id));
        Ok(())
    }

    fn public_id(&self, url: &str) -> Option<String> {
        let rest = url.strip_prefix(MEMORY_URL_PREFIX)?;
        let id = rest.rsplit_once('.').map_or(rest, |(stem, _)| stem);
        (!id.is_empty()).then(|| id.to_string())
    }

    async fn health_check(&self) -> ImageStoreResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
