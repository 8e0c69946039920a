//! Attachment storage for the single `files[image]` upload

use crate::error::Result;
use crate::models::Upload;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Multipart field name carrying the event image
pub const IMAGE_FIELD: &str = "files[image]";

/// Persists uploaded bytes and hands back a reference to them
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, upload: Upload) -> Result<String>;
}

/// Writes each upload to `<root>/<random hex name>`.
///
/// The returned reference is that path; the client's file name is never
/// used on disk.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, upload), fields(size = upload.bytes.len()))]
    async fn put(&self, upload: Upload) -> Result<String> {
        let path = self.root.join(Uuid::new_v4().simple().to_string());
        tokio::fs::write(&path, &upload.bytes).await?;

        debug!(
            path = %path.display(),
            original_name = ?upload.file_name,
            content_type = ?upload.content_type,
            "Upload written"
        );
        Ok(path.to_string_lossy().into_owned())
    }
}

/// Turns an optional upload into the stored reference for `files.image`
#[derive(Clone)]
pub struct AttachmentResolver {
    store: Arc<dyn BlobStore>,
}

impl AttachmentResolver {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// `None` in, `None` out; otherwise the blob store's reference.
    #[instrument(skip_all, fields(has_upload = upload.is_some()))]
    pub async fn resolve(&self, upload: Option<Upload>) -> Result<Option<String>> {
        let Some(upload) = upload else {
            return Ok(None);
        };

        let reference = self.store.put(upload).await?;
        info!(reference = %reference, "Attachment stored");
        Ok(Some(reference))
    }
}
