//! Binary image storage port.

use async_trait::async_trait;

/// Storage for uploaded post images.
///
/// `store` returns the public URL under which the asset is retrievable;
/// that URL is what gets persisted in the post record. `remove` is
/// best-effort by contract: it only acts on URLs this store recognizes as
/// its own, and a failed removal is logged, never propagated - asset
/// cleanup must not fail the surrounding record mutation.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an uploaded image and return its public URL.
    async fn store(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, ImageStoreError>;

    /// Best-effort removal of a previously stored asset. URLs not owned
    /// by this store (remote or default images) are ignored.
    async fn remove(&self, image_url: &str);
}

/// Image storage errors. Only `store` can fail; removal swallows faults.
#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("Only image files are allowed")]
    UnsupportedType,

    #[error("Uploaded file is empty")]
    EmptyPayload,

    #[error("Storage I/O failed: {0}")]
    Io(String),
}
