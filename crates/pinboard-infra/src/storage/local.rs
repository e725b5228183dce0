//! Filesystem-backed image storage.
//!
//! Uploads land in a single directory and are exposed under
//! `{public_base}/uploads/{filename}`; serving that directory is the
//! reverse proxy's job. Removal only ever touches URLs that carry the
//! `/uploads/` segment, so remote and default images are left alone, and
//! a failed removal (file already gone, permissions) is logged and
//! swallowed - cleanup never fails the surrounding operation.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;

use pinboard_core::ports::{ImageStore, ImageStoreError};

const UPLOADS_SEGMENT: &str = "/uploads/";

/// Filesystem image store.
pub struct LocalImageStore {
    root: PathBuf,
    public_base: String,
}

impl LocalImageStore {
    /// Root the store at `root` (created if missing); stored URLs are
    /// prefixed with `public_base`, e.g. `http://localhost:8080`.
    pub fn new(root: PathBuf, public_base: impl Into<String>) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        let public_base = public_base.into().trim_end_matches('/').to_string();
        Ok(Self { root, public_base })
    }

    /// Unique on-disk name: sanitized original stem plus a millisecond
    /// timestamp, extension preserved.
    fn build_filename(original_name: &str) -> String {
        let (stem, ext) = match original_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (original_name, None),
        };

        let stem: String = stem
            .to_lowercase()
            .chars()
            .map(|c| if c.is_whitespace() { '-' } else { c })
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        let stem = if stem.is_empty() { "image" } else { stem.as_str() };

        let ext: String = ext
            .unwrap_or("")
            .to_lowercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();

        let millis = Utc::now().timestamp_millis();
        if ext.is_empty() {
            format!("{stem}-{millis}")
        } else {
            format!("{stem}-{millis}.{ext}")
        }
    }

    /// Extract the stored filename from an image URL, if and only if the
    /// URL points into this store's uploads directory. Handles both bare
    /// `/uploads/name` paths and full `http(s)://host/uploads/name` URLs;
    /// rejects anything that could escape the uploads root.
    fn local_filename(image_url: &str) -> Option<&str> {
        let (_, name) = image_url.split_once(UPLOADS_SEGMENT)?;
        if name.is_empty() || name.contains('/') || name.contains("\\") || name.contains("..") {
            return None;
        }
        Some(name)
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, ImageStoreError> {
        if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
            return Err(ImageStoreError::UnsupportedType);
        }
        if bytes.is_empty() {
            return Err(ImageStoreError::EmptyPayload);
        }

        let filename = Self::build_filename(original_name);
        let path = self.root.join(&filename);
        fs::write(&path, &bytes)
            .await
            .map_err(|e| ImageStoreError::Io(e.to_string()))?;

        tracing::debug!(file = %filename, size = bytes.len(), "Stored uploaded image");
        Ok(format!(
            "{}{}{}",
            self.public_base, UPLOADS_SEGMENT, filename
        ))
    }

    async fn remove(&self, image_url: &str) {
        let Some(filename) = Self::local_filename(image_url) else {
            // Remote or default image - nothing of ours to clean up.
            return;
        };

        let path = self.root.join(filename);
        if let Err(err) = fs::remove_file(&path).await {
            tracing::debug!(file = %filename, error = %err, "Image cleanup skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinboard_core::domain::image::DEFAULT_POST_IMAGE;

    fn store() -> (tempfile::TempDir, LocalImageStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path().to_path_buf(), "http://localhost:8080/")
            .unwrap();
        (dir, store)
    }

    #[test]
    fn filenames_are_sanitized_and_stamped() {
        let name = LocalImageStore::build_filename("My Shop Front.JPG");
        assert!(name.starts_with("my-shop-front-"), "{name}");
        assert!(name.ends_with(".jpg"), "{name}");

        let odd = LocalImageStore::build_filename("../../etc/passwd");
        assert!(!odd.contains(".."), "{odd}");
        assert!(!odd.contains('/'), "{odd}");
    }

    #[test]
    fn local_urls_are_recognized_and_remote_ones_ignored() {
        assert_eq!(
            LocalImageStore::local_filename("/uploads/pic-17.jpg"),
            Some("pic-17.jpg")
        );
        assert_eq!(
            LocalImageStore::local_filename("http://localhost:8080/uploads/pic-17.jpg"),
            Some("pic-17.jpg")
        );
        assert_eq!(LocalImageStore::local_filename(DEFAULT_POST_IMAGE), None);
        assert_eq!(
            LocalImageStore::local_filename("https://cdn.example.com/images/pic.jpg"),
            None
        );
        // Traversal attempts never resolve to a file.
        assert_eq!(
            LocalImageStore::local_filename("/uploads/../secret.txt"),
            None
        );
    }

    #[tokio::test]
    async fn store_writes_file_and_returns_public_url() {
        let (dir, store) = store();

        let url = store
            .store("front.png", Some("image/png"), vec![1, 2, 3])
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:8080/uploads/front-"), "{url}");
        let filename = url.rsplit('/').next().unwrap();
        assert!(dir.path().join(filename).exists());
    }

    #[tokio::test]
    async fn non_image_payloads_are_rejected() {
        let (_dir, store) = store();

        let result = store.store("notes.txt", Some("text/plain"), vec![1]).await;
        assert!(matches!(result, Err(ImageStoreError::UnsupportedType)));

        let missing = store.store("mystery", None, vec![1]).await;
        assert!(matches!(missing, Err(ImageStoreError::UnsupportedType)));
    }

    #[tokio::test]
    async fn remove_deletes_local_assets_and_tolerates_missing_files() {
        let (dir, store) = store();

        let url = store
            .store("gone.png", Some("image/png"), vec![9])
            .await
            .unwrap();
        let filename = url.rsplit('/').next().unwrap().to_string();
        assert!(dir.path().join(&filename).exists());

        store.remove(&url).await;
        assert!(!dir.path().join(&filename).exists());

        // Second removal: file already absent, silently tolerated.
        store.remove(&url).await;
    }

    #[tokio::test]
    async fn remove_never_touches_remote_urls() {
        let (dir, store) = store();
        // Even a file that happens to share the default URL's basename stays.
        let planted = dir.path().join("151937286431.JPG");
        std::fs::write(&planted, b"x").unwrap();

        store.remove(DEFAULT_POST_IMAGE).await;
        assert!(planted.exists());
    }
}
