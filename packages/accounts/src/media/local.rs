//! # Filesystem-backed media store
//!
//! [`LocalMediaStore`] writes each accepted avatar to its own file in a single
//! directory and returns the file name as the media id:
//!
//! ```text
//! <upload_dir>/
//! ├── 2f1c…-…-9a.jpg
//! └── 7b0e…-…-41.png
//! ```
//!
//! Only JPEG and PNG uploads are accepted. The directory is created on first use.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use super::{Media, MediaStore, Upload};
use crate::error::MediaError;

#[derive(Clone, Debug)]
pub struct LocalMediaStore {
    base: PathBuf,
}

impl LocalMediaStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn path_of(&self, media: &Media) -> PathBuf {
        self.base.join(&media.id)
    }
}

/// Extension from the declared content type, or from the file name when the
/// upload carries no content type.
fn extension_for(upload: &Upload) -> Result<&'static str, MediaError> {
    match upload.content_type.as_deref() {
        Some("image/jpeg") => Ok("jpg"),
        Some("image/png") => Ok("png"),
        Some(other) => Err(MediaError::UnsupportedContentType(other.to_string())),
        None => {
            let ext = upload
                .file_name
                .as_deref()
                .and_then(|name| name.rsplit_once('.'))
                .map(|(_, ext)| ext.to_ascii_lowercase());
            match ext.as_deref() {
                Some("jpg" | "jpeg") => Ok("jpg"),
                Some("png") => Ok("png"),
                _ => Err(MediaError::UnsupportedContentType("<none>".to_string())),
            }
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save_avatar(&self, upload: &Upload) -> Result<Media, MediaError> {
        let ext = extension_for(upload)?;
        if upload.bytes.is_empty() {
            return Err(MediaError::Empty);
        }

        tokio::fs::create_dir_all(&self.base).await?;
        let media = Media {
            id: format!("{}.{}", Uuid::new_v4(), ext),
        };
        tokio::fs::write(self.path_of(&media), &upload.bytes).await?;

        tracing::debug!(media_id = %media.id, bytes = upload.bytes.len(), "stored avatar");
        Ok(media)
    }

    async fn remove_avatar(&self, media: &Media) -> Result<(), MediaError> {
        tokio::fs::remove_file(self.path_of(media)).await?;
        tracing::debug!(media_id = %media.id, "removed avatar");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(bytes: &[u8]) -> Upload {
        Upload {
            file_name: Some("me.png".to_string()),
            content_type: Some("image/png".to_string()),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_save_avatar_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().join("avatars"));

        let media = store.save_avatar(&png(b"\x89PNG")).await.unwrap();
        assert!(media.id.ends_with(".png"));

        let written = std::fs::read(store.path_of(&media)).unwrap();
        assert_eq!(written, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_each_avatar_gets_its_own_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());

        let a = store.save_avatar(&png(b"a")).await.unwrap();
        let b = store.save_avatar(&png(b"b")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_rejects_unsupported_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());
        let upload = Upload {
            content_type: Some("text/plain".to_string()),
            bytes: b"hello".to_vec(),
            ..Upload::default()
        };

        let err = store.save_avatar(&upload).await.unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedContentType(t) if t == "text/plain"));
    }

    #[tokio::test]
    async fn test_extension_from_file_name_without_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());
        let upload = Upload {
            file_name: Some("Portrait.JPEG".to_string()),
            content_type: None,
            bytes: b"jpeg".to_vec(),
        };

        let media = store.save_avatar(&upload).await.unwrap();
        assert!(media.id.ends_with(".jpg"));

        let text_file = Upload {
            file_name: Some("notes.txt".to_string()),
            ..upload
        };
        let err = store.save_avatar(&text_file).await.unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedContentType(_)));
    }

    #[tokio::test]
    async fn test_remove_avatar_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());

        let media = store.save_avatar(&png(b"a")).await.unwrap();
        store.remove_avatar(&media).await.unwrap();
        assert!(!store.path_of(&media).exists());
    }

    #[tokio::test]
    async fn test_rejects_empty_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path());

        let err = store.save_avatar(&png(b"")).await.unwrap_err();
        assert!(matches!(err, MediaError::Empty));
    }
}
