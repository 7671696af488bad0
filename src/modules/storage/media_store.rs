//! Disk-backed storage for uploaded post images.
//!
//! Files land under `MEDIA_ROOT/posts/` with generated names; the database
//! stores the path relative to the media root, which is also the path the
//! static file service exposes under `/media/`.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::core::config::MediaConfig;
use crate::core::error::{AppError, Result};

const POST_IMAGE_DIR: &str = "posts";

pub struct MediaStore {
    root: PathBuf,
    max_image_bytes: usize,
}

impl MediaStore {
    /// Open the media root, creating the directory tree if needed.
    pub fn new(config: &MediaConfig) -> std::io::Result<Self> {
        let root = PathBuf::from(&config.root);
        std::fs::create_dir_all(root.join(POST_IMAGE_DIR))?;

        Ok(Self {
            root,
            max_image_bytes: config.max_image_bytes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    /// Persist an image and return its media-relative path.
    pub async fn save_post_image(&self, content_type: &str, data: &[u8]) -> Result<String> {
        let extension = extension_for(content_type);
        let relative = format!("{}/{}.{}", POST_IMAGE_DIR, Uuid::new_v4(), extension);

        tokio::fs::write(self.root.join(&relative), data)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store image {}: {}", relative, e);
                AppError::Internal(format!("Failed to store image: {}", e))
            })?;

        tracing::debug!("Stored image {} ({} bytes)", relative, data.len());
        Ok(relative)
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("application/octet-stream"), "bin");
    }

    #[tokio::test]
    async fn test_save_post_image_writes_relative_path() {
        let dir = std::env::temp_dir().join(format!("blogicum-media-{}", Uuid::new_v4()));
        let config = MediaConfig {
            root: dir.to_string_lossy().to_string(),
            max_image_bytes: 1024,
        };
        let store = MediaStore::new(&config).expect("media root is writable");

        let relative = store
            .save_post_image("image/png", b"not really a png")
            .await
            .expect("image stored");

        assert!(relative.starts_with("posts/"));
        assert!(relative.ends_with(".png"));
        assert!(store.root().join(&relative).exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
