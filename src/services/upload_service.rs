use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{Error, Result};

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// A photo received in a multipart request, not yet written to disk.
#[derive(Debug, Clone)]
pub struct UploadedPhoto {
    pub file_name: String,
    pub data: Bytes,
}

/// Stores candidate photos in the directory served under `/uploads`.
#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
    enabled: bool,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            enabled,
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        fs::create_dir_all(&self.dir).await?;
        tracing::info!(dir = %self.dir.display(), "Uploads directory ready");
        Ok(())
    }

    /// Validates and writes the photo, returning the stored filename.
    pub async fn store(&self, photo: &UploadedPhoto) -> Result<String> {
        if !self.enabled {
            return Err(Error::BadRequest(
                "Photo uploads are disabled; submit the candidate without a photo".into(),
            ));
        }
        if photo.data.len() > self.max_bytes {
            return Err(Error::BadRequest(format!(
                "Photo exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        let ext = Path::new(&photo.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(Error::BadRequest(format!("File type .{} is not allowed", ext)));
        }
        if !content_matches(&ext, &photo.data) {
            return Err(Error::BadRequest(format!("Invalid {} file content", ext)));
        }

        fs::create_dir_all(&self.dir).await?;
        let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        let path = self.dir.join(&stored_name);
        fs::write(&path, &photo.data).await.map_err(|e| {
            tracing::error!(path = %path.display(), "Failed to write photo: {}", e);
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        tracing::debug!(file = %stored_name, bytes = photo.data.len(), "Stored candidate photo");
        Ok(stored_name)
    }

    /// Best-effort removal of a file stored for a request that then failed.
    pub async fn discard(&self, stored_name: &str) {
        let path = self.dir.join(stored_name);
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), "Could not remove orphaned photo: {}", e);
        }
    }
}

fn content_matches(ext: &str, data: &[u8]) -> bool {
    match ext {
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8]),
        "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        "gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        "webp" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        _ => false,
    }
}
