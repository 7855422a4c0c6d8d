use crate::config::UploadConfig;
use crate::error::Error;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic"];

/// URL prefix the upload directory is served under
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Incident photos on local disk
#[derive(Debug, Clone)]
pub struct PhotoStorage {
    dir: PathBuf,
    max_bytes: usize,
}

impl PhotoStorage {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            max_bytes: config.max_photo_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Create the upload directory if missing
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Io(format!("Failed to create upload dir {:?}: {}", self.dir, e)))?;
        Ok(())
    }

    /// Check an upload before anything is written
    pub fn validate(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::Validation("Photo file is empty".to_string()).into());
        }
        if bytes.len() > self.max_bytes {
            return Err(Error::Validation(format!(
                "Photo exceeds the {} byte limit",
                self.max_bytes
            ))
            .into());
        }
        extension_of(file_name)
    }

    /// Write a photo for `incident_id` and return the URL path it is served at
    pub async fn save(&self, incident_id: &Uuid, file_name: &str, bytes: &[u8]) -> Result<String> {
        let extension = self.validate(file_name, bytes)?;
        self.ensure_dir().await?;

        let stored_name = format!("{}_{}.{}", incident_id, Uuid::new_v4(), extension);
        let path = self.dir.join(&stored_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::Io(format!("Failed to write photo {:?}: {}", path, e)))?;

        info!("Stored photo {} ({} bytes)", stored_name, bytes.len());

        Ok(format!("{}/{}", UPLOADS_URL_PREFIX, stored_name))
    }
}

/// Lowercased image extension of a client file name; `jpg` when there is none
fn extension_of(file_name: &str) -> Result<String> {
    let extension = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => return Ok("jpg".to_string()),
    };

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(Error::Validation(format!("Unsupported photo type: .{}", extension)).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: &Path) -> PhotoStorage {
        PhotoStorage::new(&UploadConfig {
            dir: dir.to_path_buf(),
            max_photo_bytes: 16,
        })
    }

    #[test]
    fn test_extension_rules() {
        assert_eq!(extension_of("gate.PNG").unwrap(), "png");
        assert_eq!(extension_of("camera_capture").unwrap(), "jpg");
        assert!(extension_of("payload.exe").is_err());
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let photos = storage(dir.path());
        let incident = Uuid::new_v4();

        let url = photos.save(&incident, "door.jpg", b"jpeg-bytes").await.unwrap();
        assert!(url.starts_with(&format!("/uploads/{}_", incident)));
        assert!(url.ends_with(".jpg"));

        let file_name = url.trim_start_matches("/uploads/");
        let written = std::fs::read(dir.path().join(file_name)).unwrap();
        assert_eq!(written, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_rejects_oversized_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let photos = storage(dir.path());
        let incident = Uuid::new_v4();

        assert!(photos.save(&incident, "a.jpg", &[0u8; 17]).await.is_err());
        assert!(photos.save(&incident, "a.jpg", &[]).await.is_err());
    }
}
