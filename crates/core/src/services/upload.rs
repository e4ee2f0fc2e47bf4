//! Image uploads into object storage.

use std::sync::Arc;

use chrono::Utc;
use outliers_common::{
    AppError, AppResult, StorageBackend, UploadedFile, config::StorageSettings,
    content_thumbnail_key, profile_photo_key,
};

use crate::services::session::Viewer;

/// Upload service.
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn StorageBackend>,
    content_bucket: String,
    profile_bucket: String,
    max_bytes: usize,
}

impl UploadService {
    /// Create a new upload service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, settings: &StorageSettings) -> Self {
        Self {
            storage,
            content_bucket: settings.content_bucket.clone(),
            profile_bucket: settings.profile_bucket.clone(),
            max_bytes: settings.max_upload_bytes,
        }
    }

    /// Largest accepted file, in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store a thumbnail for a content item.
    pub async fn upload_content_thumbnail(
        &self,
        viewer: &Viewer,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        self.check(data, content_type)?;

        let key = content_thumbnail_key(Utc::now().timestamp_millis());
        let file = self
            .storage
            .upload(&self.content_bucket, &key, data, content_type)
            .await?;

        tracing::info!(user_id = %viewer.id, bucket = %file.bucket, key = %file.key, size = file.size, "Content thumbnail uploaded");
        Ok(file)
    }

    /// Store a profile photo for the viewer.
    pub async fn upload_profile_photo(
        &self,
        viewer: &Viewer,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        self.check(data, content_type)?;

        let key = profile_photo_key(&viewer.id, Utc::now().timestamp_millis());
        let file = self
            .storage
            .upload(&self.profile_bucket, &key, data, content_type)
            .await?;

        tracing::info!(user_id = %viewer.id, bucket = %file.bucket, key = %file.key, size = file.size, "Profile photo uploaded");
        Ok(file)
    }

    /// Delete a profile photo this service stored. URLs pointing elsewhere
    /// are left alone. Returns whether an object was deleted.
    pub async fn remove_profile_photo(&self, url: &str) -> AppResult<bool> {
        let prefix = self.storage.public_url(&self.profile_bucket, "");
        let Some(key) = url.strip_prefix(&prefix).filter(|key| !key.is_empty()) else {
            return Ok(false);
        };

        self.storage.delete(&self.profile_bucket, key).await?;
        tracing::info!(bucket = %self.profile_bucket, key = %key, "Profile photo deleted");
        Ok(true)
    }

    fn check(&self, data: &[u8], content_type: &str) -> AppResult<()> {
        if data.is_empty() {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }
        if data.len() > self.max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Files must be at most {} bytes",
                self.max_bytes
            )));
        }
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest(format!(
                "Only images can be uploaded, got {content_type}"
            )));
        }
        Ok(())
    }
}
