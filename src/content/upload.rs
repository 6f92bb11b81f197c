use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::storage::{ObjectStore, StorageError};

/// A file picked by the admin
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Identifies one image field instance: who is editing, which page, which field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSlot {
    pub owner: String,
    pub content_key: String,
    pub field: String,
}

impl FieldSlot {
    pub fn new(owner: impl Into<String>, content_key: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            content_key: content_key.into(),
            field: field.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("An upload for '{0}' is already in progress")]
    InProgress(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Writes picked files to the bucket under fresh names and hands back public URLs.
pub struct ImageFieldUploader {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    fallback_extension: String,
    in_flight: Mutex<HashSet<FieldSlot>>,
}

impl ImageFieldUploader {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>, fallback_extension: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            fallback_extension: fallback_extension.into(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn is_uploading(&self, slot: &FieldSlot) -> bool {
        self.slots().contains(slot)
    }

    // The set holds plain keys, so a panic while it was locked leaves nothing half-written.
    fn slots(&self) -> MutexGuard<'_, HashSet<FieldSlot>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upload `file` into `folder` and return its public URL.
    ///
    /// `None` (nothing picked) is a no-op. A second upload for a slot that is
    /// still in flight is rejected; the slot frees itself whether the upload
    /// succeeds or fails.
    pub async fn upload(
        &self,
        slot: &FieldSlot,
        folder: &str,
        file: Option<LocalFile>,
    ) -> Result<Option<String>, UploadError> {
        let Some(file) = file else {
            return Ok(None);
        };

        let _guard = self.claim(slot)?;

        let extension = file_extension(&file.file_name, &self.fallback_extension);
        let path = object_path(folder, &unique_object_name(&extension));

        tracing::info!(
            bucket = %self.bucket,
            path = %path,
            field = %slot.field,
            bytes = file.bytes.len(),
            "Uploading image"
        );

        let result = async {
            self.store
                .put_object(&self.bucket, &path, file.bytes, file.content_type.as_deref())
                .await?;
            self.store.public_url(&self.bucket, &path)
        }
        .await;

        match result {
            Ok(url) => Ok(Some(url)),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Image upload failed");
                Err(e.into())
            }
        }
    }

    fn claim(&self, slot: &FieldSlot) -> Result<InFlightGuard<'_>, UploadError> {
        if !self.slots().insert(slot.clone()) {
            return Err(UploadError::InProgress(slot.field.clone()));
        }
        Ok(InFlightGuard {
            uploader: self,
            slot: slot.clone(),
        })
    }
}

struct InFlightGuard<'a> {
    uploader: &'a ImageFieldUploader,
    slot: FieldSlot,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.uploader.slots().remove(&self.slot);
    }
}

/// Text after the last `.` of the file name, lowercased; `fallback` when there is none.
pub fn file_extension(file_name: &str, fallback: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            ext.to_ascii_lowercase()
        }
        _ => fallback.to_string(),
    }
}

pub fn unique_object_name(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

pub fn object_path(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}
