use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{join_public_url, ObjectStore, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// Keeps uploaded objects in a map keyed by `(bucket, path)`
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    public_base: url::Url,
}

impl MemoryObjectStore {
    pub fn new(public_base: url::Url) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            public_base,
        }
    }

    /// Base every public URL from this store starts with
    pub fn public_base(&self) -> &url::Url {
        &self.public_base
    }

    pub fn get(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .ok()?
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub fn paths(&self, bucket: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .objects
            .read()
            .map(|objects| {
                objects
                    .keys()
                    .filter(|(b, _)| b == bucket)
                    .map(|(_, p)| p.clone())
                    .collect()
            })
            .unwrap_or_default();
        paths.sort();
        paths
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        path: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| StorageError::Put("object map poisoned".to_string()))?;
        objects.insert(
            (bucket.to_string(), path.to_string()),
            StoredObject {
                body,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<String, StorageError> {
        join_public_url(&self.public_base, bucket, path)
    }
}
