//! Object storage collaborator.
//!
//! Images are written with overwrite allowed and served from a public base URL;
//! `S3ObjectStore` talks to any S3-compatible endpoint, `MemoryObjectStore`
//! keeps objects in process.

pub mod memory;
pub mod s3;

use async_trait::async_trait;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to put object: {0}")]
    Put(String),
    #[error("Failed to resolve public URL: {0}")]
    PublicUrl(String),
    #[error("Storage is not configured: {0}")]
    NotConfigured(&'static str),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` at `path` in `bucket`, replacing any existing object.
    async fn put_object(
        &self,
        bucket: &str,
        path: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Publicly fetchable URL for a stored path.
    fn public_url(&self, bucket: &str, path: &str) -> Result<String, StorageError>;
}

/// `<base>/<bucket>/<path segments...>`, each segment percent-encoded.
pub fn join_public_url(base: &url::Url, bucket: &str, path: &str) -> Result<String, StorageError> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| StorageError::PublicUrl(format!("'{}' cannot be a base URL", base)))?;
        segments.pop_if_empty();
        segments.push(bucket);
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_bucket_and_path() {
        let base = url::Url::parse("https://abc.supabase.co/storage/v1/object/public/").unwrap();
        let url = join_public_url(&base, "site-assets", "home/1234.jpg").unwrap();
        assert_eq!(
            url,
            "https://abc.supabase.co/storage/v1/object/public/site-assets/home/1234.jpg"
        );
    }

    #[test]
    fn encodes_segments() {
        let base = url::Url::parse("http://localhost:9000").unwrap();
        let url = join_public_url(&base, "assets", "our story/a b.png").unwrap();
        assert_eq!(url, "http://localhost:9000/assets/our%20story/a%20b.png");
    }

    #[test]
    fn rejects_cannot_be_a_base() {
        let base = url::Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            join_public_url(&base, "b", "p"),
            Err(StorageError::PublicUrl(_))
        ));
    }
}
