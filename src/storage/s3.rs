use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;

use super::{join_public_url, ObjectStore, StorageError};
use crate::config::StorageConfig;

/// S3-compatible bucket client (Supabase Storage, R2, MinIO, AWS)
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    public_base: url::Url,
}

impl S3ObjectStore {
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or(StorageError::NotConfigured("STORAGE_ENDPOINT"))?;
        let access_key_id = config
            .access_key_id
            .as_deref()
            .ok_or(StorageError::NotConfigured("STORAGE_ACCESS_KEY_ID"))?;
        let secret_access_key = config
            .secret_access_key
            .as_deref()
            .ok_or(StorageError::NotConfigured("STORAGE_SECRET_ACCESS_KEY"))?;
        let public_base = parse_public_base(config)?;

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "skyriders-storage",
            ))
            .region(aws_sdk_s3::config::Region::new(config.region.clone()))
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            public_base,
        })
    }
}

pub(crate) fn parse_public_base(config: &StorageConfig) -> Result<url::Url, StorageError> {
    let raw = config
        .public_base_url
        .as_deref()
        .ok_or(StorageError::NotConfigured("STORAGE_PUBLIC_BASE_URL"))?;
    url::Url::parse(raw).map_err(|e| StorageError::PublicUrl(format!("{}: {}", raw, e)))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        path: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(path)
            .body(ByteStream::from(body));
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|error| StorageError::Put(error.to_string()))?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> Result<String, StorageError> {
        join_public_url(&self.public_base, bucket, path)
    }
}
