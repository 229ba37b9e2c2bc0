use async_trait::async_trait;
use bytes::Bytes;
use minio::s3::args::{BucketExistsArgs, MakeBucketArgs, PutObjectArgs, RemoveObjectArgs};
use minio::s3::client::{Client, ClientBuilder};
use minio::s3::creds::StaticProvider;
use minio::s3::http::BaseUrl;
use std::io::Cursor;
use tracing::{debug, error, info, instrument, warn};

use crate::config::MinioConfig;

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Operation error: {0}")]
    OperationError(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Object storage for survey photos and videos.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put_object(&self, object_name: &str, data: Bytes, content_type: &str) -> Result<(), MediaStoreError>;
    async fn remove_object(&self, object_name: &str) -> Result<(), MediaStoreError>;
    /// Public link for an object. Never touches the network.
    fn download_link(&self, object_name: &str) -> String;
}

/// `prefix/bucket/object`, with a single slash between parts.
pub fn build_download_link(links_prefix: &str, bucket_name: &str, object_name: &str) -> String {
    format!("{}/{}/{}", links_prefix.trim_end_matches('/'), bucket_name, object_name.trim_start_matches('/'))
}

#[derive(Debug, Clone)]
pub struct MinioMediaStore {
    client: Client,
    pub config: MinioConfig,
}

impl MinioMediaStore {
    #[instrument(skip(config), fields(endpoint = %config.endpoint, bucket = %config.bucket_name))]
    pub async fn new(config: MinioConfig) -> Result<Self, MediaStoreError> {
        info!("Initializing MinIO media store");

        config.validate().map_err(|e| {
            error!("MinIO configuration validation failed: {}", e);
            MediaStoreError::ConfigError(e.to_string())
        })?;

        let base_url = config.get_endpoint_url().parse::<BaseUrl>().map_err(|e| {
            error!("Failed to parse MinIO endpoint URL: {}", e);
            MediaStoreError::ConnectionError(format!("Invalid endpoint URL: {}", e))
        })?;

        let static_provider = StaticProvider::new(&config.access_key, &config.secret_key, None);
        let client = ClientBuilder::new(base_url)
            .provider(Some(Box::new(static_provider)))
            .build()
            .map_err(|e| {
                error!("Failed to create MinIO client: {}", e);
                MediaStoreError::ConnectionError(format!("Client creation failed: {}", e))
            })?;

        let store = Self { client, config };
        store.ensure_bucket_exists().await?;

        info!("MinIO media store ready");
        Ok(store)
    }

    #[instrument(skip(self))]
    async fn ensure_bucket_exists(&self) -> Result<(), MediaStoreError> {
        let bucket = &self.config.bucket_name;
        let exists_args =
            BucketExistsArgs::new(bucket).map_err(|e| MediaStoreError::InvalidArguments(e.to_string()))?;

        let exists = self.client.bucket_exists(&exists_args).await.map_err(|e| {
            error!("Failed to check if bucket exists: {}", e);
            MediaStoreError::OperationError(format!("Bucket exists check failed: {}", e))
        })?;
        if exists {
            debug!("Bucket '{}' already exists", bucket);
            return Ok(());
        }

        warn!("Bucket '{}' does not exist, creating it", bucket);
        let make_args = MakeBucketArgs::new(bucket).map_err(|e| MediaStoreError::InvalidArguments(e.to_string()))?;
        self.client.make_bucket(&make_args).await.map_err(|e| {
            error!("Failed to create bucket '{}': {}", bucket, e);
            MediaStoreError::OperationError(format!("Bucket creation failed: {}", e))
        })?;
        Ok(())
    }
}

#[async_trait]
impl MediaStore for MinioMediaStore {
    #[instrument(skip(self, data), fields(object_name = %object_name, size = data.len()))]
    async fn put_object(&self, object_name: &str, data: Bytes, content_type: &str) -> Result<(), MediaStoreError> {
        info!("Uploading object to bucket '{}'", self.config.bucket_name);

        let bucket_name = self.config.bucket_name.clone();
        let object_name_owned = object_name.to_string();
        let content_type_owned = content_type.to_string();
        let client = self.client.clone();

        // The client's put_object borrows a non-Send reader, so it runs off the async workers
        tokio::task::spawn_blocking(move || {
            let mut reader = Cursor::new(data);
            let data_len = reader.get_ref().len();

            let mut args = PutObjectArgs::new(&bucket_name, &object_name_owned, &mut reader, Some(data_len), None)
                .map_err(|e| MediaStoreError::InvalidArguments(e.to_string()))?;
            args.content_type = &content_type_owned;

            futures::executor::block_on(client.put_object(&mut args))
                .map_err(|e| MediaStoreError::OperationError(format!("Upload failed: {}", e)))?;
            Ok::<(), MediaStoreError>(())
        })
        .await
        .map_err(|e| {
            error!("Failed to join blocking task for put_object: {}", e);
            MediaStoreError::OperationError(format!("Join error: {}", e))
        })??;

        info!("Uploaded object '{}'", object_name);
        Ok(())
    }

    #[instrument(skip(self), fields(object_name = %object_name))]
    async fn remove_object(&self, object_name: &str) -> Result<(), MediaStoreError> {
        let args = RemoveObjectArgs::new(&self.config.bucket_name, object_name)
            .map_err(|e| MediaStoreError::InvalidArguments(e.to_string()))?;

        self.client.remove_object(&args).await.map_err(|e| {
            error!("Failed to delete object '{}': {}", object_name, e);
            MediaStoreError::OperationError(format!("Delete failed: {}", e))
        })?;
        info!("Deleted object '{}'", object_name);
        Ok(())
    }

    fn download_link(&self, object_name: &str) -> String {
        build_download_link(&self.config.links_prefix, &self.config.bucket_name, object_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_link_joins_with_single_slashes() {
        assert_eq!(
            build_download_link("http://cdn.local:9000/", "request-media", "/requests/abc/1.jpg"),
            "http://cdn.local:9000/request-media/requests/abc/1.jpg"
        );
    }
}
