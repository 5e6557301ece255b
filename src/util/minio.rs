use async_trait::async_trait;
use minio::s3::builders::ObjectToDelete;
use minio::s3::client::{Client, ClientBuilder};
use minio::s3::creds::StaticProvider;
use minio::s3::http::BaseUrl;
use minio::s3::types::S3Api;
use tracing::{debug, error, info, instrument, warn};

use crate::config::MinioConfig;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Operation error: {0}")]
    OperationError(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Boundary to the binary object store. The engine only ever needs to hand
/// out transfer URLs and remove stored objects; everything else is the
/// store's concern.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// URL a client PUTs the object body to.
    fn upload_url(&self, object_key: &str) -> Result<String, StorageError>;

    /// URL a client GETs the object body from.
    fn download_url(&self, object_key: &str) -> Result<String, StorageError>;

    /// Remove the stored object. Callers on the cascade path treat failure
    /// as non-fatal.
    async fn remove_object(&self, object_key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct MinioService {
    client: Client,
    pub config: MinioConfig,
}

impl MinioService {
    /// Create a new MinIO service instance
    #[instrument(skip(config), fields(endpoint = %config.endpoint, bucket = %config.bucket_name))]
    pub async fn new(config: MinioConfig) -> Result<Self, StorageError> {
        info!("Initializing MinIO service");

        config.validate().map_err(|e| {
            error!("MinIO configuration validation failed: {}", e);
            StorageError::ConfigError(e.to_string())
        })?;

        let base_url = config.get_endpoint_url().parse::<BaseUrl>().map_err(|e| {
            error!("Failed to parse MinIO endpoint URL: {}", e);
            StorageError::ConnectionError(format!("Invalid endpoint URL: {}", e))
        })?;

        debug!("Creating MinIO client with endpoint: {}", config.get_endpoint_url());

        let static_provider = StaticProvider::new(&config.access_key, &config.secret_key, None);

        let client = ClientBuilder::new(base_url)
            .provider(Some(Box::new(static_provider)))
            .build()
            .map_err(|e| {
                error!("Failed to create MinIO client: {}", e);
                StorageError::ConnectionError(format!("Client creation failed: {}", e))
            })?;

        let service = Self { client, config };

        service.ensure_bucket_exists().await?;

        info!("MinIO service initialized successfully");
        Ok(service)
    }

    /// Ensure the configured bucket exists, create if it doesn't
    #[instrument(skip(self))]
    async fn ensure_bucket_exists(&self) -> Result<(), StorageError> {
        info!("Checking if bucket '{}' exists", self.config.bucket_name);

        let exists = self
            .client
            .bucket_exists(&self.config.bucket_name)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to check if bucket exists: {}", e);
                StorageError::OperationError(format!("Bucket exists check failed: {}", e))
            })?
            .exists;

        if exists {
            info!("Bucket '{}' already exists", self.config.bucket_name);
            return Ok(());
        }

        warn!("Bucket '{}' does not exist, creating it", self.config.bucket_name);

        self.client
            .create_bucket(&self.config.bucket_name)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to create bucket '{}': {}", self.config.bucket_name, e);
                StorageError::OperationError(format!("Bucket creation failed: {}", e))
            })?;

        info!("Successfully created bucket '{}'", self.config.bucket_name);
        Ok(())
    }

    fn object_url(&self, base: &str, object_key: &str) -> String {
        format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            self.config.bucket_name,
            object_key
        )
    }
}

#[async_trait]
impl ObjectStore for MinioService {
    fn upload_url(&self, object_key: &str) -> Result<String, StorageError> {
        if object_key.is_empty() {
            return Err(StorageError::InvalidArguments(
                "Object key cannot be empty".to_string(),
            ));
        }
        Ok(self.object_url(&self.config.get_endpoint_url(), object_key))
    }

    fn download_url(&self, object_key: &str) -> Result<String, StorageError> {
        if object_key.is_empty() {
            return Err(StorageError::InvalidArguments(
                "Object key cannot be empty".to_string(),
            ));
        }
        Ok(self.object_url(&self.config.links_prefix, object_key))
    }

    /// Delete an object from MinIO
    #[instrument(skip(self), fields(object_key = %object_key))]
    async fn remove_object(&self, object_key: &str) -> Result<(), StorageError> {
        info!(
            "Deleting object '{}' from bucket '{}'",
            object_key, self.config.bucket_name
        );

        self.client
            .remove_object(&self.config.bucket_name, ObjectToDelete::from(object_key))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to delete object '{}': {}", object_key, e);
                StorageError::OperationError(format!("Delete failed: {}", e))
            })?;

        info!("Successfully deleted object '{}'", object_key);
        Ok(())
    }
}
