use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::{debug, info};
use url::Url;

use super::ObjectStore;
use crate::config::settings::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
    pub bucket: String,
    http: reqwest::Client,
    public_base: Url,
}

impl StorageService {
    pub fn new(config: &WorkerConfig) -> WorkerResult<Self> {
        let credentials = Credentials::new(
            &config.aws_access_key,
            &config.aws_secret_key,
            None,
            None,
            "static",
        );

        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.s3_endpoint {
            builder = builder
                .endpoint_url(endpoint)
                .force_path_style(true); // Required for MinIO
        }

        let public_base = Url::parse(&config.s3_public_url).map_err(|e| {
            WorkerError::config(format!(
                "Invalid public storage URL {}: {}",
                config.s3_public_url, e
            ))
        })?;

        let client = Client::from_conf(builder.build());

        info!("✅ S3 client ready for bucket {}", config.bucket);

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            http: reqwest::Client::new(),
            public_base,
        })
    }

    pub fn public_url(&self, key: &str) -> WorkerResult<Url> {
        public_object_url(&self.public_base, &self.bucket, key)
    }
}

/// `<base>/<bucket>/<key>` with every path segment percent-encoded and the
/// key's `/` separators kept.
pub fn public_object_url(base: &Url, bucket: &str, key: &str) -> WorkerResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| WorkerError::fetch(format!("{} cannot carry an object path", base)))?
        .pop_if_empty()
        .push(bucket)
        .extend(key.split('/'));
    Ok(url)
}

#[async_trait]
impl ObjectStore for StorageService {
    async fn fetch(&self, key: &str) -> WorkerResult<Bytes> {
        let url = self.public_url(key)?;
        debug!("⬇️ Downloading {}", url);

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| WorkerError::fetch(format!("GET {} failed: {}", url, e)))?;

        let data = response
            .bytes()
            .await
            .map_err(|e| WorkerError::fetch(format!("Failed to read body of {}: {}", url, e)))?;

        info!("⬇️ Downloaded {} bytes", data.len());
        Ok(data)
    }

    async fn upload_public(&self, path: &Path, key: &str, content_type: &str) -> WorkerResult<()> {
        let body = ByteStream::from_path(path).await.map_err(|e| {
            WorkerError::storage_write(format!("Failed to open {}: {}", path.display(), e))
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                WorkerError::storage_write(format!(
                    "PutObject {} failed: {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        info!("⬆️ Image saved in bucket as {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> WorkerResult<()> {
        // DeleteObject succeeds on missing keys, so check first.
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|err| err.is_not_found()) {
                    WorkerError::storage_delete(format!("{} does not exist", key))
                } else {
                    WorkerError::storage_delete(format!(
                        "HeadObject {} failed: {}",
                        key,
                        DisplayErrorContext(&e)
                    ))
                }
            })?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                WorkerError::storage_delete(format!(
                    "DeleteObject {} failed: {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        info!("🗑️ Image removed from bucket: {}", key);
        Ok(())
    }
}
