use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::WorkerResult;

pub mod s3;

/// Namespace that converted images are written under, and that delete jobs
/// remove from.
pub const RESULTS_PREFIX: &str = "photos/";

pub fn result_key(name: &str) -> String {
    format!("{}{}", RESULTS_PREFIX, name)
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads an object through the bucket's public read path.
    async fn fetch(&self, key: &str) -> WorkerResult<Bytes>;

    /// Writes a local file under `key` with public-read visibility.
    async fn upload_public(&self, path: &Path, key: &str, content_type: &str) -> WorkerResult<()>;

    /// Removes `key`. Fails with `StorageDelete` when the object is already gone.
    async fn delete(&self, key: &str) -> WorkerResult<()>;
}
