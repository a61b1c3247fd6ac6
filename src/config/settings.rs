use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::config::env::{self, EnvKey};
use crate::error::{WorkerError, WorkerResult};

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_QUEUE_URL: &str =
    "https://sqs.us-west-2.amazonaws.com/211653061305/PhotoViewerSQS";
pub const DEFAULT_BUCKET: &str = "photoviewerstore";

/// Immutable settings handed to the worker once at start-up.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub aws_region: String,
    pub aws_access_key: String,
    pub aws_secret_key: String,
    pub queue_url: String,
    pub bucket: String,
    /// API endpoint override (MinIO, localstack). Uses path-style addressing.
    pub s3_endpoint: Option<String>,
    /// Base of the public HTTPS read path, bucket and key are appended.
    pub s3_public_url: String,
    pub artifact_dir: PathBuf,
}

/// JSON credentials file, same shape as the AWS SDK `config.json` files.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsFile {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: Option<String>,
}

impl CredentialsFile {
    pub fn load(path: &Path) -> WorkerResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            WorkerError::config(format!(
                "Failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            WorkerError::config(format!(
                "Invalid credentials file {}: {}",
                path.display(),
                e
            ))
        })
    }
}

impl WorkerConfig {
    pub fn new() -> WorkerResult<Self> {
        Self::from_source(env::get)
    }

    /// Builds the config from any key lookup; `new` uses the process environment.
    pub fn from_source<F>(lookup: F) -> WorkerResult<Self>
    where
        F: Fn(EnvKey) -> Option<String>,
    {
        let file = match lookup(EnvKey::CredentialsFile) {
            Some(path) => {
                let creds = CredentialsFile::load(Path::new(&path))?;
                info!("🔑 Loaded credentials from {}", path);
                Some(creds)
            }
            None => None,
        };

        let (aws_access_key, aws_secret_key, file_region) = match file {
            Some(creds) => (creds.access_key_id, creds.secret_access_key, creds.region),
            None => (
                required(&lookup, EnvKey::AwsAccessKey)?,
                required(&lookup, EnvKey::AwsSecretKey)?,
                None,
            ),
        };

        let aws_region = file_region
            .or_else(|| lookup(EnvKey::AwsRegion))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let s3_public_url = lookup(EnvKey::S3PublicUrl)
            .unwrap_or_else(|| format!("https://s3-{}.amazonaws.com", aws_region));

        Ok(Self {
            queue_url: lookup(EnvKey::QueueUrl).unwrap_or_else(|| DEFAULT_QUEUE_URL.to_string()),
            bucket: lookup(EnvKey::BucketName).unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            s3_endpoint: lookup(EnvKey::S3Endpoint),
            s3_public_url,
            artifact_dir: lookup(EnvKey::ArtifactDir)
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            aws_region,
            aws_access_key,
            aws_secret_key,
        })
    }
}

fn required<F>(lookup: &F, key: EnvKey) -> WorkerResult<String>
where
    F: Fn(EnvKey) -> Option<String>,
{
    lookup(key).ok_or_else(|| WorkerError::config(format!("{} not set", key.as_str())))
}
