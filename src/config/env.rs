use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvKey {
    AwsAccessKey,
    AwsSecretKey,
    AwsRegion,
    CredentialsFile,
    QueueUrl,
    BucketName,
    S3Endpoint,
    S3PublicUrl,
    ArtifactDir,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::AwsAccessKey => "AWS_ACCESS_KEY_ID",
            EnvKey::AwsSecretKey => "AWS_SECRET_ACCESS_KEY",
            EnvKey::AwsRegion => "AWS_REGION",
            EnvKey::CredentialsFile => "WORKER_CREDENTIALS_FILE",
            EnvKey::QueueUrl => "QUEUE_URL",
            EnvKey::BucketName => "BUCKET_NAME",
            EnvKey::S3Endpoint => "S3_ENDPOINT",
            EnvKey::S3PublicUrl => "S3_PUBLIC_URL",
            EnvKey::ArtifactDir => "ARTIFACT_DIR",
        }
    }
}

/// Reads a key from the process environment. Blank values count as unset.
pub fn get(key: EnvKey) -> Option<String> {
    env::var(key.as_str())
        .ok()
        .filter(|val| !val.trim().is_empty())
}
