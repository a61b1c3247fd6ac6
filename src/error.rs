use std::path::PathBuf;

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("No messages on the queue")]
    NoMessageAvailable,

    #[error("Queue transport error: {0}")]
    Transport(String),

    #[error("Invalid message: {0}")]
    MalformedJob(String),

    #[error("Wrong option: {0}")]
    UnsupportedOption(String),

    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    #[error("Failed to write converted file: {0}")]
    Write(String),

    #[error("Failed to save image in bucket: {0}")]
    StorageWrite(String),

    #[error("Failed to remove image from bucket: {0}")]
    StorageDelete(String),

    #[error("Failed to remove local file {}: {source}", .path.display())]
    LocalCleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WorkerError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn malformed_job(msg: impl Into<String>) -> Self {
        Self::MalformedJob(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    pub fn storage_write(msg: impl Into<String>) -> Self {
        Self::StorageWrite(msg.into())
    }

    pub fn storage_delete(msg: impl Into<String>) -> Self {
        Self::StorageDelete(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    // An empty queue is the idle case, not a job failure.
    pub fn is_idle(&self) -> bool {
        matches!(self, WorkerError::NoMessageAvailable)
    }
}
