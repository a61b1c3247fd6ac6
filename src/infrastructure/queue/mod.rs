use async_trait::async_trait;

use crate::error::WorkerResult;

pub mod sqs;

/// A received message: the serialized job plus the token that acknowledges it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub body: String,
    pub receipt_handle: String,
}

/// At-least-once job queue. A received message stays invisible to other
/// consumers for the provider's visibility timeout and is redelivered unless
/// acknowledged.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Pulls at most one message. Fails with `NoMessageAvailable` when empty.
    async fn receive(&self) -> WorkerResult<QueueMessage>;

    async fn acknowledge(&self, receipt_handle: &str) -> WorkerResult<()>;
}
