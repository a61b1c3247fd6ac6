use async_trait::async_trait;
use aws_sdk_sqs::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::Message;
use aws_sdk_sqs::Client;
use tracing::{debug, info};

use super::{JobQueue, QueueMessage};
use crate::config::settings::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

#[derive(Clone)]
pub struct SqsQueueService {
    client: Client,
    queue_url: String,
}

impl SqsQueueService {
    pub fn new(config: &WorkerConfig) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key,
            &config.aws_secret_key,
            None,
            None,
            "static",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .credentials_provider(credentials)
            .build();

        let client = Client::from_conf(sdk_config);

        info!("✅ SQS client ready for {}", config.queue_url);

        Self {
            client,
            queue_url: config.queue_url.clone(),
        }
    }
}

#[async_trait]
impl JobQueue for SqsQueueService {
    async fn receive(&self) -> WorkerResult<QueueMessage> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(1)
            .send()
            .await
            .map_err(|e| {
                WorkerError::transport(format!("ReceiveMessage failed: {}", DisplayErrorContext(&e)))
            })?;

        let message = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(WorkerError::NoMessageAvailable)?;

        info!("📦 Received message");
        into_queue_message(message)
    }

    async fn acknowledge(&self, receipt_handle: &str) -> WorkerResult<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| {
                WorkerError::transport(format!("DeleteMessage failed: {}", DisplayErrorContext(&e)))
            })?;

        debug!("Deleted message from queue");
        Ok(())
    }
}

fn into_queue_message(message: Message) -> WorkerResult<QueueMessage> {
    let receipt_handle = message
        .receipt_handle
        .ok_or_else(|| WorkerError::transport("message has no receipt handle"))?;

    let body = message
        .body
        .ok_or_else(|| WorkerError::malformed_job("message has no body"))?;

    Ok(QueueMessage {
        body,
        receipt_handle,
    })
}
