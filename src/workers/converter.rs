use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::{WorkerError, WorkerResult};
use crate::infrastructure::queue::JobQueue;
use crate::infrastructure::storage::{self, ObjectStore};
use crate::modules::conversion::events::{ConversionJob, JobOption};
use crate::modules::conversion::service::{Artifact, ConversionService};

const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Receiving,
    Validating,
    Converting,
    Persisting,
    Acknowledging,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Uploaded { key: String },
    Removed { key: String },
}

pub struct ConverterWorker<Q, S> {
    queue: Q,
    storage: S,
    artifact_dir: PathBuf,
    state: WorkerState,
}

impl<Q, S> ConverterWorker<Q, S>
where
    Q: JobQueue,
    S: ObjectStore,
{
    pub fn new(queue: Q, storage: S, artifact_dir: PathBuf) -> Self {
        Self {
            queue,
            storage,
            artifact_dir,
            state: WorkerState::Idle,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub async fn run(mut self) {
        info!("🖼️ Converter worker polling for jobs");

        loop {
            match self.process_next().await {
                Ok(JobOutcome::Uploaded { key }) => {
                    info!("✅ Conversion successfully done: {}", key);
                }
                Ok(JobOutcome::Removed { key }) => {
                    info!("✅ Removal successfully done: {}", key);
                }
                Err(e) if e.is_idle() => {
                    debug!("{}", e);
                    tokio::time::sleep(IDLE_POLL_INTERVAL).await;
                }
                Err(e) => {
                    error!("❌ {}", e);
                }
            }
        }
    }

    /// One full pass through the pipeline. Always ends back in `Idle`.
    pub async fn process_next(&mut self) -> WorkerResult<JobOutcome> {
        let result = self.pipeline().await;
        self.transition(WorkerState::Idle);
        result
    }

    async fn pipeline(&mut self) -> WorkerResult<JobOutcome> {
        self.transition(WorkerState::Receiving);
        let message = self.queue.receive().await?;

        self.transition(WorkerState::Validating);
        let job = ConversionJob::parse(&message.body)?;
        info!("Processing job: {} ({})", job.key, job.option);

        self.transition(WorkerState::Converting);
        let artifact = ConversionService::convert(&self.storage, &self.artifact_dir, &job).await?;

        self.transition(WorkerState::Persisting);
        let outcome = self.persist(&job, &artifact).await?;

        // A failure here leaves the message for redelivery, so the job runs again.
        self.transition(WorkerState::Acknowledging);
        self.queue.acknowledge(&message.receipt_handle).await?;
        info!("Msg deleted from queue");

        Ok(outcome)
    }

    async fn persist(&self, job: &ConversionJob, artifact: &Artifact) -> WorkerResult<JobOutcome> {
        let stored = match job.option {
            JobOption::Remove => {
                let key = storage::result_key(&job.key);
                self.storage
                    .delete(&key)
                    .await
                    .map(|_| JobOutcome::Removed { key })
            }
            JobOption::Apply(_) => {
                let key = artifact.result_key();
                self.storage
                    .upload_public(&artifact.path, &key, &artifact.content_type)
                    .await
                    .map(|_| JobOutcome::Uploaded { key })
            }
        };

        match stored {
            Ok(outcome) => {
                // The storage side effect stands even if this fails.
                artifact.remove().await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(cleanup) = artifact.remove().await {
                    warn!("Failed to remove local file: {}", cleanup);
                }
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: WorkerState) {
        debug!("worker state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
