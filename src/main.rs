use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod infrastructure;
mod modules;
#[cfg(test)]
mod testing;
mod workers;

use config::settings::WorkerConfig;
use infrastructure::queue::sqs::SqsQueueService;
use infrastructure::storage::s3::StorageService;
use workers::converter::ConverterWorker;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting photo worker...");

    let config = WorkerConfig::new().context("Failed to load worker configuration")?;

    tokio::fs::create_dir_all(&config.artifact_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create artifact directory {}",
                config.artifact_dir.display()
            )
        })?;

    let queue = SqsQueueService::new(&config);
    let storage = StorageService::new(&config).context("Failed to set up storage client")?;

    ConverterWorker::new(queue, storage, config.artifact_dir.clone())
        .run()
        .await;

    Ok(())
}
