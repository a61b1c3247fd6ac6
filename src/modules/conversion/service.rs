use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::events::{ConversionJob, JobOption};
use super::filters;
use crate::error::{WorkerError, WorkerResult};
use crate::infrastructure::storage::{self, ObjectStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: String,
}

impl Artifact {
    pub fn result_key(&self) -> String {
        storage::result_key(&self.file_name)
    }

    pub async fn remove(&self) -> WorkerResult<()> {
        tokio::fs::remove_file(&self.path)
            .await
            .map_err(|source| WorkerError::LocalCleanup {
                path: self.path.clone(),
                source,
            })?;

        debug!("Removed local file {}", self.path.display());
        Ok(())
    }
}

pub struct ConversionService;

impl ConversionService {
    pub async fn convert<S>(
        store: &S,
        artifact_dir: &Path,
        job: &ConversionJob,
    ) -> WorkerResult<Artifact>
    where
        S: ObjectStore + ?Sized,
    {
        let data = store.fetch(&job.key).await?;

        let (format, extension) = output_format(&job.key);
        let file_name = artifact_name(&extension);
        let path = artifact_dir.join(&file_name);
        let content_type = mime_guess::from_ext(&extension)
            .first_or(mime::IMAGE_PNG)
            .to_string();

        let option = job.option;
        let target = path.clone();
        let rendered = tokio::task::spawn_blocking(move || render(&data, option, format, &target))
            .await
            .unwrap_or_else(|e| Err(WorkerError::write(format!("Conversion task aborted: {}", e))));

        if let Err(e) = rendered {
            // A partial write must not outlive the failed job.
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove local file {}: {}", path.display(), cleanup);
                }
            }
            return Err(e);
        }

        info!("🖼️ File converted ({}) to {}", job.option, path.display());

        Ok(Artifact {
            path,
            file_name,
            content_type,
        })
    }
}

fn render(data: &[u8], option: JobOption, format: ImageFormat, path: &Path) -> WorkerResult<()> {
    let image = image::load_from_memory(data)
        .map_err(|e| WorkerError::fetch(format!("Failed to decode image: {}", e)))?;

    let image = match option.filter() {
        Some(filter) => filters::apply(image, filter),
        None => image,
    };

    // JPEG has no alpha channel; the other encoders all take 8-bit RGBA.
    let image = match format {
        ImageFormat::Png => image,
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => DynamicImage::ImageRgba8(image.to_rgba8()),
    };

    // Encode in memory so an encoder failure never leaves a file behind.
    let mut encoded = Cursor::new(Vec::new());
    image
        .write_to(&mut encoded, format)
        .map_err(|e| WorkerError::write(format!("Failed to encode {:?}: {}", format, e)))?;

    fs::write(path, encoded.into_inner())
        .map_err(|e| WorkerError::write(format!("Failed to save {}: {}", path.display(), e)))
}

fn encodes_rgba8(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::Tiff
            | ImageFormat::WebP
            | ImageFormat::Tga
            | ImageFormat::Ico
            | ImageFormat::Qoi
            | ImageFormat::Pnm
            | ImageFormat::Avif
    )
}

// Keep the source's format when its encoder takes 8-bit images, PNG otherwise.
fn output_format(key: &str) -> (ImageFormat, String) {
    Path::new(key)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            let ext = ext.to_ascii_lowercase();
            ImageFormat::from_extension(&ext)
                .filter(|format| format.writing_enabled() && encodes_rgba8(*format))
                .map(|format| (format, ext))
        })
        .unwrap_or_else(|| (ImageFormat::Png, "png".to_string()))
}

// `<unix millis>-<random>.<ext>`
fn artifact_name(extension: &str) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}.{}", millis, &suffix[..8], extension)
}
