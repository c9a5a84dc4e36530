//! Image upload pipeline: move → decode → crop → resize → encode → rename.
//!
//! The upload is first moved into its media directory under an intermediate
//! name, then decoded with the codec of the requested format, cropped, scaled
//! onto a canvas of the target size and encoded under its final name. The
//! intermediate file is removed once the final artifact is on disk.
//!
//! Failure handling:
//! - unknown directory key: `AppError::Configuration`, nothing is moved
//! - move failure: logged, `Ok(None)`; the caller reports a failed upload
//! - crop/decode/encode failure: returned as an error; the intermediate file
//!   is deleted or kept according to [`CropFailurePolicy`]

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::GenericImageView;
use tricks_core::{AppError, CropFailurePolicy, MediaConfig};
use tricks_storage::{LocalDirectoryStore, MediaStore};

use super::types::{UploadParameters, UploadedFile};
use crate::image::{CropRegion, ImageKind, ImageTransformer, ResizeFormat};
use crate::naming::{IntermediateName, StoredImageName};

#[derive(Clone)]
pub struct ImageUploader {
    store: Arc<dyn MediaStore>,
    crop_failure_policy: CropFailurePolicy,
    timeout: Duration,
}

impl ImageUploader {
    pub fn new(store: Arc<dyn MediaStore>, crop_failure_policy: CropFailurePolicy) -> Self {
        Self {
            store,
            crop_failure_policy,
            timeout: Duration::from_secs(tricks_core::constants::DEFAULT_UPLOAD_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        let store = Arc::new(LocalDirectoryStore::new(config.directories.clone()));
        Self::new(store, config.crop_failure_policy).with_timeout(config.upload_timeout)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn MediaStore> {
        &self.store
    }

    /// Process `file` into the directory configured for `target_key`.
    ///
    /// Returns the stored name (its `stem()` is what callers persist), or
    /// `None` when the upload could not be moved into place.
    pub fn upload(
        &self,
        file: &UploadedFile,
        target_key: &str,
        params: &UploadParameters,
    ) -> Result<Option<StoredImageName>, AppError> {
        let start = Instant::now();

        self.store.directory(target_key)?;
        let kind = ImageKind::parse(&params.extension)?;
        let size = ResizeFormat::new(params.resize_format.width, params.resize_format.height)?;
        let crop = CropRegion::from_json(&params.crop_json_data)?;

        let intermediate = IntermediateName::generate(
            &params.identifier_name,
            &params.dimensions_format,
            &file.guess_extension(),
        );

        let moved = match self
            .store
            .move_into(target_key, &file.path, &intermediate.to_string())
        {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    source = %file.path.display(),
                    key = %target_key,
                    "Failed to move upload into media directory"
                );
                return Ok(None);
            }
        };

        let extension = params.extension.trim().to_lowercase();
        match self.process(&moved, target_key, &intermediate, kind, crop, size, &extension) {
            Ok(stored) => {
                tracing::info!(
                    key = %target_key,
                    name = %stored,
                    width = stored.width,
                    height = stored.height,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Image upload processed"
                );
                Ok(Some(stored))
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    key = %target_key,
                    name = %intermediate,
                    "Image processing failed"
                );
                self.discard_intermediate(target_key, &intermediate);
                Err(e)
            }
        }
    }

    /// Run [`upload`](Self::upload) on the blocking pool, bounded by the configured timeout.
    ///
    /// On timeout the blocking work is not cancelled. It finishes in the
    /// background and any artifact it stores is removed, since the caller
    /// never learns its name.
    pub async fn upload_async(
        &self,
        file: UploadedFile,
        target_key: String,
        params: UploadParameters,
    ) -> Result<Option<StoredImageName>, AppError> {
        let uploader = self.clone();
        let key = target_key.clone();
        let mut task =
            tokio::task::spawn_blocking(move || uploader.upload(&file, &target_key, &params));

        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(joined) => {
                joined.map_err(|e| AppError::Internal(format!("Upload task failed: {}", e)))?
            }
            Err(_) => {
                let store = Arc::clone(&self.store);
                tokio::spawn(async move {
                    if let Ok(Ok(Some(stored))) = task.await {
                        remove_orphan(&*store, &key, &stored);
                    }
                });
                Err(AppError::Timeout(
                    u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                ))
            }
        }
    }

    /// Decode, transform and encode the moved upload. All bitmaps live inside
    /// this call and are dropped on every return path.
    #[allow(clippy::too_many_arguments)]
    fn process(
        &self,
        moved: &Path,
        target_key: &str,
        intermediate: &IntermediateName,
        kind: ImageKind,
        crop: CropRegion,
        size: ResizeFormat,
        extension: &str,
    ) -> Result<StoredImageName, AppError> {
        let codec = kind.codec();

        let decoded = (codec.decode)(moved).map_err(|e| {
            AppError::ImageProcessing(format!("Failed to decode {}: {}", moved.display(), e))
        })?;

        let canvas = ImageTransformer::crop_and_resize(decoded, crop, size, kind)?;
        let (width, height) = canvas.dimensions();

        let stored = intermediate.finalize(width, height, extension);
        let final_path = self.store.path_of(target_key, &stored.to_string())?;

        if let Err(e) = (codec.encode)(&canvas, &final_path) {
            if final_path != moved {
                // Never leave a half-written artifact behind.
                if let Err(remove_err) = self.store.remove(target_key, &stored.to_string()) {
                    tracing::warn!(
                        error = %remove_err,
                        path = %final_path.display(),
                        "Failed to delete partially written image"
                    );
                }
            }
            return Err(AppError::ImageProcessing(format!(
                "Failed to encode {}: {}",
                final_path.display(),
                e
            )));
        }
        drop(canvas);

        if final_path != moved {
            if let Err(e) = self.store.remove(target_key, &intermediate.to_string()) {
                tracing::warn!(
                    error = %e,
                    path = %moved.display(),
                    "Failed to delete intermediate upload"
                );
            }
        }

        Ok(stored)
    }

    fn discard_intermediate(&self, target_key: &str, intermediate: &IntermediateName) {
        let name = intermediate.to_string();
        match self.crop_failure_policy {
            CropFailurePolicy::Cleanup => match self.store.remove(target_key, &name) {
                Ok(()) => tracing::info!(
                    key = %target_key,
                    name = %name,
                    "Removed intermediate upload after failed processing"
                ),
                Err(e) => tracing::error!(
                    error = %e,
                    key = %target_key,
                    name = %name,
                    "Failed to remove intermediate upload"
                ),
            },
            CropFailurePolicy::Keep => tracing::warn!(
                key = %target_key,
                name = %name,
                "Keeping intermediate upload after failed processing"
            ),
        }
    }
}

/// Delete an artifact finished after its caller gave up waiting.
fn remove_orphan(store: &dyn MediaStore, key: &str, stored: &StoredImageName) {
    let name = stored.to_string();
    match store.remove(key, &name) {
        Ok(()) => tracing::warn!(
            key = %key,
            name = %name,
            "Removed image stored after upload timed out"
        ),
        Err(e) => tracing::error!(
            error = %e,
            key = %key,
            name = %name,
            "Failed to remove image stored after upload timed out"
        ),
    }
}
