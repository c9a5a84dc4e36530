use crate::keys::validate_filename;
use crate::traits::{MediaStore, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};
use tricks_core::MediaDirectories;

/// Local filesystem store over the configured directory table
#[derive(Clone, Debug)]
pub struct LocalDirectoryStore {
    directories: MediaDirectories,
}

impl LocalDirectoryStore {
    /// Create a new store
    ///
    /// Directories are created lazily on first write, so a store can be built
    /// before the media volume is mounted.
    pub fn new(directories: MediaDirectories) -> Self {
        Self { directories }
    }

    pub fn directories(&self) -> &MediaDirectories {
        &self.directories
    }

    fn ensure_dir(&self, dir: &Path) -> StorageResult<()> {
        fs::create_dir_all(dir)?;
        Ok(())
    }
}

impl MediaStore for LocalDirectoryStore {
    fn directory(&self, key: &str) -> StorageResult<PathBuf> {
        self.directories
            .resolve(key)
            .map(Path::to_path_buf)
            .map_err(|_| StorageError::UnknownDirectory(key.to_string()))
    }

    fn move_into(&self, key: &str, source: &Path, filename: &str) -> StorageResult<PathBuf> {
        validate_filename(filename)?;
        let dir = self.directory(key)?;
        self.ensure_dir(&dir)?;
        let target = dir.join(filename);

        let start = std::time::Instant::now();

        // Same-filesystem rename; a cross-device move surfaces as an error.
        fs::rename(source, &target).map_err(|e| StorageError::MoveFailed {
            from: source.to_path_buf(),
            to: target.clone(),
            source: e,
        })?;

        tracing::info!(
            from = %source.display(),
            path = %target.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Moved upload into media directory"
        );

        Ok(target)
    }

    fn path_of(&self, key: &str, filename: &str) -> StorageResult<PathBuf> {
        validate_filename(filename)?;
        Ok(self.directory(key)?.join(filename))
    }

    fn remove(&self, key: &str, filename: &str) -> StorageResult<()> {
        let path = self.path_of(key, filename)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), key = %key, "Deleted media file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed { path, source: e }),
        }
    }

    fn exists(&self, key: &str, filename: &str) -> StorageResult<bool> {
        let path = self.path_of(key, filename)?;
        Ok(path.is_file())
    }

    fn locate(&self, key: &str, stem: &str, extensions: &[&str]) -> StorageResult<PathBuf> {
        validate_filename(stem)?;
        let dir = self.directory(key)?;

        extensions
            .iter()
            .map(|ext| dir.join(format!("{}.{}", stem, ext)))
            .find(|path| path.is_file())
            .ok_or_else(|| StorageError::NotFound(stem.to_string()))
    }
}
