//! Configuration module
//!
//! Media settings are read from the environment (and an optional `.env` file):
//!
//! - `MEDIA_DIRECTORIES` (required): `key=path` pairs separated by commas,
//!   e.g. `avatar=/srv/media/avatars,trick_image=/srv/media/tricks`
//! - `MEDIA_CROP_FAILURE_POLICY`: `cleanup` (default) or `keep`
//! - `MEDIA_MAX_FILE_SIZE_MB`: default 5
//! - `MEDIA_ALLOWED_EXTENSIONS`: default `jpeg,jpg,png,gif`
//! - `MEDIA_UPLOAD_TIMEOUT_SECS`: default 30

use std::collections::BTreeMap;
use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    ALLOWED_IMAGE_EXTENSIONS, DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_UPLOAD_TIMEOUT_SECS,
};
use crate::error::AppError;

/// What the upload pipeline does with the already-moved upload when a later
/// step (crop, decode, encode) fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropFailurePolicy {
    /// Delete the intermediate file; nothing is left on disk.
    #[default]
    Cleanup,
    /// Leave the intermediate file in place for inspection.
    Keep,
}

impl FromStr for CropFailurePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cleanup" => Ok(CropFailurePolicy::Cleanup),
            "keep" => Ok(CropFailurePolicy::Keep),
            _ => Err(AppError::Configuration(format!(
                "Invalid crop failure policy: {}",
                s
            ))),
        }
    }
}

impl Display for CropFailurePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CropFailurePolicy::Cleanup => write!(f, "cleanup"),
            CropFailurePolicy::Keep => write!(f, "keep"),
        }
    }
}

/// Static table from a symbolic key (e.g. `avatar`) to an absolute directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDirectories(BTreeMap<String, PathBuf>);

impl MediaDirectories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert(key, path);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) {
        self.0.insert(key.into(), path.into());
    }

    /// Parse `key=path,key=path`.
    pub fn parse(spec: &str) -> Result<Self, AppError> {
        let mut directories = Self::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, path) = entry.split_once('=').ok_or_else(|| {
                AppError::Configuration(format!(
                    "MEDIA_DIRECTORIES entry '{}' must be of the form key=path",
                    entry
                ))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(AppError::Configuration(format!(
                    "MEDIA_DIRECTORIES entry '{}' has an empty key",
                    entry
                )));
            }
            directories.insert(key, path.trim());
        }
        Ok(directories)
    }

    /// Look up the directory for `key`.
    pub fn resolve(&self, key: &str) -> Result<&Path, AppError> {
        self.0
            .get(key)
            .map(PathBuf::as_path)
            .ok_or_else(|| AppError::Configuration(format!("Unknown directory key: {}", key)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.is_empty() {
            return Err(AppError::Configuration(
                "MEDIA_DIRECTORIES must name at least one directory".to_string(),
            ));
        }
        for (key, path) in &self.0 {
            if !path.is_absolute() {
                return Err(AppError::Configuration(format!(
                    "Directory for '{}' must be an absolute path, got {}",
                    key,
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Media pipeline configuration
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub directories: MediaDirectories,
    pub crop_failure_policy: CropFailurePolicy,
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub upload_timeout: Duration,
}

impl MediaConfig {
    /// Build a configuration with defaults around an existing directory table.
    pub fn new(directories: MediaDirectories) -> Self {
        Self {
            directories,
            crop_failure_policy: CropFailurePolicy::default(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_extensions: ALLOWED_IMAGE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let directories = lookup("MEDIA_DIRECTORIES")
            .ok_or_else(|| AppError::Configuration("MEDIA_DIRECTORIES must be set".to_string()))
            .and_then(|spec| MediaDirectories::parse(&spec))?;

        let crop_failure_policy = match lookup("MEDIA_CROP_FAILURE_POLICY") {
            Some(value) => value.parse()?,
            None => CropFailurePolicy::default(),
        };

        let max_file_size_mb = lookup("MEDIA_MAX_FILE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let allowed_extensions = lookup("MEDIA_ALLOWED_EXTENSIONS")
            .map(|s| {
                s.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                ALLOWED_IMAGE_EXTENSIONS
                    .iter()
                    .map(|e| e.to_string())
                    .collect()
            });

        let upload_timeout_secs = lookup("MEDIA_UPLOAD_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS);

        let config = Self {
            directories,
            crop_failure_policy,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions,
            upload_timeout: Duration::from_secs(upload_timeout_secs),
        };

        tracing::debug!(
            directories = ?config.directories.keys().collect::<Vec<_>>(),
            crop_failure_policy = %config.crop_failure_policy,
            max_file_size_bytes = config.max_file_size_bytes,
            "Loaded media configuration"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.directories.validate()?;

        if self.max_file_size_bytes == 0 {
            return Err(AppError::Configuration(
                "MEDIA_MAX_FILE_SIZE_MB must be greater than 0".to_string(),
            ));
        }

        if self.upload_timeout.is_zero() {
            return Err(AppError::Configuration(
                "MEDIA_UPLOAD_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if let Some(unknown) = self
            .allowed_extensions
            .iter()
            .find(|e| !ALLOWED_IMAGE_EXTENSIONS.contains(&e.as_str()))
        {
            return Err(AppError::Configuration(format!(
                "Unsupported image extension in MEDIA_ALLOWED_EXTENSIONS: {}",
                unknown
            )));
        }

        Ok(())
    }
}
