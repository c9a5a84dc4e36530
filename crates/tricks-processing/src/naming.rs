//! Stored image names
//!
//! Names are built from components (`label`, `hash`, dimensions, extension)
//! instead of patching an already formatted string, so a label that itself
//! looks like `640x480` can never be mistaken for the dimensions segment.

use sha2::{Digest, Sha256};
use std::fmt;
use tricks_core::constants::FILENAME_HASH_LEN;
use tricks_core::AppError;
use uuid::Uuid;

const MAX_LABEL_LEN: usize = 100;

/// Short hex hash of a fresh unique id.
pub fn generate_hash() -> String {
    let digest = Sha256::digest(Uuid::new_v4().as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(FILENAME_HASH_LEN);
    hash
}

/// Make a caller-provided label safe to embed in a filename.
pub fn sanitize_label(label: &str) -> String {
    let s: String = label
        .trim()
        .chars()
        .take(MAX_LABEL_LEN)
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim_matches('_').is_empty() {
        "image".to_string()
    } else {
        s
    }
}

/// Name the upload is moved under before it is processed:
/// `{label}-{hash}-{dimensions_format}.{extension}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateName {
    pub label: String,
    pub hash: String,
    pub dimensions_format: String,
    pub extension: String,
}

impl IntermediateName {
    pub fn generate(label: &str, dimensions_format: &str, extension: &str) -> Self {
        Self {
            label: sanitize_label(label),
            hash: generate_hash(),
            dimensions_format: sanitize_label(dimensions_format),
            extension: extension.to_lowercase(),
        }
    }

    /// Final name for the processed artifact: same label and hash, real dimensions.
    pub fn finalize(&self, width: u32, height: u32, extension: &str) -> StoredImageName {
        StoredImageName {
            label: self.label.clone(),
            hash: self.hash.clone(),
            width,
            height,
            extension: extension.to_lowercase(),
        }
    }
}

impl fmt::Display for IntermediateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}.{}",
            self.label, self.hash, self.dimensions_format, self.extension
        )
    }
}

/// Name of a processed image on disk: `{label}-{hash}-{width}x{height}.{extension}`.
///
/// The dimensions segment always matches the pixel size of the stored bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImageName {
    pub label: String,
    pub hash: String,
    pub width: u32,
    pub height: u32,
    pub extension: String,
}

impl StoredImageName {
    /// Bare name without extension, as persisted on the media record.
    pub fn stem(&self) -> String {
        format!("{}-{}-{}x{}", self.label, self.hash, self.width, self.height)
    }

    /// Parse a stored bare name (`label-hash-WxH`) back into its components.
    /// The extension is left empty.
    pub fn parse_stem(stem: &str) -> Result<Self, AppError> {
        let invalid = || AppError::InvalidInput(format!("Not a stored image name: {}", stem));

        let (rest, dimensions) = stem.rsplit_once('-').ok_or_else(invalid)?;
        let (label, hash) = rest.rsplit_once('-').ok_or_else(invalid)?;
        let (width, height) = dimensions.split_once('x').ok_or_else(invalid)?;

        if label.is_empty()
            || hash.len() != FILENAME_HASH_LEN
            || !hash.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(invalid());
        }

        Ok(Self {
            label: label.to_string(),
            hash: hash.to_string(),
            width: width.parse().map_err(|_| invalid())?,
            height: height.parse().map_err(|_| invalid())?,
            extension: String::new(),
        })
    }
}

impl fmt::Display for StoredImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.stem(), self.extension)
    }
}
