//! Filesystem bucket store implementation
//!
//! [`LocalBucketStore`] mirrors the object-storage calls the application makes against the
//! platform: create a file under a generated id, read it back, look up its metadata and delete
//! it. Blobs are immutable; replacing content means creating a new id.
//!
//! # Implementation Notes
//!
//! - The root directory is created if missing and canonicalised at construction time
//! - Bucket ids become a single path segment and are restricted to `[A-Za-z0-9_-]`
//! - Content is written before the metadata sidecar, so a blob without `metadata.yaml` is
//!   treated as not found and never served half-written

use crate::constants::SIGNATURE_ALGORITHM;
use crate::{FilesError, CONTENT_FILE_NAME, METADATA_FILE_NAME};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use storeit_types::NonEmptyText;
use storeit_uuid::UniqueId;

/// Metadata for a stored blob.
///
/// Serialised to YAML next to the content so the bucket stays self-describing.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct BucketFile {
    /// Generated identifier of the blob
    pub id: UniqueId,

    /// Bucket the blob lives in
    pub bucket_id: NonEmptyText,

    /// Original file name supplied by the uploader
    pub name: NonEmptyText,

    /// Size of the content in bytes
    pub size_original: u64,

    /// Detected media type (MIME type), best effort only
    pub media_type: Option<NonEmptyText>,

    /// Hashing algorithm used for `signature`
    pub signature_algorithm: NonEmptyText,

    /// Hexadecimal digest of the content
    pub signature: NonEmptyText,

    /// UTC timestamp when the blob was stored
    pub created_at: DateTime<Utc>,
}

/// Bucket store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalBucketStore {
    root_directory: PathBuf,
}

impl LocalBucketStore {
    /// Opens (creating if needed) a bucket store rooted at `root_directory`.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidRootDirectory`] if the path exists but is not a directory or
    /// cannot be created or canonicalised.
    pub fn new(root_directory: &Path) -> Result<Self, FilesError> {
        if root_directory.exists() && !root_directory.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root_directory.display()
            )));
        }

        fs::create_dir_all(root_directory).map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot create {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        let root_directory = root_directory.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        Ok(Self { root_directory })
    }

    /// Stores `bytes` as a new blob `file_id` in `bucket_id`.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - the bucket id or file name is invalid
    /// - a blob with the same id already exists
    /// - any directory or file write fails (I/O)
    pub fn create_file(
        &self,
        bucket_id: &str,
        file_id: &UniqueId,
        name: &str,
        bytes: &[u8],
    ) -> Result<BucketFile, FilesError> {
        let name = NonEmptyText::new(name)
            .map_err(|_| FilesError::InvalidFileName(name.to_string()))?;
        let blob_dir = self.blob_dir(bucket_id, file_id)?;

        if let Some(parent) = blob_dir.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir(&blob_dir).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => FilesError::FileAlreadyExists(file_id.to_string()),
            _ => FilesError::Io(e),
        })?;

        let digest = hex::encode(Sha256::digest(bytes));
        let media_type = infer::get(bytes).and_then(|kind| NonEmptyText::new(kind.mime_type()).ok());

        let metadata = BucketFile {
            id: file_id.clone(),
            bucket_id: text(bucket_id)?,
            name,
            size_original: bytes.len() as u64,
            media_type,
            signature_algorithm: text(SIGNATURE_ALGORITHM)?,
            signature: text(&digest)?,
            created_at: Utc::now(),
        };

        let written = fs::write(blob_dir.join(CONTENT_FILE_NAME), bytes)
            .map_err(FilesError::from)
            .and_then(|()| Ok(serde_yaml::to_string(&metadata)?))
            .and_then(|yaml| Ok(fs::write(blob_dir.join(METADATA_FILE_NAME), yaml)?));

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_dir_all(&blob_dir) {
                tracing::warn!(
                    "failed to clean up partial blob {}: {}",
                    blob_dir.display(),
                    cleanup
                );
            }
            return Err(e);
        }

        tracing::debug!(bucket = bucket_id, file = %file_id, "stored blob");
        Ok(metadata)
    }

    /// Returns the metadata of a stored blob.
    pub fn get_file(&self, bucket_id: &str, file_id: &UniqueId) -> Result<BucketFile, FilesError> {
        let metadata_path = self.blob_dir(bucket_id, file_id)?.join(METADATA_FILE_NAME);
        let yaml = fs::read_to_string(&metadata_path).map_err(|e| not_found(e, file_id))?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    /// Returns the content of a stored blob.
    pub fn read_file(&self, bucket_id: &str, file_id: &UniqueId) -> Result<Vec<u8>, FilesError> {
        self.get_file(bucket_id, file_id)?;
        let content_path = self.blob_dir(bucket_id, file_id)?.join(CONTENT_FILE_NAME);
        fs::read(&content_path).map_err(|e| not_found(e, file_id))
    }

    /// Removes a stored blob and its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::FileNotFound`] if the blob does not exist.
    pub fn delete_file(&self, bucket_id: &str, file_id: &UniqueId) -> Result<(), FilesError> {
        let blob_dir = self.blob_dir(bucket_id, file_id)?;
        fs::remove_dir_all(&blob_dir).map_err(|e| not_found(e, file_id))?;
        tracing::debug!(bucket = bucket_id, file = %file_id, "deleted blob");
        Ok(())
    }

    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    fn bucket_dir(&self, bucket_id: &str) -> Result<PathBuf, FilesError> {
        let valid = !bucket_id.is_empty()
            && bucket_id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(FilesError::InvalidBucketId(bucket_id.to_string()));
        }
        Ok(self.root_directory.join(bucket_id))
    }

    fn blob_dir(&self, bucket_id: &str, file_id: &UniqueId) -> Result<PathBuf, FilesError> {
        Ok(file_id.sharded_path(&self.bucket_dir(bucket_id)?))
    }
}

fn text(value: &str) -> Result<NonEmptyText, FilesError> {
    NonEmptyText::new(value).map_err(|_| FilesError::InvalidFileName(value.to_string()))
}

fn not_found(e: std::io::Error, file_id: &UniqueId) -> FilesError {
    match e.kind() {
        ErrorKind::NotFound => FilesError::FileNotFound(file_id.to_string()),
        _ => FilesError::Io(e),
    }
}
