//! StoreIt bucket storage
//!
//! Filesystem-backed stand-in for the platform's object storage. Blobs are grouped into buckets
//! and addressed by a generated [`UniqueId`]; each blob keeps a YAML metadata sidecar so that a
//! bucket can be inspected without any database.
//!
//! ```text
//! <root>/
//! └── <bucket_id>/
//!     └── ab/
//!         └── 3f/
//!             └── ab3f9e…/
//!                 ├── content
//!                 └── metadata.yaml
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use storeit_files::LocalBucketStore;
//! use storeit_uuid::UniqueId;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = LocalBucketStore::new(Path::new("storeit_data/buckets"))?;
//! let file = store.create_file("files", &UniqueId::new(), "report.pdf", b"%PDF-1.7")?;
//! println!("stored {} ({} bytes)", file.name, file.size_original);
//! # Ok(())
//! # }
//! ```

mod constants;
mod files;

pub use constants::{CONTENT_FILE_NAME, METADATA_FILE_NAME};
pub use files::{BucketFile, LocalBucketStore};
pub use storeit_uuid::UniqueId;

/// Errors that can occur during bucket operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root directory could not be created or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Bucket identifier is empty or contains characters unsafe for a path segment
    #[error("Invalid bucket id: {0}")]
    InvalidBucketId(String),

    /// File name is empty
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// A blob with this id already exists in the bucket
    #[error("File {0} already exists in bucket")]
    FileAlreadyExists(String),

    /// No blob with this id exists in the bucket
    #[error("File {0} not found in bucket")]
    FileNotFound(String),

    /// Metadata sidecar could not be written or parsed
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_yaml::Error),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
