//! File names used inside a blob directory.

/// Name of the file holding the blob bytes.
pub const CONTENT_FILE_NAME: &str = "content";

/// Name of the YAML sidecar describing the blob.
pub const METADATA_FILE_NAME: &str = "metadata.yaml";

/// Digest used for [`crate::BucketFile::signature`].
pub(crate) const SIGNATURE_ALGORITHM: &str = "sha256";
