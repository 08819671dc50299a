use crate::platform::{DocumentStoreError, IdentityError};
use storeit_files::FilesError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no authenticated user for this session")]
    Unauthenticated,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("file {0} not found")]
    NotFound(String),
    #[error("file is {size} bytes, larger than the {limit} byte upload limit")]
    FileTooLarge { size: u64, limit: u64 },

    /// A stored document carries a `type` outside the five known categories.
    #[error("document {document_id} has unrecognised file type '{value}'")]
    UnknownFileType { document_id: String, value: String },
    #[error("document {document_id} is malformed: {reason}")]
    MalformedDocument { document_id: String, reason: String },

    #[error("document store error: {0}")]
    Document(#[from] DocumentStoreError),
    #[error("blob storage error: {0}")]
    Blob(#[from] FilesError),
    #[error("identity provider error: {0}")]
    Identity(#[from] IdentityError),

    #[error(
        "document creation failed and the uploaded blob {bucket_file_id} could not be removed: document={document_error}; cleanup={cleanup_error}"
    )]
    UploadRollbackFailed {
        bucket_file_id: String,
        #[source]
        document_error: DocumentStoreError,
        cleanup_error: FilesError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
