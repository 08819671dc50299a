//! Client interfaces to the backend platform.
//!
//! The application never persists anything itself: documents, blobs and sessions all belong to
//! the platform. These traits are the seams the file service talks through. Handles are passed
//! in explicitly (`Arc<dyn DocumentStore>` and friends) rather than constructed globally per call.
//!
//! Local development backends live in the submodules:
//! - [`documents::LocalDocumentStore`]: in-process document database that evaluates predicates
//! - [`blobs`]: [`BlobStorage`] for the filesystem bucket store
//! - [`identity::StaticIdentityProvider`]: users and session tokens from a YAML file

pub mod blobs;
pub mod documents;
pub mod identity;

use crate::constants::{ATTR_CREATED_AT, ATTR_ID, ATTR_UPDATED_AT};
use crate::models::UserRecord;
use crate::query::Predicate;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use storeit_files::{BucketFile, FilesError};
use storeit_uuid::UniqueId;

pub use documents::LocalDocumentStore;
pub use identity::StaticIdentityProvider;

/// A document as returned by the store: system attributes plus free-form data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: UniqueId,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Value of an attribute, including the `$`-prefixed system attributes.
    ///
    /// Timestamps are rendered with fixed nanosecond precision so that string comparison
    /// matches chronological order.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            ATTR_ID => Some(Value::String(self.id.to_string())),
            ATTR_CREATED_AT => Some(Value::String(timestamp(&self.created_at))),
            ATTR_UPDATED_AT => Some(Value::String(timestamp(&self.updated_at))),
            _ => self.data.get(name).cloned(),
        }
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
    /// Number of matching documents before any limit was applied.
    pub total: u64,
    pub documents: Vec<Document>,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    #[error("collection {database}/{collection} not found")]
    CollectionNotFound { database: String, collection: String },
    #[error("document {0} not found")]
    DocumentNotFound(String),
    #[error("document {0} already exists")]
    DocumentAlreadyExists(String),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
    #[error("failed to persist documents: {0}")]
    Persistence(String),
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Predicate],
    ) -> Result<DocumentList, DocumentStoreError>;

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &UniqueId,
    ) -> Result<Document, DocumentStoreError>;

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &UniqueId,
        data: Map<String, Value>,
    ) -> Result<Document, DocumentStoreError>;

    /// Merges `data` into the stored document and bumps `$updatedAt`.
    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &UniqueId,
        data: Map<String, Value>,
    ) -> Result<Document, DocumentStoreError>;

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &UniqueId,
    ) -> Result<(), DocumentStoreError>;
}

#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &UniqueId,
        name: &str,
        bytes: &[u8],
    ) -> Result<BucketFile, FilesError>;

    async fn read_file(&self, bucket_id: &str, file_id: &UniqueId) -> Result<Vec<u8>, FilesError>;

    async fn delete_file(&self, bucket_id: &str, file_id: &UniqueId) -> Result<(), FilesError>;
}

/// Opaque session token issued by the platform's login flow.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of logs.
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("failed to read users file: {0}")]
    Read(std::io::Error),
    #[error("failed to parse users file: {0}")]
    Parse(serde_yaml::Error),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the user behind a session, or `None` if the session is unknown.
    async fn current_user(&self, session: &SessionToken) -> Result<Option<UserRecord>, IdentityError>;
}
