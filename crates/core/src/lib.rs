//! # StoreIt Core
//!
//! Core business logic for the StoreIt file-storage service.
//!
//! This crate contains the file operations and the pure logic behind them:
//! - query construction for listing and searching files ([`query`])
//! - per-category storage usage ([`space`]) and size formatting ([`format`])
//! - file classification, sections and menu actions
//! - the [`FileService`] that ties them to the platform clients in [`platform`]
//!
//! **No API concerns**: HTTP servers, bearer parsing and response shapes belong in `api-rest`
//! and `api-shared`.

pub mod actions;
pub mod config;
pub mod constants;
pub mod error;
pub mod file_type;
pub mod files;
pub mod format;
pub mod models;
pub mod platform;
pub mod query;
pub mod space;

pub use actions::{ActionOutcome, ActionRequest, FileAction, ParseFileActionError};
pub use config::CoreConfig;
pub use error::{StoreError, StoreResult};
pub use file_type::{classify, FileType, ParseFileTypeError, Section};
pub use files::FileService;
pub use format::format_size;
pub use models::{FileList, FileRecord, UserRecord};
pub use platform::{
    BlobStorage, Document, DocumentList, DocumentStore, DocumentStoreError, IdentityError,
    IdentityProvider, LocalDocumentStore, SessionToken, StaticIdentityProvider,
};
pub use query::{build_query, parse_sort, FilterSpec, Predicate, SortDirection};
pub use space::{summarize, summarize_documents, CategoryUsage, SpaceSummary};
pub use storeit_files::{BucketFile, FilesError};
pub use storeit_types::{EmailAddress, NonEmptyText};
pub use storeit_uuid::UniqueId;
