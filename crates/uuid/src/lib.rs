//! Unique identifiers for documents and bucket files.
//!
//! Every document and stored blob gets an identifier in a *canonical* form: **32 lowercase
//! hexadecimal characters** (a v4 UUID without hyphens). The same value doubles as the on-disk
//! location of a blob in the local bucket store, sharded as:
//!
//! `bucket_dir/<id[0..2]>/<id[2..4]>/<id>`
//!
//! which keeps any one directory from growing without bound.

mod unique;

pub use unique::{UniqueId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
