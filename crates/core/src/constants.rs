//! Constants used throughout the StoreIt core crate.
//!
//! Attribute names, default identifiers and limits live here so the query builder, the local
//! document store and the file service agree on them.

/// Storage quota shown on the usage dashboard (2 GiB per user).
pub const SPACE_QUOTA_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Largest upload accepted by the file service (50 MiB).
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Sort applied by `get_files` when the caller does not choose one.
pub const DEFAULT_SORT: &str = "$createdAt-desc";

/// Sort choices offered to users, as `(label, value)` pairs.
pub const SORT_OPTIONS: &[(&str, &str)] = &[
    ("Date created (newest)", "$createdAt-desc"),
    ("Date created (oldest)", "$createdAt-asc"),
    ("Name (A-Z)", "name-asc"),
    ("Name (Z-A)", "name-desc"),
    ("Size (largest)", "size-desc"),
    ("Size (smallest)", "size-asc"),
];

/// Default directory for local platform data when none is configured.
pub const DEFAULT_DATA_DIR: &str = "storeit_data";

/// File name of the persisted local document store, relative to the data directory.
pub const DOCUMENTS_FILE_NAME: &str = "documents.json";

/// Directory holding local buckets, relative to the data directory.
pub const BUCKETS_DIR_NAME: &str = "buckets";

/// File name of the local identity provider's user list, relative to the data directory.
pub const USERS_FILE_NAME: &str = "users.yaml";

pub const DEFAULT_DATABASE_ID: &str = "storeit";
pub const DEFAULT_FILES_COLLECTION_ID: &str = "files";
pub const DEFAULT_BUCKET_ID: &str = "files";
pub const DEFAULT_PROJECT_ID: &str = "storeit";
pub const DEFAULT_PUBLIC_ENDPOINT: &str = "http://localhost:3000/v1";

/// System attribute holding a document's id.
pub const ATTR_ID: &str = "$id";
/// System attribute holding a document's creation time.
pub const ATTR_CREATED_AT: &str = "$createdAt";
/// System attribute holding a document's last update time.
pub const ATTR_UPDATED_AT: &str = "$updatedAt";

pub const ATTR_OWNER: &str = "owner";
pub const ATTR_USERS: &str = "users";
pub const ATTR_TYPE: &str = "type";
pub const ATTR_NAME: &str = "name";
pub const ATTR_SIZE: &str = "size";

/// Attributes of the files collection.
pub const FILE_ATTRIBUTES: &[&str] = &[
    ATTR_TYPE,
    ATTR_NAME,
    "url",
    "extension",
    ATTR_SIZE,
    ATTR_OWNER,
    "accountId",
    ATTR_USERS,
    "bucketFileId",
];
