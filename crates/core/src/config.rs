//! Core runtime configuration.
//!
//! Resolved once at process startup and passed into [`crate::FileService`]. Request handling
//! never reads environment variables.

use crate::constants::{
    BUCKETS_DIR_NAME, DEFAULT_BUCKET_ID, DEFAULT_DATABASE_ID, DEFAULT_DATA_DIR,
    DEFAULT_FILES_COLLECTION_ID, DEFAULT_PROJECT_ID, DEFAULT_PUBLIC_ENDPOINT, DOCUMENTS_FILE_NAME,
    USERS_FILE_NAME,
};
use crate::{StoreError, StoreResult};
use std::path::{Path, PathBuf};
use storeit_uuid::UniqueId;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    users_file: Option<PathBuf>,
    database_id: String,
    files_collection_id: String,
    bucket_id: String,
    public_endpoint: String,
    project_id: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// Identifiers must be non-empty; the public endpoint must be an `http(s)` URL and is stored
    /// without a trailing slash.
    pub fn new(
        data_dir: PathBuf,
        database_id: String,
        files_collection_id: String,
        bucket_id: String,
        public_endpoint: String,
        project_id: String,
    ) -> StoreResult<Self> {
        for (name, value) in [
            ("database_id", &database_id),
            ("files_collection_id", &files_collection_id),
            ("bucket_id", &bucket_id),
            ("project_id", &project_id),
        ] {
            if value.trim().is_empty() {
                return Err(StoreError::Config(format!("{name} cannot be empty")));
            }
        }

        let public_endpoint = public_endpoint.trim().trim_end_matches('/').to_string();
        if !(public_endpoint.starts_with("http://") || public_endpoint.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "public_endpoint must be an http(s) URL, got '{public_endpoint}'"
            )));
        }

        Ok(Self {
            data_dir,
            users_file: None,
            database_id,
            files_collection_id,
            bucket_id,
            public_endpoint,
            project_id,
        })
    }

    /// Overrides the location of the users file, which otherwise lives in the data directory.
    pub fn with_users_file(mut self, users_file: PathBuf) -> Self {
        self.users_file = Some(users_file);
        self
    }

    /// Builds the configuration from `STOREIT_*` environment variables, with defaults.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unset or blank variables fall back to the defaults in [`crate::constants`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let config = Self::new(
            PathBuf::from(var("STOREIT_DATA_DIR", DEFAULT_DATA_DIR)),
            var("STOREIT_DATABASE_ID", DEFAULT_DATABASE_ID),
            var("STOREIT_FILES_COLLECTION_ID", DEFAULT_FILES_COLLECTION_ID),
            var("STOREIT_BUCKET_ID", DEFAULT_BUCKET_ID),
            var("STOREIT_PUBLIC_ENDPOINT", DEFAULT_PUBLIC_ENDPOINT),
            var("STOREIT_PROJECT_ID", DEFAULT_PROJECT_ID),
        )?;

        Ok(match lookup("STOREIT_USERS_FILE").filter(|v| !v.trim().is_empty()) {
            Some(path) => config.with_users_file(PathBuf::from(path.trim())),
            None => config,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn documents_file(&self) -> PathBuf {
        self.data_dir.join(DOCUMENTS_FILE_NAME)
    }

    pub fn buckets_dir(&self) -> PathBuf {
        self.data_dir.join(BUCKETS_DIR_NAME)
    }

    pub fn users_file(&self) -> PathBuf {
        self.users_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(USERS_FILE_NAME))
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn files_collection_id(&self) -> &str {
        &self.files_collection_id
    }

    pub fn bucket_id(&self) -> &str {
        &self.bucket_id
    }

    pub fn public_endpoint(&self) -> &str {
        &self.public_endpoint
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Public URL that renders a stored blob inline.
    pub fn file_view_url(&self, bucket_file_id: &UniqueId) -> String {
        self.file_url(bucket_file_id, "view")
    }

    /// Public URL that downloads a stored blob as an attachment.
    pub fn file_download_url(&self, bucket_file_id: &UniqueId) -> String {
        self.file_url(bucket_file_id, "download")
    }

    fn file_url(&self, bucket_file_id: &UniqueId, mode: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/{}?project={}",
            self.public_endpoint, self.bucket_id, bucket_file_id, mode, self.project_id
        )
    }
}
