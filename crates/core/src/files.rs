//! File service.
//!
//! Orchestrates the identity provider, query builder, document store and blob store for every
//! user-facing file operation. Platform clients are injected at construction; nothing here builds
//! a client per call or reads the environment.

use crate::actions::{ActionOutcome, ActionRequest};
use crate::config::CoreConfig;
use crate::constants::{ATTR_OWNER, DEFAULT_SORT, FILE_ATTRIBUTES, MAX_FILE_SIZE};
use crate::file_type::classify;
use crate::models::{rename_data, renamed_file_name, users_data, FileList, FileRecord, NewFile, UserRecord};
use crate::platform::{
    BlobStorage, DocumentStore, DocumentStoreError, IdentityProvider, LocalDocumentStore,
    SessionToken, StaticIdentityProvider,
};
use crate::query::{FilterSpec, Predicate};
use crate::space::{summarize_documents, SpaceSummary};
use crate::{StoreError, StoreResult};
use std::sync::Arc;
use storeit_files::LocalBucketStore;
use storeit_types::{EmailAddress, NonEmptyText};
use storeit_uuid::UniqueId;

/// File operations scoped to the caller's session.
#[derive(Clone)]
pub struct FileService {
    cfg: Arc<CoreConfig>,
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStorage>,
    identity: Arc<dyn IdentityProvider>,
}

impl FileService {
    pub fn new(
        cfg: Arc<CoreConfig>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStorage>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            cfg,
            documents,
            blobs,
            identity,
        }
    }

    /// Builds a service over the local development backends rooted at the configured data
    /// directory, declaring the files collection if it does not exist yet.
    pub fn local(cfg: Arc<CoreConfig>) -> StoreResult<Self> {
        let documents = LocalDocumentStore::open(&cfg.documents_file())?;
        documents.ensure_collection(cfg.database_id(), cfg.files_collection_id(), FILE_ATTRIBUTES)?;
        let blobs = LocalBucketStore::new(&cfg.buckets_dir())?;
        let identity = StaticIdentityProvider::load(&cfg.users_file())?;

        tracing::info!(data_dir = %cfg.data_dir().display(), "using local platform backends");
        Ok(Self::new(
            cfg,
            Arc::new(documents),
            Arc::new(blobs),
            Arc::new(identity),
        ))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Resolves the session's user, or `None` for an unknown session.
    pub async fn current_user(&self, session: &SessionToken) -> StoreResult<Option<UserRecord>> {
        Ok(self.identity.current_user(session).await?)
    }

    async fn require_user(&self, session: &SessionToken) -> StoreResult<UserRecord> {
        self.current_user(session)
            .await?
            .ok_or(StoreError::Unauthenticated)
    }

    /// Stores `bytes` as a new file owned by the caller.
    ///
    /// The blob is written first. If the document cannot be created afterwards the blob is
    /// deleted once and the document error is returned; should that delete fail as well the
    /// result is [`StoreError::UploadRollbackFailed`].
    pub async fn upload_file(
        &self,
        session: &SessionToken,
        file_name: &str,
        bytes: &[u8],
    ) -> StoreResult<FileRecord> {
        logged("upload_file", self.upload(session, file_name, bytes).await)
    }

    async fn upload(
        &self,
        session: &SessionToken,
        file_name: &str,
        bytes: &[u8],
    ) -> StoreResult<FileRecord> {
        let user = self.require_user(session).await?;

        let size = bytes.len() as u64;
        if size > MAX_FILE_SIZE {
            return Err(StoreError::FileTooLarge {
                size,
                limit: MAX_FILE_SIZE,
            });
        }
        let name = NonEmptyText::new(file_name)
            .map_err(|_| StoreError::InvalidInput("file name cannot be empty".into()))?;

        let bucket_id = self.cfg.bucket_id();
        let bucket_file = self
            .blobs
            .create_file(bucket_id, &UniqueId::new(), name.as_str(), bytes)
            .await?;

        let (file_type, extension) = classify(bucket_file.name.as_str());
        let new_file = NewFile {
            name: bucket_file.name.as_str().to_string(),
            file_type,
            extension,
            size: bucket_file.size_original,
            owner: user.id,
            account_id: user.account_id,
            bucket_file_id: bucket_file.id.clone(),
            url: self.cfg.file_view_url(&bucket_file.id),
        };

        let created = self
            .documents
            .create_document(
                self.cfg.database_id(),
                self.cfg.files_collection_id(),
                &UniqueId::new(),
                new_file.into_data(),
            )
            .await;

        match created {
            Ok(document) => {
                let record = FileRecord::try_from(&document)?;
                tracing::info!(file = %record.id, size = record.size, "uploaded file");
                Ok(record)
            }
            Err(document_error) => {
                tracing::warn!(
                    bucket_file = %bucket_file.id,
                    "document creation failed, removing uploaded blob"
                );
                match self.blobs.delete_file(bucket_id, &bucket_file.id).await {
                    Ok(()) => Err(StoreError::Document(document_error)),
                    Err(cleanup_error) => Err(StoreError::UploadRollbackFailed {
                        bucket_file_id: bucket_file.id.to_string(),
                        document_error,
                        cleanup_error,
                    }),
                }
            }
        }
    }

    /// Lists the files the caller owns or has been given access to.
    ///
    /// A filter without a sort is ordered by `$createdAt-desc`; `Some("")` leaves the store's
    /// order untouched.
    pub async fn get_files(&self, session: &SessionToken, filter: &FilterSpec) -> StoreResult<FileList> {
        logged("get_files", self.list(session, filter).await)
    }

    async fn list(&self, session: &SessionToken, filter: &FilterSpec) -> StoreResult<FileList> {
        let user = self.require_user(session).await?;
        let filter = FilterSpec {
            sort: Some(filter.sort.clone().unwrap_or_else(|| DEFAULT_SORT.to_string())),
            ..filter.clone()
        };

        let list = self
            .documents
            .list_documents(
                self.cfg.database_id(),
                self.cfg.files_collection_id(),
                &filter.predicates(&user),
            )
            .await?;
        let documents = list
            .documents
            .iter()
            .map(FileRecord::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(FileList {
            total: list.total,
            documents,
        })
    }

    /// Fetches one file the caller can see.
    pub async fn get_file(&self, session: &SessionToken, file_id: &UniqueId) -> StoreResult<FileRecord> {
        logged("get_file", self.visible_file(session, file_id).await)
    }

    // Files the caller cannot see are reported as missing.
    async fn visible_file(&self, session: &SessionToken, file_id: &UniqueId) -> StoreResult<FileRecord> {
        let user = self.require_user(session).await?;
        let document = self
            .documents
            .get_document(self.cfg.database_id(), self.cfg.files_collection_id(), file_id)
            .await
            .map_err(|e| match e {
                DocumentStoreError::DocumentNotFound(_) => StoreError::NotFound(file_id.to_string()),
                other => StoreError::Document(other),
            })?;

        let record = FileRecord::try_from(&document)?;
        if !record.is_visible_to(&user) {
            return Err(StoreError::NotFound(file_id.to_string()));
        }
        Ok(record)
    }

    async fn update(&self, file_id: &UniqueId, data: serde_json::Map<String, serde_json::Value>) -> StoreResult<FileRecord> {
        let document = self
            .documents
            .update_document(self.cfg.database_id(), self.cfg.files_collection_id(), file_id, data)
            .await?;
        FileRecord::try_from(&document)
    }

    /// Renames a file, keeping its extension: `name` is the new stem only.
    pub async fn rename_file(
        &self,
        session: &SessionToken,
        file_id: &UniqueId,
        name: &str,
    ) -> StoreResult<FileRecord> {
        logged("rename_file", self.rename(session, file_id, name).await)
    }

    async fn rename(&self, session: &SessionToken, file_id: &UniqueId, name: &str) -> StoreResult<FileRecord> {
        let name = NonEmptyText::new(name)
            .map_err(|_| StoreError::InvalidInput("new name cannot be empty".into()))?;
        let record = self.visible_file(session, file_id).await?;
        let new_name = renamed_file_name(name.as_str(), &record.extension);
        self.update(file_id, rename_data(&new_name)).await
    }

    /// Replaces the share list of a file.
    pub async fn update_file_users(
        &self,
        session: &SessionToken,
        file_id: &UniqueId,
        emails: &[EmailAddress],
    ) -> StoreResult<FileRecord> {
        logged("update_file_users", self.share(session, file_id, emails).await)
    }

    async fn share(
        &self,
        session: &SessionToken,
        file_id: &UniqueId,
        emails: &[EmailAddress],
    ) -> StoreResult<FileRecord> {
        self.visible_file(session, file_id).await?;
        self.update(file_id, users_data(emails)).await
    }

    /// Removes one collaborator from a file's share list.
    pub async fn remove_file_user(
        &self,
        session: &SessionToken,
        file_id: &UniqueId,
        email: &EmailAddress,
    ) -> StoreResult<FileRecord> {
        logged("remove_file_user", self.unshare(session, file_id, email).await)
    }

    async fn unshare(
        &self,
        session: &SessionToken,
        file_id: &UniqueId,
        email: &EmailAddress,
    ) -> StoreResult<FileRecord> {
        let record = self.visible_file(session, file_id).await?;
        let remaining = record.users.iter().filter(|user| user.as_str() != email.as_str());
        self.update(file_id, users_data(remaining)).await
    }

    /// Deletes a file's document and then its blob.
    pub async fn delete_file(&self, session: &SessionToken, file_id: &UniqueId) -> StoreResult<()> {
        logged("delete_file", self.delete(session, file_id).await)
    }

    async fn delete(&self, session: &SessionToken, file_id: &UniqueId) -> StoreResult<()> {
        let record = self.visible_file(session, file_id).await?;
        self.documents
            .delete_document(self.cfg.database_id(), self.cfg.files_collection_id(), file_id)
            .await?;
        self.blobs
            .delete_file(self.cfg.bucket_id(), &record.bucket_file_id)
            .await?;
        tracing::info!(file = %file_id, "deleted file");
        Ok(())
    }

    /// Returns a file's record together with its content.
    pub async fn download_file(
        &self,
        session: &SessionToken,
        file_id: &UniqueId,
    ) -> StoreResult<(FileRecord, Vec<u8>)> {
        logged("download_file", self.download(session, file_id).await)
    }

    async fn download(&self, session: &SessionToken, file_id: &UniqueId) -> StoreResult<(FileRecord, Vec<u8>)> {
        let record = self.visible_file(session, file_id).await?;
        let bytes = self
            .blobs
            .read_file(self.cfg.bucket_id(), &record.bucket_file_id)
            .await?;
        Ok((record, bytes))
    }

    /// Storage used by the files the caller owns. Files shared with them are not counted.
    pub async fn total_space_used(&self, session: &SessionToken) -> StoreResult<SpaceSummary> {
        logged("total_space_used", self.space(session).await)
    }

    async fn space(&self, session: &SessionToken) -> StoreResult<SpaceSummary> {
        let user = self.require_user(session).await?;
        let list = self
            .documents
            .list_documents(
                self.cfg.database_id(),
                self.cfg.files_collection_id(),
                &[Predicate::equal(ATTR_OWNER, [user.id.as_str()])],
            )
            .await?;
        summarize_documents(&list.documents)
    }

    /// Runs a menu action against one file.
    pub async fn apply_action(
        &self,
        session: &SessionToken,
        file_id: &UniqueId,
        request: ActionRequest,
    ) -> StoreResult<ActionOutcome> {
        tracing::debug!(file = %file_id, action = %request.action(), "applying file action");
        match request {
            ActionRequest::Rename { name } => self
                .rename_file(session, file_id, &name)
                .await
                .map(ActionOutcome::Renamed),
            ActionRequest::Details => self
                .get_file(session, file_id)
                .await
                .map(ActionOutcome::Details),
            ActionRequest::Share { emails } => self
                .update_file_users(session, file_id, &emails)
                .await
                .map(ActionOutcome::Shared),
            ActionRequest::Download => {
                let record = self.get_file(session, file_id).await?;
                Ok(ActionOutcome::Download {
                    url: self.cfg.file_download_url(&record.bucket_file_id),
                    file_name: record.name,
                })
            }
            ActionRequest::Delete => self
                .delete_file(session, file_id)
                .await
                .map(|()| ActionOutcome::Deleted),
        }
    }
}

fn logged<T>(operation: &'static str, result: StoreResult<T>) -> StoreResult<T> {
    if let Err(e) = &result {
        tracing::error!(operation, error = %e, "file operation failed");
    }
    result
}
