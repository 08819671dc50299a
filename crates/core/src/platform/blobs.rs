//! [`BlobStorage`] backed by the filesystem bucket store.

use super::BlobStorage;
use async_trait::async_trait;
use storeit_files::{BucketFile, FilesError, LocalBucketStore};
use storeit_uuid::UniqueId;

// The bucket store does blocking file I/O inline; it only backs local development.
#[async_trait]
impl BlobStorage for LocalBucketStore {
    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &UniqueId,
        name: &str,
        bytes: &[u8],
    ) -> Result<BucketFile, FilesError> {
        LocalBucketStore::create_file(self, bucket_id, file_id, name, bytes)
    }

    async fn read_file(&self, bucket_id: &str, file_id: &UniqueId) -> Result<Vec<u8>, FilesError> {
        LocalBucketStore::read_file(self, bucket_id, file_id)
    }

    async fn delete_file(&self, bucket_id: &str, file_id: &UniqueId) -> Result<(), FilesError> {
        LocalBucketStore::delete_file(self, bucket_id, file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_bucket_store_through_trait_object() {
        let dir = TempDir::new().unwrap();
        let blobs: Arc<dyn BlobStorage> = Arc::new(LocalBucketStore::new(dir.path()).unwrap());
        let id = UniqueId::new();

        let stored = blobs.create_file("files", &id, "a.txt", b"hello").await.unwrap();
        assert_eq!(stored.size_original, 5);
        assert_eq!(blobs.read_file("files", &id).await.unwrap(), b"hello");

        blobs.delete_file("files", &id).await.unwrap();
        assert!(matches!(
            blobs.read_file("files", &id).await,
            Err(FilesError::FileNotFound(_))
        ));
    }
}
