//! In-process document database.
//!
//! Collections are declared up front with the attributes they accept. Queries are validated
//! against that schema, so ordering or filtering on an undeclared attribute fails with
//! [`DocumentStoreError::InvalidQuery`] instead of silently matching nothing.
//!
//! When opened with a path the whole database is written back as JSON after every mutation.

use super::{Document, DocumentList, DocumentStore, DocumentStoreError};
use crate::constants::{ATTR_CREATED_AT, ATTR_ID, ATTR_UPDATED_AT};
use crate::query::Predicate;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use storeit_uuid::UniqueId;

const SYSTEM_ATTRIBUTES: [&str; 3] = [ATTR_ID, ATTR_CREATED_AT, ATTR_UPDATED_AT];

#[derive(Debug, Default, Serialize, Deserialize)]
struct Collection {
    attributes: BTreeSet<String>,
    documents: BTreeMap<String, Document>,
}

/// database id -> collection id -> collection
type Databases = BTreeMap<String, BTreeMap<String, Collection>>;

#[derive(Debug, Default)]
pub struct LocalDocumentStore {
    path: Option<PathBuf>,
    databases: RwLock<Databases>,
}

impl LocalDocumentStore {
    /// Creates an empty store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a store persisted at `path`, loading it if the file exists.
    pub fn open(path: &Path) -> Result<Self, DocumentStoreError> {
        let databases = match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| DocumentStoreError::Persistence(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Databases::default(),
            Err(e) => {
                return Err(DocumentStoreError::Persistence(format!(
                    "{}: {e}",
                    path.display()
                )))
            }
        };
        tracing::debug!(path = %path.display(), "opened local document store");
        Ok(Self {
            path: Some(path.to_path_buf()),
            databases: RwLock::new(databases),
        })
    }

    /// Declares a collection and the attributes its documents may carry.
    ///
    /// Calling this for an existing collection adds any new attributes and keeps its documents.
    pub fn ensure_collection(
        &self,
        database_id: &str,
        collection_id: &str,
        attributes: &[&str],
    ) -> Result<(), DocumentStoreError> {
        let mut databases = self.write()?;
        let collection = databases
            .entry(database_id.to_string())
            .or_default()
            .entry(collection_id.to_string())
            .or_default();
        let previous = collection.attributes.clone();
        collection
            .attributes
            .extend(attributes.iter().map(|a| a.to_string()));
        if let Err(e) = self.persist(&databases) {
            if let Ok(collection) = collection_mut(&mut databases, database_id, collection_id) {
                collection.attributes = previous;
            }
            return Err(e);
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Databases>, DocumentStoreError> {
        self.databases
            .read()
            .map_err(|_| DocumentStoreError::Unavailable("document store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Databases>, DocumentStoreError> {
        self.databases
            .write()
            .map_err(|_| DocumentStoreError::Unavailable("document store lock poisoned".into()))
    }

    // Blocking file I/O under the write guard; this store only backs local development.
    fn persist(&self, databases: &Databases) -> Result<(), DocumentStoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(databases)
            .map_err(|e| DocumentStoreError::Persistence(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| DocumentStoreError::Persistence(format!("{}: {e}", parent.display())))?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, path))
            .map_err(|e| DocumentStoreError::Persistence(format!("{}: {e}", path.display())))
    }
}

fn collection<'a>(
    databases: &'a Databases,
    database_id: &str,
    collection_id: &str,
) -> Result<&'a Collection, DocumentStoreError> {
    databases
        .get(database_id)
        .and_then(|collections| collections.get(collection_id))
        .ok_or_else(|| DocumentStoreError::CollectionNotFound {
            database: database_id.to_string(),
            collection: collection_id.to_string(),
        })
}

fn collection_mut<'a>(
    databases: &'a mut Databases,
    database_id: &str,
    collection_id: &str,
) -> Result<&'a mut Collection, DocumentStoreError> {
    databases
        .get_mut(database_id)
        .and_then(|collections| collections.get_mut(collection_id))
        .ok_or_else(|| DocumentStoreError::CollectionNotFound {
            database: database_id.to_string(),
            collection: collection_id.to_string(),
        })
}

impl Collection {
    fn knows(&self, attribute: &str) -> bool {
        SYSTEM_ATTRIBUTES.contains(&attribute) || self.attributes.contains(attribute)
    }

    fn validate_queries(&self, queries: &[Predicate]) -> Result<(), DocumentStoreError> {
        for attribute in queries.iter().flat_map(Predicate::attributes) {
            if !self.knows(attribute) {
                return Err(DocumentStoreError::InvalidQuery(format!(
                    "attribute not found in schema: '{attribute}'"
                )));
            }
        }
        Ok(())
    }

    fn validate_data(&self, data: &Map<String, Value>) -> Result<(), DocumentStoreError> {
        for key in data.keys() {
            if !self.attributes.contains(key) {
                return Err(DocumentStoreError::InvalidDocument(format!(
                    "unknown attribute: '{key}'"
                )));
            }
        }
        Ok(())
    }
}

fn matches(doc: &Document, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Equal { attribute, values } => match doc.attribute(attribute) {
            Some(Value::Array(items)) => items.iter().any(|item| values.contains(item)),
            Some(value) => values.contains(&value),
            None => false,
        },
        Predicate::Contains { attribute, values } => match doc.attribute(attribute) {
            Some(Value::Array(items)) => items.iter().any(|item| values.contains(item)),
            Some(Value::String(text)) => {
                let text = text.to_lowercase();
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|needle| text.contains(&needle.to_lowercase()))
            }
            _ => false,
        },
        Predicate::Or { queries } => queries.iter().any(|q| matches(doc, q)),
        Predicate::OrderAsc { .. } | Predicate::OrderDesc { .. } | Predicate::Limit { .. } => true,
    }
}

/// Missing values sort first; values of different kinds compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            }
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn run_query(collection: &Collection, queries: &[Predicate]) -> DocumentList {
    let mut documents: Vec<&Document> = collection
        .documents
        .values()
        .filter(|doc| queries.iter().all(|q| matches(doc, q)))
        .collect();

    // Insertion order is the base order; explicit orders are applied in sequence as tie-breaks.
    documents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    let orders: Vec<(&str, bool)> = queries
        .iter()
        .filter_map(|q| match q {
            Predicate::OrderAsc { attribute } => Some((attribute.as_str(), true)),
            Predicate::OrderDesc { attribute } => Some((attribute.as_str(), false)),
            _ => None,
        })
        .collect();
    if !orders.is_empty() {
        documents.sort_by(|a, b| {
            orders.iter().fold(Ordering::Equal, |acc, (attribute, ascending)| {
                acc.then_with(|| {
                    let ordering =
                        compare_values(a.attribute(attribute).as_ref(), b.attribute(attribute).as_ref());
                    if *ascending {
                        ordering
                    } else {
                        ordering.reverse()
                    }
                })
            })
        });
    }

    let total = documents.len() as u64;
    let limit = queries.iter().rev().find_map(|q| match q {
        Predicate::Limit { limit } => Some(*limit as usize),
        _ => None,
    });
    if let Some(limit) = limit {
        documents.truncate(limit);
    }

    DocumentList {
        total,
        documents: documents.into_iter().cloned().collect(),
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Predicate],
    ) -> Result<DocumentList, DocumentStoreError> {
        let databases = self.read()?;
        let collection = collection(&databases, database_id, collection_id)?;
        collection.validate_queries(queries)?;
        Ok(run_query(collection, queries))
    }

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &UniqueId,
    ) -> Result<Document, DocumentStoreError> {
        let databases = self.read()?;
        collection(&databases, database_id, collection_id)?
            .documents
            .get(&document_id.to_string())
            .cloned()
            .ok_or_else(|| DocumentStoreError::DocumentNotFound(document_id.to_string()))
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &UniqueId,
        data: Map<String, Value>,
    ) -> Result<Document, DocumentStoreError> {
        let mut databases = self.write()?;
        let collection = collection_mut(&mut databases, database_id, collection_id)?;
        collection.validate_data(&data)?;

        let key = document_id.to_string();
        if collection.documents.contains_key(&key) {
            return Err(DocumentStoreError::DocumentAlreadyExists(key));
        }
        let now = Utc::now();
        let document = Document {
            id: document_id.clone(),
            created_at: now,
            updated_at: now,
            data,
        };
        collection.documents.insert(key.clone(), document.clone());
        if let Err(e) = self.persist(&databases) {
            if let Ok(collection) = collection_mut(&mut databases, database_id, collection_id) {
                collection.documents.remove(&key);
            }
            return Err(e);
        }
        Ok(document)
    }

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &UniqueId,
        data: Map<String, Value>,
    ) -> Result<Document, DocumentStoreError> {
        let mut databases = self.write()?;
        let collection = collection_mut(&mut databases, database_id, collection_id)?;
        collection.validate_data(&data)?;

        let key = document_id.to_string();
        let document = collection
            .documents
            .get_mut(&key)
            .ok_or_else(|| DocumentStoreError::DocumentNotFound(key.clone()))?;
        let previous = document.clone();
        document.data.extend(data);
        document.updated_at = Utc::now();
        let updated = document.clone();
        if let Err(e) = self.persist(&databases) {
            if let Ok(collection) = collection_mut(&mut databases, database_id, collection_id) {
                collection.documents.insert(key, previous);
            }
            return Err(e);
        }
        Ok(updated)
    }

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &UniqueId,
    ) -> Result<(), DocumentStoreError> {
        let mut databases = self.write()?;
        let key = document_id.to_string();
        let removed = collection_mut(&mut databases, database_id, collection_id)?
            .documents
            .remove(&key)
            .ok_or_else(|| DocumentStoreError::DocumentNotFound(key.clone()))?;
        if let Err(e) = self.persist(&databases) {
            if let Ok(collection) = collection_mut(&mut databases, database_id, collection_id) {
                collection.documents.insert(key, removed);
            }
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const DB: &str = "db";
    const COLL: &str = "files";

    fn store() -> LocalDocumentStore {
        let store = LocalDocumentStore::in_memory();
        store
            .ensure_collection(DB, COLL, &["name", "size", "owner", "users", "type"])
            .unwrap();
        store
    }

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test data must be an object"),
        }
    }

    async fn seed(store: &LocalDocumentStore) {
        let rows = [
            json!({"name": "Report.pdf", "size": 300, "owner": "u1", "users": [], "type": "document"}),
            json!({"name": "cat.png", "size": 100, "owner": "u2", "users": ["a@x.com"], "type": "image"}),
            json!({"name": "song.mp3", "size": 200, "owner": "u2", "users": [], "type": "audio"}),
            json!({"name": "report-old.pdf", "size": 100, "owner": "u1", "users": [], "type": "document"}),
        ];
        for row in rows {
            store
                .create_document(DB, COLL, &UniqueId::new(), data(row))
                .await
                .unwrap();
        }
    }

    fn names(list: &DocumentList) -> Vec<&str> {
        list.documents
            .iter()
            .map(|d| d.data["name"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_access_rule_with_or() {
        let store = store();
        seed(&store).await;

        let queries = [Predicate::Or {
            queries: vec![
                Predicate::equal("owner", ["u1"]),
                Predicate::contains("users", ["a@x.com"]),
            ],
        }];
        let list = store.list_documents(DB, COLL, &queries).await.unwrap();

        assert_eq!(list.total, 3);
        assert!(!names(&list).contains(&"song.mp3"));
    }

    #[tokio::test]
    async fn test_equal_membership_and_name_search() {
        let store = store();
        seed(&store).await;

        let by_type = store
            .list_documents(DB, COLL, &[Predicate::equal("type", ["image", "audio"])])
            .await
            .unwrap();
        assert_eq!(by_type.total, 2);

        let by_name = store
            .list_documents(DB, COLL, &[Predicate::contains("name", ["report"])])
            .await
            .unwrap();
        assert_eq!(by_name.total, 2);
    }

    #[tokio::test]
    async fn test_order_and_limit() {
        let store = store();
        seed(&store).await;

        let queries = [
            Predicate::OrderDesc { attribute: "size".into() },
            Predicate::OrderAsc { attribute: "name".into() },
            Predicate::Limit { limit: 3 },
        ];
        let list = store.list_documents(DB, COLL, &queries).await.unwrap();

        assert_eq!(list.total, 4);
        assert_eq!(names(&list), ["Report.pdf", "song.mp3", "cat.png"]);
    }

    #[tokio::test]
    async fn test_unknown_attribute_is_invalid_query() {
        let store = store();
        let result = store
            .list_documents(DB, COLL, &[Predicate::OrderAsc { attribute: "bogus".into() }])
            .await;
        assert!(matches!(result, Err(DocumentStoreError::InvalidQuery(_))));

        let result = store
            .list_documents(DB, COLL, &[Predicate::OrderDesc { attribute: "$createdAt".into() }])
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_collection() {
        let store = store();
        let result = store.list_documents(DB, "other", &[]).await;
        assert!(matches!(
            result,
            Err(DocumentStoreError::CollectionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let store = store();
        let id = UniqueId::new();
        let created = store
            .create_document(DB, COLL, &id, data(json!({"name": "a.txt", "size": 1})))
            .await
            .unwrap();

        let duplicate = store
            .create_document(DB, COLL, &id, data(json!({"name": "b.txt"})))
            .await;
        assert!(matches!(
            duplicate,
            Err(DocumentStoreError::DocumentAlreadyExists(_))
        ));

        let updated = store
            .update_document(DB, COLL, &id, data(json!({"name": "b.txt"})))
            .await
            .unwrap();
        assert_eq!(updated.data["name"], json!("b.txt"));
        assert_eq!(updated.data["size"], json!(1));
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);

        assert_eq!(store.get_document(DB, COLL, &id).await.unwrap(), updated);

        store.delete_document(DB, COLL, &id).await.unwrap();
        assert!(matches!(
            store.get_document(DB, COLL, &id).await,
            Err(DocumentStoreError::DocumentNotFound(_))
        ));
        assert!(matches!(
            store.delete_document(DB, COLL, &id).await,
            Err(DocumentStoreError::DocumentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_undeclared_attribute_rejected() {
        let store = store();
        let result = store
            .create_document(DB, COLL, &UniqueId::new(), data(json!({"colour": "red"})))
            .await;
        assert!(matches!(result, Err(DocumentStoreError::InvalidDocument(_))));
    }

    #[tokio::test]
    async fn test_persists_across_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("documents.json");
        let id = UniqueId::new();

        {
            let store = LocalDocumentStore::open(&path).unwrap();
            store.ensure_collection(DB, COLL, &["name"]).unwrap();
            store
                .create_document(DB, COLL, &id, data(json!({"name": "kept.txt"})))
                .await
                .unwrap();
        }

        let reopened = LocalDocumentStore::open(&path).unwrap();
        let doc = reopened.get_document(DB, COLL, &id).await.unwrap();
        assert_eq!(doc.data["name"], json!("kept.txt"));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("documents.json");
        let store = LocalDocumentStore::open(&path).unwrap();
        store.ensure_collection(DB, COLL, &["name"]).unwrap();
        let kept = UniqueId::new();
        store
            .create_document(DB, COLL, &kept, data(json!({"name": "kept.txt"})))
            .await
            .unwrap();

        // A directory where the temporary file goes makes every write fail.
        fs::create_dir(dir.path().join("documents.json.tmp")).unwrap();

        let created = store
            .create_document(DB, COLL, &UniqueId::new(), data(json!({"name": "lost.txt"})))
            .await;
        assert!(matches!(created, Err(DocumentStoreError::Persistence(_))));

        let updated = store
            .update_document(DB, COLL, &kept, data(json!({"name": "renamed.txt"})))
            .await;
        assert!(matches!(updated, Err(DocumentStoreError::Persistence(_))));

        let deleted = store.delete_document(DB, COLL, &kept).await;
        assert!(matches!(deleted, Err(DocumentStoreError::Persistence(_))));

        assert!(store.ensure_collection(DB, COLL, &["size"]).is_err());
        let by_size = store
            .list_documents(DB, COLL, &[Predicate::OrderAsc { attribute: "size".into() }])
            .await;
        assert!(matches!(by_size, Err(DocumentStoreError::InvalidQuery(_))));

        let list = store.list_documents(DB, COLL, &[]).await.unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(names(&list), vec!["kept.txt"]);

        let reopened = LocalDocumentStore::open(&path).unwrap();
        let on_disk = reopened.list_documents(DB, COLL, &[]).await.unwrap();
        assert_eq!(on_disk, list);
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("documents.json");
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            LocalDocumentStore::open(&path),
            Err(DocumentStoreError::Persistence(_))
        ));
    }
}
