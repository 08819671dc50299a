//! Records read from and written to the platform.

use crate::constants::{ATTR_NAME, ATTR_USERS};
use crate::error::{StoreError, StoreResult};
use crate::file_type::FileType;
use crate::platform::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use storeit_types::EmailAddress;
use storeit_uuid::UniqueId;

/// The signed-in user, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub account_id: String,
    pub full_name: String,
    pub email: EmailAddress,
}

/// Metadata describing one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: UniqueId,
    pub name: String,
    pub file_type: FileType,
    pub extension: String,
    pub size: u64,
    pub owner: String,
    pub account_id: String,
    /// Collaborator emails the file is shared with.
    pub users: BTreeSet<String>,
    pub bucket_file_id: UniqueId,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored shape of a file document's data.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredFile {
    #[serde(rename = "type")]
    file_type: String,
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    extension: String,
    size: u64,
    owner: String,
    #[serde(default)]
    account_id: String,
    #[serde(default)]
    users: Vec<String>,
    bucket_file_id: UniqueId,
}

impl TryFrom<&Document> for FileRecord {
    type Error = StoreError;

    /// Converts a raw document, rejecting a `type` outside the known categories.
    fn try_from(doc: &Document) -> StoreResult<Self> {
        let document_id = doc.id.to_string();
        let stored: StoredFile = serde_json::from_value(Value::Object(doc.data.clone()))
            .map_err(|e| StoreError::MalformedDocument {
                document_id: document_id.clone(),
                reason: e.to_string(),
            })?;

        let file_type = stored
            .file_type
            .parse::<FileType>()
            .map_err(|e| StoreError::UnknownFileType {
                document_id,
                value: e.0,
            })?;

        Ok(FileRecord {
            id: doc.id.clone(),
            name: stored.name,
            file_type,
            extension: stored.extension,
            size: stored.size,
            owner: stored.owner,
            account_id: stored.account_id,
            users: stored.users.into_iter().collect(),
            bucket_file_id: stored.bucket_file_id,
            url: stored.url,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

impl FileRecord {
    /// Whether `user` may see this file: they own it or it is shared with them.
    pub fn is_visible_to(&self, user: &UserRecord) -> bool {
        self.is_owned_by(user) || self.users.contains(user.email.as_str())
    }

    pub fn is_owned_by(&self, user: &UserRecord) -> bool {
        self.owner == user.id
    }
}

/// Data of a newly uploaded file, before the store assigns timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub file_type: FileType,
    pub extension: String,
    pub size: u64,
    pub owner: String,
    pub account_id: String,
    pub bucket_file_id: UniqueId,
    pub url: String,
}

impl NewFile {
    pub fn into_data(self) -> Map<String, Value> {
        let value = json!({
            "type": self.file_type.as_str(),
            "name": self.name,
            "url": self.url,
            "extension": self.extension,
            "size": self.size,
            "owner": self.owner,
            "accountId": self.account_id,
            "users": Vec::<String>::new(),
            "bucketFileId": self.bucket_file_id.to_string(),
        });
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Update payload for a rename.
pub fn rename_data(name: &str) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert(ATTR_NAME.to_string(), Value::String(name.to_string()));
    data
}

/// Update payload replacing the share list.
pub fn users_data<I, S>(emails: I) -> Map<String, Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let emails: BTreeSet<String> = emails
        .into_iter()
        .map(|email| email.as_ref().to_string())
        .collect();
    let mut data = Map::new();
    data.insert(ATTR_USERS.to_string(), json!(emails));
    data
}

/// File name after a rename: the new stem joined with the unchanged extension.
pub fn renamed_file_name(name: &str, extension: &str) -> String {
    if extension.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", name, extension)
    }
}

/// A page of files returned by a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileList {
    /// Number of matching files before any limit was applied.
    pub total: u64,
    pub documents: Vec<FileRecord>,
}

impl FileList {
    /// Sum of the sizes of the files on this page.
    pub fn total_size(&self) -> u64 {
        self.documents.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(data: Value) -> Document {
        let Value::Object(data) = data else {
            panic!("test data must be an object");
        };
        Document {
            id: UniqueId::parse("0123456789abcdef0123456789abcdef").unwrap(),
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            updated_at: "2024-02-01T00:00:00Z".parse().unwrap(),
            data,
        }
    }

    fn file_data(file_type: &str) -> Value {
        json!({
            "type": file_type,
            "name": "cat.png",
            "url": "http://localhost/view",
            "extension": "png",
            "size": 2048,
            "owner": "user-1",
            "accountId": "acct-1",
            "users": ["bob@example.com"],
            "bucketFileId": "fedcba9876543210fedcba9876543210",
        })
    }

    #[test]
    fn test_file_record_from_document() {
        let record = FileRecord::try_from(&document(file_data("image"))).unwrap();

        assert_eq!(record.file_type, FileType::Image);
        assert_eq!(record.size, 2048);
        assert_eq!(record.owner, "user-1");
        assert!(record.users.contains("bob@example.com"));
        assert_eq!(record.updated_at, "2024-02-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_unknown_type_is_integrity_error() {
        let result = FileRecord::try_from(&document(file_data("spreadsheet")));
        match result {
            Err(StoreError::UnknownFileType { value, .. }) => assert_eq!(value, "spreadsheet"),
            other => panic!("expected UnknownFileType, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let result = FileRecord::try_from(&document(json!({"type": "image"})));
        assert!(matches!(result, Err(StoreError::MalformedDocument { .. })));
    }

    #[test]
    fn test_new_file_data_round_trips() {
        let new_file = NewFile {
            name: "notes.txt".into(),
            file_type: FileType::Document,
            extension: "txt".into(),
            size: 12,
            owner: "user-1".into(),
            account_id: "acct-1".into(),
            bucket_file_id: UniqueId::parse("fedcba9876543210fedcba9876543210").unwrap(),
            url: "http://localhost/view".into(),
        };
        let mut doc = document(json!({}));
        doc.data = new_file.into_data();

        let record = FileRecord::try_from(&doc).unwrap();
        assert_eq!(record.name, "notes.txt");
        assert_eq!(record.file_type, FileType::Document);
        assert!(record.users.is_empty());
    }

    #[test]
    fn test_visibility() {
        let record = FileRecord::try_from(&document(file_data("image"))).unwrap();
        let owner = UserRecord {
            id: "user-1".into(),
            account_id: "acct-1".into(),
            full_name: "Alice".into(),
            email: EmailAddress::parse("alice@example.com").unwrap(),
        };
        let collaborator = UserRecord {
            id: "user-2".into(),
            email: EmailAddress::parse("bob@example.com").unwrap(),
            ..owner.clone()
        };
        let stranger = UserRecord {
            id: "user-3".into(),
            email: EmailAddress::parse("eve@example.com").unwrap(),
            ..owner.clone()
        };

        assert!(record.is_visible_to(&owner) && record.is_owned_by(&owner));
        assert!(record.is_visible_to(&collaborator) && !record.is_owned_by(&collaborator));
        assert!(!record.is_visible_to(&stranger));
    }

    #[test]
    fn test_renamed_file_name() {
        assert_eq!(renamed_file_name("summary", "pdf"), "summary.pdf");
        assert_eq!(renamed_file_name("Makefile", ""), "Makefile");
    }

    #[test]
    fn test_users_data_deduplicates() {
        let a = EmailAddress::parse("a@example.com").unwrap();
        let b = EmailAddress::parse("b@example.com").unwrap();
        let data = users_data([&b, &a, &b]);
        assert_eq!(data["users"], json!(["a@example.com", "b@example.com"]));
    }

    #[test]
    fn test_file_list_total_size() {
        let record = FileRecord::try_from(&document(file_data("image"))).unwrap();
        let list = FileList {
            total: 2,
            documents: vec![record.clone(), record],
        };
        assert_eq!(list.total_size(), 4096);
        assert_eq!(FileList::default().total_size(), 0);
    }
}
