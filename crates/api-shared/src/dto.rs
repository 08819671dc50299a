//! Request and response bodies of the StoreIt APIs.
//!
//! Core types stay free of API concerns; these mirror them with the wire names and OpenAPI
//! schemas clients see.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use storeit_core::{
    format_size, CategoryUsage, FileList, FileRecord, FileType, FilterSpec, ParseFileTypeError,
    Section, SpaceSummary,
};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

/// A stored file as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRes {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub extension: String,
    pub size: u64,
    /// `size` formatted for display, e.g. `1.5 KB`.
    pub size_label: String,
    pub owner: String,
    pub account_id: String,
    pub users: Vec<String>,
    pub bucket_file_id: String,
    pub url: String,
    /// Section slug the file is listed under.
    pub section: String,
    pub created_at: String,
    pub updated_at: String,
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<FileRecord> for FileRes {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id.to_string(),
            size_label: format_size(record.size),
            section: Section::for_type(record.file_type).slug().to_string(),
            file_type: record.file_type.to_string(),
            name: record.name,
            extension: record.extension,
            size: record.size,
            owner: record.owner,
            account_id: record.account_id,
            users: record.users.into_iter().collect(),
            bucket_file_id: record.bucket_file_id.to_string(),
            url: record.url,
            created_at: timestamp(&record.created_at),
            updated_at: timestamp(&record.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesRes {
    /// Matching files before the limit was applied.
    pub total: u64,
    /// Combined size of the returned files.
    pub total_size: u64,
    pub total_size_label: String,
    pub files: Vec<FileRes>,
}

impl From<FileList> for ListFilesRes {
    fn from(list: FileList) -> Self {
        let total_size = list.total_size();
        Self {
            total: list.total,
            total_size,
            total_size_label: format_size(total_size),
            files: list.documents.into_iter().map(FileRes::from).collect(),
        }
    }
}

/// Query parameters for listing files.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListFilesQuery {
    /// Comma-separated file types (`image,video`). Takes precedence over `section`.
    pub types: Option<String>,
    /// Section slug (`documents`, `images`, `media`, `others`); unknown slugs mean documents.
    pub section: Option<String>,
    /// Substring to search for in file names.
    pub query: Option<String>,
    /// `<field>-<asc|desc>`; defaults to newest first, empty for unsorted.
    pub sort: Option<String>,
    pub limit: Option<u32>,
}

impl ListFilesQuery {
    pub fn into_filter(self) -> Result<FilterSpec, ParseFileTypeError> {
        let types = match (self.types, self.section) {
            (Some(types), _) => types
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::parse::<FileType>)
                .collect::<Result<Vec<_>, _>>()?,
            (None, Some(section)) => Section::from_slug(&section).types().to_vec(),
            (None, None) => Vec::new(),
        };

        Ok(FilterSpec {
            types,
            search_text: self.query.unwrap_or_default(),
            sort: self.sort,
            limit: self.limit,
        })
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadFileQuery {
    /// Original file name, including its extension.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenameFileReq {
    /// New name without the extension.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateFileUsersReq {
    /// Complete list of collaborator emails.
    pub emails: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUsageRes {
    pub size: u64,
    pub size_label: String,
    pub latest_date: Option<String>,
}

impl From<&CategoryUsage> for CategoryUsageRes {
    fn from(usage: &CategoryUsage) -> Self {
        Self {
            size: usage.size,
            size_label: format_size(usage.size),
            latest_date: usage.latest_date.as_ref().map(timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpaceSummaryRes {
    pub image: CategoryUsageRes,
    pub document: CategoryUsageRes,
    pub video: CategoryUsageRes,
    pub audio: CategoryUsageRes,
    pub other: CategoryUsageRes,
    pub used: u64,
    pub used_label: String,
    pub all: u64,
    pub percentage_used: f64,
}

impl From<&SpaceSummary> for SpaceSummaryRes {
    fn from(summary: &SpaceSummary) -> Self {
        Self {
            image: summary.category(FileType::Image).into(),
            document: summary.category(FileType::Document).into(),
            video: summary.category(FileType::Video).into(),
            audio: summary.category(FileType::Audio).into(),
            other: summary.category(FileType::Other).into(),
            used: summary.used,
            used_label: format_size(summary.used),
            all: summary.all,
            percentage_used: summary.percentage_used(),
        }
    }
}
