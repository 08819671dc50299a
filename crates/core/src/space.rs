//! Storage usage summary for the dashboard.
//!
//! Folds a user's files into per-category totals. The fold is commutative: any ordering of the
//! same records yields the same [`SpaceSummary`].

use crate::constants::SPACE_QUOTA_BYTES;
use crate::error::StoreResult;
use crate::file_type::FileType;
use crate::models::FileRecord;
use crate::platform::Document;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Usage of one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryUsage {
    pub size: u64,
    /// Most recent `updated_at` among the category's files; `None` when it has none.
    pub latest_date: Option<DateTime<Utc>>,
}

impl CategoryUsage {
    fn add(&mut self, record: &FileRecord) {
        self.size = self.size.saturating_add(record.size);
        if self.latest_date.map_or(true, |latest| record.updated_at > latest) {
            self.latest_date = Some(record.updated_at);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaceSummary {
    pub image: CategoryUsage,
    pub document: CategoryUsage,
    pub video: CategoryUsage,
    pub audio: CategoryUsage,
    pub other: CategoryUsage,
    /// Sum of every category's size.
    pub used: u64,
    /// Quota the usage is measured against.
    pub all: u64,
}

impl Default for SpaceSummary {
    fn default() -> Self {
        Self {
            image: CategoryUsage::default(),
            document: CategoryUsage::default(),
            video: CategoryUsage::default(),
            audio: CategoryUsage::default(),
            other: CategoryUsage::default(),
            used: 0,
            all: SPACE_QUOTA_BYTES,
        }
    }
}

impl SpaceSummary {
    pub fn category(&self, file_type: FileType) -> &CategoryUsage {
        match file_type {
            FileType::Image => &self.image,
            FileType::Document => &self.document,
            FileType::Video => &self.video,
            FileType::Audio => &self.audio,
            FileType::Other => &self.other,
        }
    }

    fn category_mut(&mut self, file_type: FileType) -> &mut CategoryUsage {
        match file_type {
            FileType::Image => &mut self.image,
            FileType::Document => &mut self.document,
            FileType::Video => &mut self.video,
            FileType::Audio => &mut self.audio,
            FileType::Other => &mut self.other,
        }
    }

    /// Share of the quota in use, as a percentage rounded to two decimals.
    pub fn percentage_used(&self) -> f64 {
        if self.all == 0 {
            return 0.0;
        }
        let percentage = self.used as f64 / self.all as f64 * 100.0;
        (percentage * 100.0).round() / 100.0
    }
}

pub fn summarize(records: &[FileRecord]) -> SpaceSummary {
    records.iter().fold(SpaceSummary::default(), |mut summary, record| {
        summary.category_mut(record.file_type).add(record);
        summary.used = summary.used.saturating_add(record.size);
        summary
    })
}

/// Summarizes raw store documents.
///
/// Fails on the first document whose type is not a known category rather than leaving it out
/// of the totals.
pub fn summarize_documents(documents: &[Document]) -> StoreResult<SpaceSummary> {
    let records = documents
        .iter()
        .map(FileRecord::try_from)
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(summarize(&records))
}
