//! Query construction for file listings.
//!
//! A listing request (category filter, free-text search, sort, limit) is translated into an
//! ordered list of declarative [`Predicate`]s that the document store executes. The first
//! predicate is always the access rule: a caller sees a file only if they own it or its share
//! list contains their email. Nothing here talks to the store.

use crate::constants::{ATTR_NAME, ATTR_OWNER, ATTR_TYPE, ATTR_USERS};
use crate::file_type::FileType;
use crate::models::UserRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single filter, order or limit instruction for the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum Predicate {
    /// Attribute equals one of `values`.
    Equal { attribute: String, values: Vec<Value> },
    /// Array attribute holds one of `values`, or string attribute contains one as a substring.
    Contains { attribute: String, values: Vec<Value> },
    /// At least one of the nested predicates holds.
    Or { queries: Vec<Predicate> },
    OrderAsc { attribute: String },
    OrderDesc { attribute: String },
    Limit { limit: u32 },
}

impl Predicate {
    pub fn equal<I, V>(attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Predicate::Equal {
            attribute: attribute.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains<I, V>(attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Predicate::Contains {
            attribute: attribute.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Attribute names this predicate refers to, nested ones included.
    pub fn attributes(&self) -> Vec<&str> {
        match self {
            Predicate::Equal { attribute, .. }
            | Predicate::Contains { attribute, .. }
            | Predicate::OrderAsc { attribute }
            | Predicate::OrderDesc { attribute } => vec![attribute.as_str()],
            Predicate::Or { queries } => queries.iter().flat_map(Predicate::attributes).collect(),
            Predicate::Limit { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Splits a `"<field>-<direction>"` sort key on its first `-`.
///
/// Only an exact `asc` direction sorts ascending; anything else, including a missing or
/// malformed direction, sorts descending. The field is passed through unchecked.
pub fn parse_sort(sort: &str) -> (&str, SortDirection) {
    match sort.split_once('-') {
        Some((field, "asc")) => (field, SortDirection::Asc),
        Some((field, _)) => (field, SortDirection::Desc),
        None => (sort, SortDirection::Desc),
    }
}

/// Builds the predicate list for a file listing.
///
/// - The access predicate (`owner == user_id OR users ∋ user_email`) is always first.
/// - A non-empty `types` adds one membership predicate over the given categories.
/// - A non-empty `search_text` adds a substring match on the file name.
/// - A non-zero `limit` caps the number of results.
/// - A non-empty `sort` adds one order predicate (see [`parse_sort`]).
pub fn build_query(
    user_id: &str,
    user_email: &str,
    types: &[FileType],
    search_text: &str,
    sort: Option<&str>,
    limit: Option<u32>,
) -> Vec<Predicate> {
    let mut queries = vec![Predicate::Or {
        queries: vec![
            Predicate::equal(ATTR_OWNER, [user_id]),
            Predicate::contains(ATTR_USERS, [user_email]),
        ],
    }];

    if !types.is_empty() {
        queries.push(Predicate::equal(ATTR_TYPE, types.iter().map(FileType::as_str)));
    }
    if !search_text.is_empty() {
        queries.push(Predicate::contains(ATTR_NAME, [search_text]));
    }
    if let Some(limit) = limit.filter(|n| *n > 0) {
        queries.push(Predicate::Limit { limit });
    }
    if let Some(sort) = sort.filter(|s| !s.is_empty()) {
        let (field, direction) = parse_sort(sort);
        let attribute = field.to_string();
        queries.push(match direction {
            SortDirection::Asc => Predicate::OrderAsc { attribute },
            SortDirection::Desc => Predicate::OrderDesc { attribute },
        });
    }

    queries
}

/// A listing request as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub types: Vec<FileType>,
    pub search_text: String,
    /// `None` lets the service apply its default; `Some("")` means unsorted.
    pub sort: Option<String>,
    pub limit: Option<u32>,
}

impl FilterSpec {
    pub fn predicates(&self, user: &UserRecord) -> Vec<Predicate> {
        build_query(
            &user.id,
            user.email.as_str(),
            &self.types,
            &self.search_text,
            self.sort.as_deref(),
            self.limit,
        )
    }
}
