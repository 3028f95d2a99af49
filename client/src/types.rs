//! Domain DTOs for the Strata API.
//!
//! # Design
//! These types mirror the backend's wire schema but are defined independently
//! of the mock server; the integration tests catch schema drift between the
//! two crates. List endpoints answer with wrapped objects (`{"tables":
//! [...]}` and friends) — the wrapper structs here stay private to the wire
//! and the resource modules hand out plain vectors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::QueryValue;

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Partial update for the current user. Only the fields present in the JSON
/// are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UserUpdate {
    pub(crate) fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.name.is_none()
    }
}

/// Result of a successful login. The token is not stored automatically —
/// pass it to [`Client::set_token`](crate::Client::set_token).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
}

/// Backend health probe result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

/// A database owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
}

/// Per-database access key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessKey {
    pub key: String,
}

/// Column type accepted by the schema endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Boolean,
    Timestamp,
}

/// One column of a table: name plus type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Column {
        Column {
            name: name.into(),
            column_type,
        }
    }
}

/// Schema of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
}

/// A record is a free-form JSON object; the server assigns an integer `id`.
pub type Record = serde_json::Map<String, Value>;

/// Sort direction for record listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Options for listing records: equality filters plus pagination, sorting,
/// and field selection. Filters keep their insertion order on the wire.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub filters: Vec<(String, QueryValue)>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub fields: Option<Vec<String>>,
}

impl ListOptions {
    pub fn new() -> ListOptions {
        ListOptions::default()
    }

    /// Add an equality filter on a column.
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<QueryValue>) -> ListOptions {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: u32) -> ListOptions {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> ListOptions {
        self.offset = Some(offset);
        self
    }

    pub fn sort(mut self, column: impl Into<String>, order: SortOrder) -> ListOptions {
        self.sort = Some(column.into());
        self.order = Some(order);
        self
    }

    /// Restrict returned records to the named fields.
    pub fn fields(mut self, fields: &[&str]) -> ListOptions {
        self.fields = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }
}

// Wire wrappers for list endpoints.

#[derive(Debug, Deserialize)]
pub(crate) struct DatabaseList {
    pub databases: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TableList {
    pub tables: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordList {
    pub records: Vec<Record>,
}
