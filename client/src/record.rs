//! Record operations: CRUD against one table.

use serde_json::Value;

use crate::client::Client;
use crate::error::Error;
use crate::http::Method;
use crate::pipeline::{self, encode_segment, QueryPairs, QueryValue};
use crate::types::{ListOptions, Record, RecordList};
use crate::validate;

pub struct Records<'a> {
    client: &'a Client,
}

impl<'a> Records<'a> {
    pub(crate) fn new(client: &'a Client) -> Records<'a> {
        Records { client }
    }

    /// Insert a record. The server assigns and returns the integer `id`.
    pub async fn create(&self, database: &str, table: &str, fields: &Record) -> Result<Record, Error> {
        validate::require_value(database, "database name")?;
        validate::require_value(table, "table name")?;
        if fields.is_empty() {
            return Err(Error::Validation(
                "record payload must not be empty".to_string(),
            ));
        }
        let path = records_path(database, table);
        let body = Value::Object(fields.clone());
        pipeline::send(self.client.context(), Method::Post, &path, &[], Some(body)).await
    }

    /// List records matching the given filters and options.
    pub async fn list(
        &self,
        database: &str,
        table: &str,
        options: &ListOptions,
    ) -> Result<Vec<Record>, Error> {
        validate::require_value(database, "database name")?;
        validate::require_value(table, "table name")?;
        let path = records_path(database, table);
        let query = query_pairs(options);
        let list: RecordList =
            pipeline::send(self.client.context(), Method::Get, &path, &query, None).await?;
        Ok(list.records)
    }

    /// Fetch one record by id.
    pub async fn get(&self, database: &str, table: &str, id: u64) -> Result<Record, Error> {
        validate::require_value(database, "database name")?;
        validate::require_value(table, "table name")?;
        validate::require_id(id)?;
        let path = record_path(database, table, id);
        pipeline::send(self.client.context(), Method::Get, &path, &[], None).await
    }

    /// Partially update one record by id. Only the fields present in the
    /// patch are applied.
    pub async fn update(
        &self,
        database: &str,
        table: &str,
        id: u64,
        patch: &Record,
    ) -> Result<Record, Error> {
        validate::require_value(database, "database name")?;
        validate::require_value(table, "table name")?;
        validate::require_id(id)?;
        if patch.is_empty() {
            return Err(Error::Validation(
                "update payload must not be empty".to_string(),
            ));
        }
        let path = record_path(database, table, id);
        let body = Value::Object(patch.clone());
        pipeline::send(self.client.context(), Method::Patch, &path, &[], Some(body)).await
    }

    /// Delete one record by id.
    pub async fn delete(&self, database: &str, table: &str, id: u64) -> Result<(), Error> {
        validate::require_value(database, "database name")?;
        validate::require_value(table, "table name")?;
        validate::require_id(id)?;
        let path = record_path(database, table, id);
        pipeline::send(self.client.context(), Method::Delete, &path, &[], None).await
    }
}

fn records_path(database: &str, table: &str) -> String {
    format!(
        "databases/{}/tables/{}/records",
        encode_segment(database),
        encode_segment(table)
    )
}

fn record_path(database: &str, table: &str, id: u64) -> String {
    format!("{}/{id}", records_path(database, table))
}

/// Serialize list options: equality filters first, in insertion order, then
/// the reserved pagination/sort/projection parameters. Unset options are
/// omitted from the URL.
fn query_pairs(options: &ListOptions) -> QueryPairs {
    let mut query: QueryPairs = options
        .filters
        .iter()
        .map(|(column, value)| (column.clone(), Some(value.clone())))
        .collect();
    query.push(("limit".to_string(), options.limit.map(QueryValue::from)));
    query.push(("offset".to_string(), options.offset.map(QueryValue::from)));
    query.push(("sort".to_string(), options.sort.clone().map(QueryValue::from)));
    query.push((
        "order".to_string(),
        options.order.map(|order| QueryValue::from(order.as_str())),
    ));
    query.push((
        "fields".to_string(),
        options
            .fields
            .as_ref()
            .map(|fields| QueryValue::from(fields.join(","))),
    ));
    query
}
