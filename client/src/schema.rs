//! Table schema operations.

use crate::client::Client;
use crate::error::Error;
use crate::http::Method;
use crate::pipeline::{self, encode_segment};
use crate::types::{Column, TableList, TableSchema};
use crate::validate;

pub struct Schema<'a> {
    client: &'a Client,
}

impl<'a> Schema<'a> {
    pub(crate) fn new(client: &'a Client) -> Schema<'a> {
        Schema { client }
    }

    /// Define a table with the given columns.
    pub async fn create_table(
        &self,
        database: &str,
        table: &str,
        columns: &[Column],
    ) -> Result<TableSchema, Error> {
        validate::require_value(database, "database name")?;
        validate::require_value(table, "table name")?;
        if columns.is_empty() {
            return Err(Error::Validation(
                "table must have at least one column".to_string(),
            ));
        }
        for column in columns {
            validate::require_value(&column.name, "column name")?;
        }
        let body = serde_json::json!({ "name": table, "columns": columns });
        let path = format!("databases/{}/tables", encode_segment(database));
        pipeline::send(self.client.context(), Method::Post, &path, &[], Some(body)).await
    }

    /// List table names in a database.
    pub async fn list_tables(&self, database: &str) -> Result<Vec<String>, Error> {
        validate::require_value(database, "database name")?;
        let path = format!("databases/{}/tables", encode_segment(database));
        let list: TableList =
            pipeline::send(self.client.context(), Method::Get, &path, &[], None).await?;
        Ok(list.tables)
    }

    /// Fetch one table's schema.
    pub async fn table(&self, database: &str, table: &str) -> Result<TableSchema, Error> {
        validate::require_value(database, "database name")?;
        validate::require_value(table, "table name")?;
        let path = format!(
            "databases/{}/tables/{}",
            encode_segment(database),
            encode_segment(table)
        );
        pipeline::send(self.client.context(), Method::Get, &path, &[], None).await
    }

    /// Delete a table and its records.
    pub async fn delete_table(&self, database: &str, table: &str) -> Result<(), Error> {
        validate::require_value(database, "database name")?;
        validate::require_value(table, "table name")?;
        let path = format!(
            "databases/{}/tables/{}",
            encode_segment(database),
            encode_segment(table)
        );
        pipeline::send(self.client.context(), Method::Delete, &path, &[], None).await
    }
}
