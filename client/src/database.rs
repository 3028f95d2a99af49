//! Database operations: lifecycle plus per-database access keys.

use crate::client::Client;
use crate::error::Error;
use crate::http::Method;
use crate::pipeline::{self, encode_segment};
use crate::types::{AccessKey, Database, DatabaseList};
use crate::validate;

pub struct Databases<'a> {
    client: &'a Client,
}

impl<'a> Databases<'a> {
    pub(crate) fn new(client: &'a Client) -> Databases<'a> {
        Databases { client }
    }

    /// Create a database.
    pub async fn create(&self, name: &str) -> Result<Database, Error> {
        validate::require_value(name, "database name")?;
        let body = serde_json::json!({ "name": name });
        pipeline::send(self.client.context(), Method::Post, "databases", &[], Some(body)).await
    }

    /// List database names owned by the authenticated user.
    pub async fn list(&self) -> Result<Vec<String>, Error> {
        let list: DatabaseList =
            pipeline::send(self.client.context(), Method::Get, "databases", &[], None).await?;
        Ok(list.databases)
    }

    /// Delete a database and everything in it.
    pub async fn delete(&self, name: &str) -> Result<(), Error> {
        validate::require_value(name, "database name")?;
        let path = format!("databases/{}", encode_segment(name));
        pipeline::send(self.client.context(), Method::Delete, &path, &[], None).await
    }

    /// Issue an access key for a database, replacing any previous key.
    pub async fn create_key(&self, name: &str) -> Result<AccessKey, Error> {
        validate::require_value(name, "database name")?;
        let path = format!("databases/{}/keys", encode_segment(name));
        pipeline::send(self.client.context(), Method::Post, &path, &[], None).await
    }

    /// Fetch the current access key of a database.
    pub async fn key(&self, name: &str) -> Result<AccessKey, Error> {
        validate::require_value(name, "database name")?;
        let path = format!("databases/{}/keys", encode_segment(name));
        pipeline::send(self.client.context(), Method::Get, &path, &[], None).await
    }

    /// Revoke the access key of a database.
    pub async fn delete_key(&self, name: &str) -> Result<(), Error> {
        validate::require_value(name, "database name")?;
        let path = format!("databases/{}/keys", encode_segment(name));
        pipeline::send(self.client.context(), Method::Delete, &path, &[], None).await
    }
}
