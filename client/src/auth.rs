//! Account and session operations.

use serde_json::Value;

use crate::client::Client;
use crate::error::Error;
use crate::http::Method;
use crate::pipeline::{self, encode_segment};
use crate::types::{Health, Session, User, UserUpdate};
use crate::validate;

/// Auth operations: accounts, sessions, the current-user profile, and the
/// backend health probe.
pub struct Auth<'a> {
    client: &'a Client,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a Client) -> Auth<'a> {
        Auth { client }
    }

    /// Register a new account.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<User, Error> {
        validate::require_value(email, "email")?;
        validate::require_value(password, "password")?;
        let mut body = serde_json::json!({ "email": email, "password": password });
        if let Some(name) = name {
            body["name"] = Value::String(name.to_string());
        }
        pipeline::send(self.client.context(), Method::Post, "auth/signup", &[], Some(body)).await
    }

    /// Exchange credentials for a session token. The token is returned, not
    /// stored — pass it to [`Client::set_token`] to authorize later calls.
    pub async fn log_in(&self, email: &str, password: &str) -> Result<Session, Error> {
        validate::require_value(email, "email")?;
        validate::require_value(password, "password")?;
        let body = serde_json::json!({ "email": email, "password": password });
        pipeline::send(self.client.context(), Method::Post, "auth/login", &[], Some(body)).await
    }

    /// Fetch the profile of the authenticated user.
    pub async fn me(&self) -> Result<User, Error> {
        pipeline::send(self.client.context(), Method::Get, "auth/me", &[], None).await
    }

    /// Partially update the profile of the authenticated user.
    pub async fn update_me(&self, update: &UserUpdate) -> Result<User, Error> {
        if update.is_empty() {
            return Err(Error::Validation(
                "update payload must not be empty".to_string(),
            ));
        }
        let body = serde_json::to_value(update)
            .map_err(|e| Error::Validation(format!("could not serialize payload: {e}")))?;
        pipeline::send(self.client.context(), Method::Put, "auth/me", &[], Some(body)).await
    }

    /// Look up a user by identifier.
    pub async fn user(&self, identifier: &str) -> Result<User, Error> {
        validate::require_value(identifier, "user identifier")?;
        let path = format!("auth/users/{}", encode_segment(identifier));
        pipeline::send(self.client.context(), Method::Get, &path, &[], None).await
    }

    /// Probe backend health.
    pub async fn health(&self) -> Result<Health, Error> {
        pipeline::send(self.client.context(), Method::Get, "health", &[], None).await
    }
}
