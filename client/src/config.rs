//! Client configuration.
//!
//! # Design
//! `Config` is validated eagerly at construction and never mutated afterwards
//! — a client built from a `Config` can assume the base URL parses and the
//! credential is non-empty. The only mutable credential state lives on the
//! client itself (the session token slot), not here.

use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Default request timeout: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Format of the credential header.
///
/// Historical deployments of the backend used either form; exactly one scheme
/// applies per client instance and is attached to every request, even when
/// the credential value is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// `Authorization: Bearer <credential>`
    #[default]
    Bearer,
    /// `Authorization: ApiKey <credential>`
    ApiKey,
}

impl AuthScheme {
    pub(crate) fn header_value(self, credential: &str) -> String {
        match self {
            AuthScheme::Bearer => format!("Bearer {credential}"),
            AuthScheme::ApiKey => format!("ApiKey {credential}"),
        }
    }
}

/// Immutable per-client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    base_url: Url,
    api_key: String,
    scheme: AuthScheme,
    timeout: Duration,
}

impl Config {
    /// Validates the base address and credential eagerly; fails with
    /// [`Error::Config`] on a non-absolute URL or an empty credential.
    pub fn new(base_url: &str, api_key: &str) -> Result<Config, Error> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base URL `{base_url}`: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "invalid base URL `{base_url}`: not a base URL"
            )));
        }
        if api_key.trim().is_empty() {
            return Err(Error::Config("credential must not be empty".to_string()));
        }
        Ok(Config {
            base_url: parsed,
            api_key: api_key.to_string(),
            scheme: AuthScheme::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_scheme(mut self, scheme: AuthScheme) -> Config {
        self.scheme = scheme;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Config {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
