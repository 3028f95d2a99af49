//! Error types for the Strata client.
//!
//! # Design
//! One closed enum, [`Error`], covers every way a call can fail, so callers
//! hold a single `Result<T, Error>` and match on the variant. Failures fall
//! into two origins: local validation raised before any network activity
//! (`Validation`, `Config`), and pipeline failures (`Network`, `Timeout`,
//! `Api`). Non-2xx responses carry an [`ApiError`] with a `kind` discriminant
//! plus shared status/message/payload fields, so callers distinguish "not
//! found" from "rate limited" with a plain match.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Structured error body returned by the backend: `{error, details?}`.
///
/// `details` may be a plain string or an arbitrary object; `serde_json::Value`
/// holds either.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Discriminant for errors derived from a non-2xx HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 400
    BadRequest,
    /// 401
    Auth,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 429
    RateLimit,
    /// Any status >= 500.
    Server,
    /// Any other status outside 2xx.
    Other,
}

impl ApiErrorKind {
    fn for_status(status: u16) -> ApiErrorKind {
        match status {
            400 => ApiErrorKind::BadRequest,
            401 => ApiErrorKind::Auth,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            429 => ApiErrorKind::RateLimit,
            s if s >= 500 => ApiErrorKind::Server,
            _ => ApiErrorKind::Other,
        }
    }

    /// Human message used when the server supplies none.
    fn default_message(self, status: u16) -> String {
        match self {
            ApiErrorKind::BadRequest => "Bad request".to_string(),
            ApiErrorKind::Auth => "Authentication failed".to_string(),
            ApiErrorKind::Forbidden => "Forbidden".to_string(),
            ApiErrorKind::NotFound => "Resource not found".to_string(),
            ApiErrorKind::RateLimit => "Rate limit exceeded".to_string(),
            ApiErrorKind::Server => "Internal server error".to_string(),
            ApiErrorKind::Other => format!("HTTP error! Status: {status}"),
        }
    }
}

/// An error derived from a non-2xx HTTP response.
///
/// Preserves the original status code and the raw server payload for
/// programmatic inspection alongside the classified `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: u16,
    pub message: String,
    pub payload: Option<ErrorPayload>,
}

impl ApiError {
    /// Classify a response status, taking the message from the payload when
    /// the server supplied one.
    pub fn from_status(status: u16, payload: Option<ErrorPayload>) -> ApiError {
        let kind = ApiErrorKind::for_status(status);
        let message = payload
            .as_ref()
            .map(|p| p.error.clone())
            .unwrap_or_else(|| kind.default_message(status));
        ApiError {
            kind,
            status,
            message,
            payload,
        }
    }

    /// A server-kind error. The status is clamped so a server error never
    /// reports a code below 500.
    pub fn server(status: u16, payload: Option<ErrorPayload>) -> ApiError {
        let status = status.max(500);
        let message = payload
            .as_ref()
            .map(|p| p.error.clone())
            .unwrap_or_else(|| ApiErrorKind::Server.default_message(status));
        ApiError {
            kind: ApiErrorKind::Server,
            status,
            message,
            payload,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)
    }
}

/// Errors returned by every client operation.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Caller input rejected before any request was made.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Client construction failed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The transport failed before an HTTP response was produced, or a 2xx
    /// response body could not be decoded.
    #[error("network error: {0}")]
    Network(String),

    /// The deadline elapsed before the backend responded; the in-flight
    /// request was cancelled.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with a non-2xx status.
    #[error("{0}")]
    Api(ApiError),
}

impl Error {
    /// HTTP status code, for API-originated errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(api) => Some(api.status),
            _ => None,
        }
    }

    /// Classified kind, for API-originated errors.
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            Error::Api(api) => Some(api.kind),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}
