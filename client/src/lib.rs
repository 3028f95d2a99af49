//! Typed async client for the Strata backend-as-a-service.
//!
//! # Overview
//! Turns typed method calls into authenticated JSON-over-HTTP requests and
//! maps responses (including error responses) back into typed results or
//! structured errors. One pipeline ([`pipeline::send`]) executes every
//! request/response cycle; the resource modules (auth, databases, schema,
//! records) are validated wrappers that build paths and delegate to it.
//!
//! # Design
//! - [`Client`] holds the immutable [`Config`], the transport, and the one
//!   mutable slot: the session token. Resource accessors borrow the client.
//! - The pipeline owns timeout policy; exceeding the deadline cancels the
//!   in-flight request and the call settles exactly once.
//! - Non-2xx responses become [`ApiError`]s classified by status code, with
//!   the original status and server payload preserved for inspection.
//! - The [`Transport`] trait is a deliberate seam: tests substitute a
//!   scripted responder, production uses the reqwest-backed default.
//!
//! ```no_run
//! use strata_client::{Client, Config};
//!
//! # async fn run() -> Result<(), strata_client::Error> {
//! let client = Client::new(Config::new("https://api.example.com", "my-api-key")?);
//! let session = client.auth().log_in("ada@example.com", "pw").await?;
//! client.set_token(session.token);
//! let tables = client.schema().list_tables("mydb").await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod transport;
pub mod types;

mod validate;

pub use client::Client;
pub use config::{AuthScheme, Config, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiErrorKind, Error, ErrorPayload};
pub use http::{HttpRequest, HttpResponse, Method};
pub use pipeline::{QueryPairs, QueryValue, RequestContext};
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use types::{
    AccessKey, Column, ColumnType, Database, Health, ListOptions, Record, Session, SortOrder,
    TableSchema, User, UserUpdate,
};
