//! Transport seam between the pipeline and the network.
//!
//! # Design
//! The pipeline never talks to the network directly — it hands a fully built
//! [`HttpRequest`] to a [`Transport`] and gets back an [`HttpResponse`] with
//! the body already read. Test suites substitute a scripted implementation;
//! production clients use [`ReqwestTransport`]. Timeout policy lives in the
//! pipeline, not here, so cancelling a call is just dropping the future this
//! trait returns.

use async_trait::async_trait;
use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse, Method};

/// Failure raised by a transport before an HTTP response exists
/// (DNS, connection refused, broken stream).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Executes one HTTP exchange.
///
/// Implementations must read the response body to completion so the returned
/// [`HttpResponse`] is a self-contained snapshot.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by a shared [`reqwest::Client`].
///
/// The inner client carries no timeout of its own; deadlines are enforced by
/// the caller.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
