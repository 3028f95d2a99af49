//! The request/response pipeline.
//!
//! # Design
//! [`send`] executes exactly one logical request/response cycle for whichever
//! resource module invoked it: build the URL and headers, dispatch through
//! the transport under a deadline, read the body by content type, and either
//! decode the expected value or classify the failure. Every call yields
//! exactly one outcome — a decoded value or a single typed error, never both,
//! never neither. There are no retries.
//!
//! The per-call state travels in a [`RequestContext`] built by the client at
//! call time, so the credential is captured when the request is built and a
//! token change never retroactively affects an in-flight request.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::AuthScheme;
use crate::error::{ApiError, Error, ErrorPayload};
use crate::http::{HttpRequest, HttpResponse, Method};
use crate::transport::Transport;

/// Client identification sent with every request.
pub const USER_AGENT: &str = concat!("strata-client/", env!("CARGO_PKG_VERSION"));

/// Everything one dispatch needs, snapshotted when the call is built.
pub struct RequestContext<'a> {
    pub base_url: &'a Url,
    /// Credential resolved by the caller; the pipeline does not know about
    /// token state.
    pub credential: String,
    pub scheme: AuthScheme,
    pub timeout: Duration,
    pub transport: &'a dyn Transport,
}

/// Scalar usable as a query-string value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Text(s) => f.write_str(s),
            QueryValue::Int(n) => write!(f, "{n}"),
            QueryValue::Float(n) => write!(f, "{n}"),
            QueryValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> QueryValue {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> QueryValue {
        QueryValue::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> QueryValue {
        QueryValue::Int(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> QueryValue {
        QueryValue::Int(i64::from(value))
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> QueryValue {
        QueryValue::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> QueryValue {
        QueryValue::Bool(value)
    }
}

/// Ordered query parameters. `None` values are omitted from the URL, never
/// serialized as a literal null.
pub type QueryPairs = Vec<(String, Option<QueryValue>)>;

// Path-segment encoding: controls plus every character that would change how
// the URL parses.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode one path segment.
pub(crate) fn encode_segment(segment: &str) -> Cow<'_, str> {
    utf8_percent_encode(segment, SEGMENT).into()
}

/// Execute one request/response cycle.
///
/// On 204 the expected type is decoded from JSON `null`, so `()`,
/// `Option<_>`, and `serde_json::Value` callers all receive their "no value"
/// form. Exceeding `ctx.timeout` drops the in-flight transport future and
/// fails with [`Error::Timeout`]; a late response can no longer produce a
/// result.
pub async fn send<T: DeserializeOwned>(
    ctx: RequestContext<'_>,
    method: Method,
    path: &str,
    query: &[(String, Option<QueryValue>)],
    body: Option<Value>,
) -> Result<T, Error> {
    let url = build_url(ctx.base_url, path, query)?;

    let mut headers = vec![
        ("Accept".to_string(), "application/json".to_string()),
        ("User-Agent".to_string(), USER_AGENT.to_string()),
        (
            "Authorization".to_string(),
            ctx.scheme.header_value(&ctx.credential),
        ),
    ];
    let body = body.map(|value| {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
        value.to_string()
    });

    let request = HttpRequest {
        method,
        url,
        headers,
        body,
    };

    tracing::debug!(method = %method, url = %request.url, "dispatching request");
    let response = match tokio::time::timeout(ctx.timeout, ctx.transport.execute(request)).await {
        Err(_) => {
            tracing::warn!(timeout = ?ctx.timeout, "deadline elapsed, request cancelled");
            return Err(Error::Timeout(ctx.timeout));
        }
        Ok(Err(e)) => return Err(Error::Network(e.to_string())),
        Ok(Ok(response)) => response,
    };
    tracing::debug!(status = response.status, "response received");

    interpret(response)
}

fn build_url(
    base: &Url,
    path: &str,
    query: &[(String, Option<QueryValue>)],
) -> Result<String, Error> {
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    let mut url = Url::parse(&format!("{base}/{path}"))
        .map_err(|e| Error::Validation(format!("invalid request path `{path}`: {e}")))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            if let Some(value) = value {
                pairs.append_pair(key, &value.to_string());
            }
        }
    }
    // The serializer leaves an empty query behind when nothing was appended.
    if url.query() == Some("") {
        url.set_query(None);
    }
    Ok(String::from(url))
}

/// Interpret a response: decode 2xx bodies, classify everything else.
fn interpret<T: DeserializeOwned>(response: HttpResponse) -> Result<T, Error> {
    let status = response.status;
    if status == 204 {
        return decode(Value::Null);
    }

    let success = response.is_success();
    let is_json = response
        .content_type()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
    let raw = response.body;

    if success {
        let parsed = if raw.is_empty() {
            Value::Null
        } else if is_json {
            serde_json::from_str(&raw)
                .map_err(|e| Error::Network(format!("expected a JSON response: {e}")))?
        } else {
            serde_json::json!({ "message": raw })
        };
        return decode(parsed);
    }

    let body = if raw.is_empty() {
        Value::Null
    } else if is_json {
        serde_json::from_str(&raw).unwrap_or_else(|_| {
            serde_json::json!({
                "error": format!("Received status {status} with invalid JSON body.")
            })
        })
    } else {
        serde_json::json!({ "message": raw })
    };
    Err(Error::Api(classify(status, body)))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value)
        .map_err(|e| Error::Network(format!("response did not match the expected shape: {e}")))
}

/// Map a non-2xx status and parsed body to an [`ApiError`].
fn classify(status: u16, body: Value) -> ApiError {
    let payload = serde_json::from_value::<ErrorPayload>(body.clone()).ok();
    let mut error = ApiError::from_status(status, payload);
    if error.payload.is_none() {
        // Non-JSON bodies were wrapped as {"message": <raw text>}.
        if let Some(message) = body.get("message").and_then(Value::as_str) {
            error.message = message.to_string();
        }
    }
    error
}
