//! Plain-data HTTP request and response types.
//!
//! # Design
//! These types describe one HTTP exchange as plain data. The pipeline builds
//! `HttpRequest` values and interprets `HttpResponse` values; the [`Transport`]
//! implementation chosen at client construction is the only code that touches
//! the network. Keeping the boundary as owned data makes scripted transports
//! in tests trivial.
//!
//! [`Transport`]: crate::transport::Transport

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by the pipeline, executed by a `Transport`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Fully built absolute URL, query string included.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// The transport reads the body exactly once; everything downstream works on
/// this snapshot.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Value of the `Content-Type` header, if any (header names matched
    /// case-insensitively).
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_as_str_covers_all_verbs() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
        assert_eq!(Method::Put.as_str(), "PUT");
        assert_eq!(Method::Patch.as_str(), "PATCH");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn content_type_lookup_is_case_insensitive() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("CONTENT-TYPE".to_string(), "application/json".to_string())],
            body: String::new(),
        };
        assert_eq!(response.content_type(), Some("application/json"));
    }

    #[test]
    fn content_type_absent_is_none() {
        let response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(response.content_type().is_none());
    }

    #[test]
    fn is_success_covers_2xx_only() {
        for status in [200, 201, 204, 299] {
            let response = HttpResponse {
                status,
                headers: Vec::new(),
                body: String::new(),
            };
            assert!(response.is_success(), "{status} should be success");
        }
        for status in [199, 300, 404, 500] {
            let response = HttpResponse {
                status,
                headers: Vec::new(),
                body: String::new(),
            };
            assert!(!response.is_success(), "{status} should not be success");
        }
    }
}
