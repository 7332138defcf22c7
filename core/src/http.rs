//! Plain-data HTTP types shared by the client and the dispatcher.
//!
//! # Design
//! An `Endpoint` describes one API invocation as data: verb, versioned path,
//! query parameters, optional JSON body, extra headers, and an optional
//! per-call timeout. Typed client operations build `Endpoint` values; the
//! dispatcher is the only place that turns them into network I/O. Keeping the
//! descriptor as plain owned data makes every operation inspectable in tests
//! without a server.

use std::time::Duration;

use serde_json::Value;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// One API invocation described as plain data.
///
/// Built by client operations and consumed by
/// [`RequestDispatcher::execute`](crate::dispatcher::RequestDispatcher::execute).
/// Query parameters with a `None` or empty value are omitted from the URL
/// rather than sent as empty strings.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: HttpMethod,
    /// Path relative to the base URL, e.g. `/api/v2/utilities/ping`.
    pub path: String,
    pub query: Vec<(String, Option<String>)>,
    /// Pre-serialized JSON body for POST/PUT.
    pub body: Option<String>,
    /// Extra headers; these win over auth-rendered headers on key collision.
    pub headers: Vec<(String, String)>,
    /// Per-call timeout override; falls back to the client-level setting.
    pub timeout: Option<Duration>,
}

impl Endpoint {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Add a query parameter. `None` values are kept in the descriptor but
    /// never rendered into the URL.
    pub fn query(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.query.push((name.into(), value));
        self
    }

    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A successfully dispatched response, classified by content type.
///
/// `NoContent` covers 204 and zero-length JSON responses. A JSON body that
/// parses to `null` is `Json(Value::Null)` — a distinct, legitimate result.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Generic parsed JSON; typed operations decode it further.
    Json(Value),
    /// 204 or an explicitly zero-length JSON response.
    NoContent,
    /// Raw `text/csv` passthrough for file-download endpoints.
    Csv(String),
}

impl ResponseBody {
    pub fn is_no_content(&self) -> bool {
        matches!(self, ResponseBody::NoContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_builder_accumulates_fields() {
        let ep = Endpoint::get("/api/v2/utilities/ping")
            .query("include", Some("details".to_string()))
            .query("filter", None)
            .header("X-Debug", "1");

        assert_eq!(ep.method, HttpMethod::Get);
        assert_eq!(ep.path, "/api/v2/utilities/ping");
        assert_eq!(ep.query.len(), 2);
        assert_eq!(ep.query[1], ("filter".to_string(), None));
        assert!(ep.body.is_none());
        assert!(ep.timeout.is_none());
    }

    #[test]
    fn method_renders_uppercase() {
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn null_json_is_not_no_content() {
        let body = ResponseBody::Json(Value::Null);
        assert!(!body.is_no_content());
        assert_ne!(body, ResponseBody::NoContent);
    }
}
