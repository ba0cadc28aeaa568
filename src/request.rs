//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use http::header::USER_AGENT;
use http::{HeaderMap, Method};

use crate::middleware::RequestId;

/// An incoming HTTP request, reduced to what the pipeline needs.
///
/// The body is dropped on arrival; no route reads it. Per-request context
/// (the request id) travels here as a plain field so every stage that needs
/// it can see where it comes from.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) params: HashMap<String, String>,
    pub(crate) remote_addr: SocketAddr,
    pub(crate) request_id: Option<RequestId>,
}

impl Request {
    /// Builds a request from an `http` request, discarding the body.
    pub fn from_http<B>(req: http::Request<B>, remote_addr: SocketAddr) -> Self {
        let (parts, _body) = req.into_parts();
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            params: HashMap::new(),
            remote_addr,
            request_id: None,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn remote_addr(&self) -> SocketAddr { self.remote_addr }

    /// The id the tracing layer assigned. `None` before tracing has run.
    pub fn request_id(&self) -> Option<&RequestId> { self.request_id.as_ref() }

    /// Case-insensitive header lookup. Values that are not visible ASCII
    /// are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn user_agent(&self) -> &str {
        self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok()).unwrap_or("")
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/json/{code}`, `req.param("code")` on `/json/418` returns `Some("418")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
