//! HTTP data types exchanged with a `Transport`.
//!
//! # Design
//! The pipeline describes a finalized request as plain data and hands it to
//! the transport. The transport answers with a status, headers and a live
//! body stream which the pipeline drains into a `Response`. Keeping these as
//! plain values lets tests substitute a recording transport for the network.

use std::fmt;
use std::io::Read;

use http::HeaderMap;
use url::Url;

use crate::body::Body;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Options,
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Trace,
    Connect,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Connect => "CONNECT",
        }
    }

    /// Whether form parameters and JSON payloads are negotiated into an
    /// entity body for this method. Only POST, PUT and PATCH qualify.
    pub fn carries_entity(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finalized request, ready for dispatch.
///
/// Built by `RequestBuilder::send`. `body` is `None` when nothing was
/// attached; an explicitly empty body is `Some(Body::empty())`.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Body>,
}

/// A response as returned by a `Transport`, before the body is drained.
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub headers: HeaderMap,
    pub body: Box<dyn Read>,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
