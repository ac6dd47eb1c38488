//! The seam between the request pipeline and the network.
//!
//! # Design
//! `Transport` executes one finalized `HttpRequest` and returns the response
//! head plus a live body stream. Connection reuse, TLS and timeouts belong to
//! the implementation. `UreqTransport` is the default and wraps a pooled
//! `ureq::Agent`.

use std::io::Read;

use log::trace;
use ureq::{AsSendBody, SendBody};

use crate::config::DEFAULT_MAX_IDLE_CONNECTIONS_PER_HOST;
use crate::error::BoxError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes a single request. Shared across threads by every `Rest` clone.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// `Transport` backed by a connection-pooling `ureq::Agent`.
///
/// Non-2xx statuses are returned as data. Whatever body reaches the
/// transport is sent, whatever the method.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(max_idle_connections_per_host: usize) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_idle_connections_per_host(max_idle_connections_per_host)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    fn run<B: AsSendBody>(
        &self,
        head: ureq::http::request::Parts,
        body: B,
    ) -> Result<HttpResponse, BoxError> {
        let response = self.agent.run(ureq::http::Request::from_parts(head, body))?;
        let (parts, body) = response.into_parts();
        Ok(HttpResponse {
            status: parts.status.as_u16(),
            reason: parts.status.canonical_reason().unwrap_or_default().to_string(),
            headers: parts.headers,
            body: Box::new(body.into_reader()),
        })
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE_CONNECTIONS_PER_HOST)
    }
}

fn wire_method(method: HttpMethod) -> ureq::http::Method {
    match method {
        HttpMethod::Options => ureq::http::Method::OPTIONS,
        HttpMethod::Get => ureq::http::Method::GET,
        HttpMethod::Head => ureq::http::Method::HEAD,
        HttpMethod::Post => ureq::http::Method::POST,
        HttpMethod::Put => ureq::http::Method::PUT,
        HttpMethod::Patch => ureq::http::Method::PATCH,
        HttpMethod::Delete => ureq::http::Method::DELETE,
        HttpMethod::Trace => ureq::http::Method::TRACE,
        HttpMethod::Connect => ureq::http::Method::CONNECT,
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let (mut head, ()) = ureq::http::Request::builder()
            .method(wire_method(method))
            .uri(url.as_str())
            .body(())?
            .into_parts();
        head.headers = headers;

        match body {
            None => self.run(head, SendBody::none()),
            Some(body) if body.is_empty_sentinel() => self.run(head, SendBody::none()),
            Some(mut body) if body.is_stream() => {
                trace!("{method} {url}: streaming body of unknown length");
                self.run(head, SendBody::from_reader(&mut body))
            }
            Some(mut body) => {
                let mut buf = Vec::with_capacity(body.content_length() as usize);
                body.read_to_end(&mut buf)?;
                trace!("{method} {url}: sending {} byte body", buf.len());
                self.run(head, buf)
            }
        }
    }
}
