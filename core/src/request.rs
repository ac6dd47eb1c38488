//! Request builder and the send pipeline.
//!
//! # Design
//! Configuration calls only record what the caller asked for. Nothing is
//! encoded or validated until `send`, which runs a fixed sequence:
//!
//! 1. set `User-Agent` from the client, overwriting any earlier value
//! 2. append the encoded query string to the path
//! 3. join base URL and path and parse the result
//! 4. for POST, PUT and PATCH, negotiate the entity body: form parameters
//!    win over a JSON payload, which wins over a raw body
//! 5. run the before hook
//! 6. dispatch through the transport
//! 7. drain the response body
//! 8. run the after hook
//!
//! Header names and values that cannot go on the wire, and records that fail
//! to convert into parameters, are recorded without breaking the chain. The
//! first such error is returned by `send` before step 1.

use std::cell::Cell;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue};
use log::{debug, trace};
use serde::Serialize;
use url::{SyntaxViolation, Url};

use crate::body::Body;
use crate::client::Rest;
use crate::error::{RestError, UrlError};
use crate::http::{HttpMethod, HttpRequest};
use crate::params::Params;
use crate::response::Response;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

type JsonPayload<'a> = Box<dyn FnOnce() -> serde_json::Result<Vec<u8>> + Send + 'a>;

/// Parse a joined base URL and path. The WHATWG parser strips tab, newline
/// and surrounding whitespace and escapes other control characters; all of
/// those are errors here.
fn resolve_url(raw: &str) -> Result<Url, UrlError> {
    if let Some(c) = raw.chars().find(|c| c.is_control()) {
        return Err(UrlError::ControlCharacter(c));
    }
    let ignored = Cell::new(None);
    let record = |violation: SyntaxViolation| {
        if matches!(
            violation,
            SyntaxViolation::C0SpaceIgnored | SyntaxViolation::TabOrNewlineIgnored
        ) && ignored.get().is_none()
        {
            ignored.set(Some(violation));
        }
    };
    let url = Url::options()
        .syntax_violation_callback(Some(&record))
        .parse(raw)?;
    match ignored.get() {
        Some(violation) => Err(UrlError::Syntax(violation)),
        None => Ok(url),
    }
}

/// Single-use request under construction. Created by the `Rest` factories and
/// consumed by `send`.
pub struct RequestBuilder<'a> {
    rest: &'a Rest,
    method: HttpMethod,
    path: String,
    headers: HeaderMap,
    query: Params,
    form: Params,
    json: Option<JsonPayload<'a>>,
    body: Option<Body>,
    url: Option<Url>,
    error: Option<RestError>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(rest: &'a Rest, method: HttpMethod, path: String) -> Self {
        Self {
            rest,
            method,
            path,
            headers: HeaderMap::new(),
            query: Params::new(),
            form: Params::new(),
            json: None,
            body: None,
            url: None,
            error: None,
        }
    }

    fn record(&mut self, error: RestError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn parse_header(key: &str, value: &str) -> Result<(HeaderName, HeaderValue), RestError> {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| RestError::InvalidHeader(format!("bad header name {key:?}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| RestError::InvalidHeader(format!("bad value for {key}: {value:?}")))?;
        Ok((name, value))
    }

    fn append_header(&mut self, key: &str, value: &str) {
        match Self::parse_header(key, value) {
            Ok((name, value)) => {
                self.headers.append(name, value);
            }
            Err(e) => self.record(e),
        }
    }

    /// Append a header. Existing values for `key` are kept.
    #[must_use]
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.append_header(key, value);
        self
    }

    #[must_use]
    pub fn headers<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in values {
            self.append_header(key.as_ref(), value.as_ref());
        }
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.add(key, value);
        self
    }

    #[must_use]
    pub fn queries<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in values {
            self.query.add(key, value);
        }
        self
    }

    /// Append the serialized fields of `value` as query parameters.
    #[must_use]
    pub fn query_struct<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match Params::from_struct(value) {
            Ok(params) => self.query.extend(params),
            Err(e) => self.record(e),
        }
        self
    }

    /// Append a form parameter. Only sent for POST, PUT and PATCH.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.add(key, value);
        self
    }

    #[must_use]
    pub fn params<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in values {
            self.form.add(key, value);
        }
        self
    }

    /// Append the serialized fields of `value` as form parameters.
    #[must_use]
    pub fn params_struct<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match Params::from_struct(value) {
            Ok(params) => self.form.extend(params),
            Err(e) => self.record(e),
        }
        self
    }

    /// Payload serialized as JSON at send time. Only sent for POST, PUT and
    /// PATCH, and only when no form parameters were given.
    #[must_use]
    pub fn json<T>(mut self, value: T) -> Self
    where
        T: Serialize + Send + 'a,
    {
        self.json = Some(Box::new(move || serde_json::to_vec(&value)));
        self
    }

    /// Set `Content-Type`, replacing any previous value.
    #[must_use]
    pub fn content_type(mut self, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(CONTENT_TYPE, value);
            }
            Err(_) => self.record(RestError::InvalidHeader(format!(
                "bad value for content-type: {value:?}"
            ))),
        }
        self
    }

    #[must_use]
    pub fn basic_auth(mut self, username: &str, password: &str) -> Self {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        match HeaderValue::from_str(&format!("Basic {encoded}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => self.record(RestError::InvalidHeader(
                "authorization header is not representable".to_string(),
            )),
        }
        self
    }

    /// Attach an entity body.
    ///
    /// In-memory content becomes a buffered body with a known length that
    /// can be replayed; `Body::from_reader` gives a single-use stream.
    /// For POST, PUT and PATCH the body is replaced when form parameters or a
    /// JSON payload are present.
    #[must_use]
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        let body = body.into();
        trace!("{} {}: attached {:?}", self.method, self.path, body);
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path relative to the base URL. Includes the query string once `send`
    /// has started.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolved URL. Available to the before hook.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn query_params(&self) -> &Params {
        &self.query
    }

    pub fn form_params(&self) -> &Params {
        &self.form
    }

    pub fn body_ref(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> &mut Option<Body> {
        &mut self.body
    }

    fn negotiate_entity(&mut self) -> Result<(), RestError> {
        if !self.form.is_empty() {
            trace!("{} {}: sending {} form parameters", self.method, self.path, self.form.len());
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            self.body = Some(Body::from(self.form.encode()));
        } else if let Some(payload) = self.json.take() {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
            let bytes = payload().map_err(|e| RestError::Serialization(e.to_string()))?;
            trace!("{} {}: sending {} byte json payload", self.method, self.path, bytes.len());
            self.body = Some(Body::from(bytes));
        }
        Ok(())
    }

    /// Materialize and dispatch the request, returning the buffered response.
    pub fn send(mut self) -> Result<Response, RestError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        let rest = self.rest;

        let agent = HeaderValue::from_str(rest.resolved_user_agent()).map_err(|_| {
            RestError::InvalidHeader(format!(
                "bad user agent: {:?}",
                rest.resolved_user_agent()
            ))
        })?;
        self.headers.insert(USER_AGENT, agent);

        if !self.query.is_empty() {
            self.path.push('?');
            self.path.push_str(&self.query.encode());
        }

        let raw = format!("{}{}", rest.base(), self.path);
        let url = match resolve_url(&raw) {
            Ok(url) => url,
            Err(source) => return Err(RestError::InvalidUrl { url: raw, source }),
        };
        self.url = Some(url.clone());

        if self.method.carries_entity() {
            self.negotiate_entity()?;
        }

        if let Some(before) = rest.before_hook() {
            before(&mut self).map_err(RestError::Hook)?;
        }

        let method = self.method;
        debug!("{method} {url}");
        let request = HttpRequest {
            method,
            url,
            headers: self.headers,
            body: self.body,
        };
        let url = request.url.clone();

        let response = rest
            .transport()
            .execute(request)
            .map_err(RestError::Transport)?;
        let response = Response::drain(response)?;
        debug!(
            "{method} {url} -> {} ({} bytes)",
            response.status_code(),
            response.raw_body().len()
        );

        if let Some(after) = rest.after_hook() {
            after(&response).map_err(RestError::Hook)?;
        }

        Ok(response)
    }
}
