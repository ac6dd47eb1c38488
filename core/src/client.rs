//! Shared client configuration and request factory.
//!
//! # Design
//! `Rest` carries the defaults every request needs (base URL, user agent,
//! hooks) plus the shared transport. It is configured by value at startup and
//! then used read-only: cloning is cheap and clones share the transport, so
//! one client can serve any number of threads issuing requests concurrently.

use std::fmt;
use std::sync::Arc;

use crate::config::RestConfig;
use crate::error::BoxError;
use crate::http::HttpMethod;
use crate::request::RequestBuilder;
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};

/// User agent sent when the client has none configured.
pub const DEFAULT_USER_AGENT: &str = "Rest/0.1";

pub(crate) type BeforeHook = dyn Fn(&mut RequestBuilder<'_>) -> Result<(), BoxError> + Send + Sync;
pub(crate) type AfterHook = dyn Fn(&Response) -> Result<(), BoxError> + Send + Sync;

/// Fluent HTTP client.
#[derive(Clone)]
pub struct Rest {
    base_url: String,
    user_agent: String,
    before: Option<Arc<BeforeHook>>,
    after: Option<Arc<AfterHook>>,
    transport: Arc<dyn Transport>,
}

impl Rest {
    pub fn new() -> Self {
        Self::with_transport(Arc::new(UreqTransport::default()))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: String::new(),
            user_agent: String::new(),
            before: None,
            after: None,
            transport,
        }
    }

    pub fn from_config(config: &RestConfig) -> Self {
        let transport = UreqTransport::new(config.max_idle_connections_per_host);
        let rest = Self::with_transport(Arc::new(transport)).base_url(&config.base_url);
        match &config.user_agent {
            Some(agent) => rest.user_agent(agent),
            None => rest,
        }
    }

    /// Prefix joined to every request path at send time. Not validated here.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// User agent for every request. An empty value selects
    /// `DEFAULT_USER_AGENT`.
    #[must_use]
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = value.into();
        self
    }

    /// Run `hook` on the fully materialized builder right before dispatch.
    /// Replaces any previous before hook.
    #[must_use]
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RequestBuilder<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Run `hook` on the buffered response. Replaces any previous after hook.
    #[must_use]
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Response) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.after = Some(Arc::new(hook));
        self
    }

    pub fn request(&self, method: HttpMethod, path: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, path.into())
    }

    pub fn options(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(HttpMethod::Options, path)
    }

    pub fn get(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(HttpMethod::Get, path)
    }

    pub fn head(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(HttpMethod::Head, path)
    }

    pub fn post(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(HttpMethod::Post, path)
    }

    pub fn put(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(HttpMethod::Put, path)
    }

    pub fn patch(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(HttpMethod::Patch, path)
    }

    pub fn delete(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(HttpMethod::Delete, path)
    }

    pub fn trace(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(HttpMethod::Trace, path)
    }

    pub fn connect(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(HttpMethod::Connect, path)
    }

    pub(crate) fn base(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn resolved_user_agent(&self) -> &str {
        if self.user_agent.is_empty() {
            DEFAULT_USER_AGENT
        } else {
            &self.user_agent
        }
    }

    pub(crate) fn before_hook(&self) -> Option<&BeforeHook> {
        self.before.as_deref()
    }

    pub(crate) fn after_hook(&self) -> Option<&AfterHook> {
        self.after.as_deref()
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}

impl Default for Rest {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Rest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rest")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.resolved_user_agent())
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish_non_exhaustive()
    }
}
