//! Fluent, blocking HTTP request builder.
//!
//! # Overview
//! A `Rest` client holds a base URL, a default user agent, optional hooks
//! and a shared transport. Its verb factories hand out `RequestBuilder`s that
//! accumulate headers, query and form parameters, a JSON payload or a raw
//! body. `send` turns that into one request, dispatches it and returns a
//! fully buffered `Response`.
//!
//! ```no_run
//! use rest_core::Rest;
//!
//! let rest = Rest::new().base_url("http://example.test");
//! let res = rest.get("/items").query("page", "1").send()?;
//! println!("{} {}", res.status(), res.text());
//! # Ok::<(), rest_core::RestError>(())
//! ```
//!
//! # Design
//! - Configuration calls only record. Encoding, validation and body
//!   negotiation happen in `send`.
//! - `send` consumes the builder, so a builder is dispatched at most once.
//! - The network sits behind the `Transport` trait. `UreqTransport` is the
//!   default; tests plug in their own.
//! - Buffered bodies carry a `SnapshotFactory` so a transport can replay
//!   them; streams are single-use.

pub mod body;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod request;
pub mod response;
pub mod transport;

pub use body::{Body, SnapshotFactory};
pub use client::{Rest, DEFAULT_USER_AGENT};
pub use config::RestConfig;
pub use error::{BoxError, RestError, UrlError};
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::Params;
pub use request::RequestBuilder;
pub use response::Response;
pub use transport::{Transport, UreqTransport};
