//! Buffered, read-only view over a completed exchange.

use std::borrow::Cow;
use std::io::Read;

use bytes::Bytes;
use http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::RestError;
use crate::http::HttpResponse;

/// A response whose body has been read to the end.
///
/// Immutable once returned from `RequestBuilder::send`.
#[derive(Debug, Clone)]
pub struct Response {
    status: String,
    status_code: u16,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Read the whole body, then drop the stream whether or not the read
    /// succeeded.
    pub(crate) fn drain(response: HttpResponse) -> Result<Self, RestError> {
        let HttpResponse {
            status,
            reason,
            headers,
            mut body,
        } = response;

        let mut buf = Vec::new();
        let read = body.read_to_end(&mut buf);
        drop(body);
        read?;

        let status_line = if reason.is_empty() {
            status.to_string()
        } else {
            format!("{status} {reason}")
        };

        Ok(Self {
            status: status_line,
            status_code: status,
            headers,
            body: Bytes::from(buf),
        })
    }

    pub fn raw_body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Status line such as `"200 OK"`.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// First value for `key`, or `""` when absent. Bytes that are not UTF-8
    /// are replaced with U+FFFD.
    pub fn header(&self, key: &str) -> Cow<'_, str> {
        match self.headers.get(key) {
            Some(value) => String::from_utf8_lossy(value.as_bytes()),
            None => Cow::Borrowed(""),
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Deserialize the body as JSON. On failure no value is produced.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RestError> {
        serde_json::from_slice(&self.body).map_err(|e| RestError::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use http::header::{CONTENT_TYPE, SET_COOKIE};
    use http::HeaderValue;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
        count: u32,
    }

    fn response(body: &'static [u8]) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        Response::drain(HttpResponse {
            status: 201,
            reason: "Created".to_string(),
            headers,
            body: Box::new(body),
        })
        .unwrap()
    }

    #[test]
    fn exposes_status_and_body() {
        let res = response(br#"{"name":"bolt","count":3}"#);
        assert_eq!(res.status(), "201 Created");
        assert_eq!(res.status_code(), 201);
        assert_eq!(res.raw_body(), br#"{"name":"bolt","count":3}"#);
        assert_eq!(res.text(), r#"{"name":"bolt","count":3}"#);
    }

    #[test]
    fn header_returns_first_value_or_empty() {
        let res = response(b"");
        assert_eq!(res.header("Content-Type"), "application/json");
        assert_eq!(res.header("set-cookie"), "a=1");
        assert_eq!(res.header("x-missing"), "");
        assert_eq!(res.headers().get_all(SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn header_keeps_obs_text_values() {
        let mut headers = HeaderMap::new();
        headers.insert("x-name", HeaderValue::from_bytes(b"caf\xe9 ok").unwrap());
        headers.insert("x-plain", HeaderValue::from_bytes("caf\u{e9}".as_bytes()).unwrap());
        let res = Response::drain(HttpResponse {
            status: 200,
            reason: "OK".to_string(),
            headers,
            body: Box::new(io::empty()),
        })
        .unwrap();
        assert_eq!(res.header("x-name"), "caf\u{fffd} ok");
        assert_eq!(res.header("x-plain"), "caf\u{e9}");
    }

    #[test]
    fn decodes_json_body() {
        let res = response(br#"{"name":"bolt","count":3}"#);
        let item: Item = res.json().unwrap();
        assert_eq!(
            item,
            Item {
                name: "bolt".to_string(),
                count: 3
            }
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        let res = response(br#"{"name":"bolt""#);
        let err = res.json::<Item>().unwrap_err();
        assert!(matches!(err, RestError::Deserialization(_)));

        let res = response(br#"{"name":"bolt"}"#);
        assert!(matches!(
            res.json::<Item>(),
            Err(RestError::Deserialization(_))
        ));
    }

    #[test]
    fn empty_reason_leaves_bare_code() {
        let res = Response::drain(HttpResponse {
            status: 599,
            reason: String::new(),
            headers: HeaderMap::new(),
            body: Box::new(io::empty()),
        })
        .unwrap();
        assert_eq!(res.status(), "599");
    }
}
