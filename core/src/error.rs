//! Error types for the request pipeline.
//!
//! # Design
//! Every failure surfaces to the caller of the operation that detected it.
//! Nothing in this crate retries or recovers locally. Transport errors are
//! carried verbatim so callers can downcast to the concrete transport error.

use thiserror::Error;

/// Boxed error used at the transport and hook seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by `RequestBuilder::send` and `Response::json`.
#[derive(Debug, Error)]
pub enum RestError {
    /// Base URL plus path did not resolve. Raised before any network
    /// activity.
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: UrlError,
    },

    /// A header name or value could not be represented on the wire.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The JSON payload or a record of parameters could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The transport failed to execute the request.
    #[error(transparent)]
    Transport(BoxError),

    /// The response body could not be read to the end.
    #[error("reading response body failed: {0}")]
    Io(#[from] std::io::Error),

    /// The response body does not match the requested shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A before or after hook returned an error.
    #[error("hook failed: {0}")]
    Hook(#[source] BoxError),

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a joined base URL and path was rejected.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error(transparent)]
    Parse(#[from] url::ParseError),

    /// Tab, newline or any other control character in the input.
    #[error("unescaped control character {0:?}")]
    ControlCharacter(char),

    #[error("{}", .0.description())]
    Syntax(url::SyntaxViolation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_is_transparent() {
        let err = RestError::Transport("connection refused".into());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn invalid_url_names_the_input() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = RestError::InvalidUrl {
            url: "not a url".to_string(),
            source: source.into(),
        };
        assert!(err.to_string().starts_with("invalid url \"not a url\""));
    }

    #[test]
    fn control_character_is_shown_escaped() {
        let err = RestError::InvalidUrl {
            url: "http://a\nb".to_string(),
            source: UrlError::ControlCharacter('\n'),
        };
        assert!(err.to_string().ends_with("unescaped control character '\\n'"));
    }
}
