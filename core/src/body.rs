//! Outbound entity bodies.
//!
//! # Design
//! A `Body` is either buffered or a stream. Buffered bodies come from
//! in-memory content (byte vectors, strings, `Bytes`, cursors over those),
//! so their length is known and they carry a `SnapshotFactory` that can
//! produce fresh copies for replaying the request. Streams wrap an arbitrary
//! reader: length is unknown (reported as 0) and they can be read once.
//!
//! A buffered body of length zero is normalized to the empty sentinel. That
//! is the only way to say "definitely empty" as opposed to "zero or unknown".

use std::fmt;
use std::io::{self, Cursor, Read};

use bytes::Bytes;

enum Source {
    Empty,
    Buffered(Cursor<Bytes>),
    Stream(Box<dyn Read + Send>),
}

/// Entity body attached to a request.
pub struct Body {
    source: Source,
    content_length: u64,
    snapshot: Option<SnapshotFactory>,
}

impl Body {
    /// The canonical definitely-empty body.
    pub fn empty() -> Self {
        Self {
            source: Source::Empty,
            content_length: 0,
            snapshot: Some(SnapshotFactory {
                content: Bytes::new(),
            }),
        }
    }

    /// Single-use body of unknown length.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            source: Source::Stream(Box::new(reader)),
            content_length: 0,
            snapshot: None,
        }
    }

    fn buffered(content: Bytes) -> Self {
        if content.is_empty() {
            return Self::empty();
        }
        Self {
            content_length: content.len() as u64,
            snapshot: Some(SnapshotFactory {
                content: content.clone(),
            }),
            source: Source::Buffered(Cursor::new(content)),
        }
    }

    /// Length of the body in bytes. `0` means zero or unknown; use
    /// `is_empty_sentinel` to tell them apart.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn is_empty_sentinel(&self) -> bool {
        matches!(self.source, Source::Empty)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.source, Source::Stream(_))
    }

    /// Factory for independent copies of the original content. `None` for
    /// streams.
    pub fn snapshot_factory(&self) -> Option<SnapshotFactory> {
        self.snapshot.clone()
    }

    /// Full content of a buffered body, regardless of how much has been read.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.snapshot.as_ref().map(|s| s.content.as_ref())
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.source {
            Source::Empty => Ok(0),
            Source::Buffered(cursor) => cursor.read(buf),
            Source::Stream(reader) => reader.read(buf),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.source {
            Source::Empty => "empty",
            Source::Buffered(_) => "buffered",
            Source::Stream(_) => "stream",
        };
        f.debug_struct("Body")
            .field("kind", &kind)
            .field("content_length", &self.content_length)
            .finish()
    }
}

/// Produces fresh, independently positioned copies of a buffered body.
#[derive(Clone)]
pub struct SnapshotFactory {
    content: Bytes,
}

impl SnapshotFactory {
    pub fn snapshot(&self) -> Body {
        Body::buffered(self.content.clone())
    }
}

impl fmt::Debug for SnapshotFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotFactory")
            .field("len", &self.content.len())
            .finish()
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Body::buffered(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::buffered(Bytes::from(value))
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::buffered(Bytes::from(value))
    }
}

impl From<&'static [u8]> for Body {
    fn from(value: &'static [u8]) -> Self {
        Body::buffered(Bytes::from_static(value))
    }
}

impl From<&'static str> for Body {
    fn from(value: &'static str) -> Self {
        Body::buffered(Bytes::from_static(value.as_bytes()))
    }
}

// Cursors contribute only their unread remainder.
fn remainder(content: Bytes, position: u64) -> Bytes {
    let start = usize::try_from(position).map_or(content.len(), |p| p.min(content.len()));
    content.slice(start..)
}

impl From<Cursor<Vec<u8>>> for Body {
    fn from(value: Cursor<Vec<u8>>) -> Self {
        let position = value.position();
        Body::buffered(remainder(Bytes::from(value.into_inner()), position))
    }
}

impl From<Cursor<String>> for Body {
    fn from(value: Cursor<String>) -> Self {
        let position = value.position();
        Body::buffered(remainder(Bytes::from(value.into_inner()), position))
    }
}

impl From<Cursor<&'static [u8]>> for Body {
    fn from(value: Cursor<&'static [u8]>) -> Self {
        let position = value.position();
        Body::buffered(remainder(Bytes::from_static(value.into_inner()), position))
    }
}
