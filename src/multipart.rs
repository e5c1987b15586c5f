//! Decoding of `multipart/byteranges` bodies.
//!
//! Parts come out lazily and in wire order. A decoder reads its stream once,
//! so every response needs its own.

use bytes::Bytes;
use futures::Stream;
use mime_guess::mime::{self, Mime};

use crate::error::ScenarioError;

/// Single pass reader over the parts of one multipart body.
pub struct PartDecoder<'r> {
    inner: multer::Multipart<'r>,
    seen: usize,
}

impl<'r> PartDecoder<'r> {
    pub fn new<S, O, E>(stream: S, boundary: impl Into<String>) -> Self
    where
        S: Stream<Item = Result<O, E>> + Send + 'r,
        O: Into<Bytes> + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>> + 'r,
    {
        PartDecoder { inner: multer::Multipart::new(stream, boundary), seen: 0 }
    }

    /// The next part, or `Ok(None)` once the closing boundary was read.
    ///
    /// The previous [`Part`] must be dropped or consumed before calling this
    /// again.
    pub async fn next_part(&mut self) -> Result<Option<Part<'r>>, ScenarioError> {
        match self.inner.next_field().await? {
            Some(field) => {
                self.seen += 1;
                tracing::debug!(part = self.seen, headers = ?field.headers(), "decoded multipart headers");
                Ok(Some(Part { field, number: self.seen }))
            }
            None => Ok(None),
        }
    }

    /// Number of parts handed out so far.
    pub fn parts_seen(&self) -> usize {
        self.seen
    }
}

/// One body part. Headers are available immediately, the body is read on demand.
pub struct Part<'r> {
    field: multer::Field<'r>,
    number: usize,
}

impl<'r> Part<'r> {
    /// 1-based position of the part within the body.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.field.headers().get(name).and_then(|value| value.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn content_range(&self) -> Option<&str> {
        self.header("content-range")
    }

    /// Reads the part body to the end.
    pub async fn bytes(self) -> Result<Bytes, ScenarioError> {
        let part = self.number;
        self.field.bytes().await.map_err(|err| match ScenarioError::from(err) {
            ScenarioError::Decode(source) => ScenarioError::PartRead { part, source },
            transport => transport,
        })
    }

    pub async fn decode(self) -> Result<DecodedPart, ScenarioError> {
        let content_type = self.content_type().unwrap_or_default().to_string();
        let content_range = self.content_range().unwrap_or_default().to_string();
        let body = self.bytes().await?;
        Ok(DecodedPart { content_type, content_range, body })
    }
}

/// A fully read part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPart {
    pub content_type: String,
    pub content_range: String,
    pub body: Bytes,
}

/// Boundary token of a `multipart/byteranges` media type. Empty tokens count as missing.
pub fn boundary(media_type: &Mime) -> Result<String, ScenarioError> {
    match media_type.get_param(mime::BOUNDARY) {
        Some(token) if !token.as_str().is_empty() => Ok(token.as_str().to_string()),
        _ => Err(ScenarioError::MissingBoundary),
    }
}
