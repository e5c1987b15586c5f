use bytes::Bytes;

use crate::error::DatasetError;
use crate::scenario::ByteSpan;

/// File name of the bundled payload. The media type is derived from it.
const EMBEDDED_NAME: &str = "data.txt";

/// Size every target is expected to serve for the bundled payload.
pub const EMBEDDED_LEN: usize = 500;

static EMBEDDED: &[u8] = include_bytes!("../assets/data.txt");

/// The resource the target is expected to serve, byte for byte.
///
/// Cloning is cheap, the payload is reference counted and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDataset {
    bytes: Bytes,
    media_type: String,
}

impl ReferenceDataset {
    /// Loads the payload compiled into the binary.
    pub fn embedded() -> Result<Self, DatasetError> {
        let media_type = mime_guess::from_path(EMBEDDED_NAME)
            .first()
            .ok_or_else(|| DatasetError::UnknownMediaType(EMBEDDED_NAME.to_string()))?;
        let dataset = ReferenceDataset::new(Bytes::from_static(EMBEDDED), media_type.essence_str())?;

        if dataset.len() != EMBEDDED_LEN as u64 {
            return Err(DatasetError::Length { expected: EMBEDDED_LEN, got: dataset.bytes.len() });
        }

        tracing::debug!(len = dataset.len(), media_type = %dataset.media_type, "loaded reference payload");
        Ok(dataset)
    }

    /// Wraps an arbitrary payload. Must not be empty.
    pub fn new(bytes: impl Into<Bytes>, media_type: impl Into<String>) -> Result<Self, DatasetError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(ReferenceDataset { bytes, media_type: media_type.into() })
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Media type without parameters, e.g. `text/plain`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The bytes covered by `span`, clamped to the payload.
    pub fn slice(&self, span: &ByteSpan) -> Bytes {
        let len = self.bytes.len();
        let start = usize::try_from(span.start).unwrap_or(len).min(len);
        let end = usize::try_from(span.end_exclusive()).unwrap_or(len).min(len).max(start);
        self.bytes.slice(start..end)
    }
}
