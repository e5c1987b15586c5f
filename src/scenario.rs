use reqwest::{Method, StatusCode};

/// A satisfied byte range as a server reports it in `Content-Range`.
/// Both ends are inclusive, like the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ByteSpan {
    pub fn new(start: u64, end: u64, total: u64) -> Self {
        ByteSpan { start, end, total }
    }

    /// The last `n` bytes of a resource of `total` bytes.
    pub fn suffix(n: u64, total: u64) -> Self {
        ByteSpan::new(total.saturating_sub(n), total.saturating_sub(1), total)
    }

    /// Everything from `start` to the end of a resource of `total` bytes.
    pub fn from_start(start: u64, total: u64) -> Self {
        ByteSpan::new(start, total.saturating_sub(1), total)
    }

    pub fn end_exclusive(&self) -> u64 {
        self.end + 1
    }

    pub fn len(&self) -> u64 {
        self.end_exclusive().saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact `Content-Range` value a conforming server sends for this span.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// What a scenario asserts beyond the status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// HEAD probe: length, media type and `Accept-Ranges: bytes`, no body.
    Metadata,
    /// The whole payload in a plain response.
    FullBody,
    /// One `Content-Range` and the matching slice as the body.
    SingleRange(ByteSpan),
    /// A `multipart/byteranges` body with one part per span, in order.
    MultiRange(Vec<ByteSpan>),
    /// Status code only.
    ErrorStatus,
}

/// One request to issue and the response shape it must produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeScenario {
    pub name: String,
    pub method: Method,
    pub range: Option<String>,
    pub status: StatusCode,
    pub expectation: Expectation,
}

impl RangeScenario {
    pub fn get(name: impl Into<String>) -> Self {
        RangeScenario::with_method(name, Method::GET)
    }

    pub fn head(name: impl Into<String>) -> Self {
        RangeScenario::with_method(name, Method::HEAD)
    }

    fn with_method(name: impl Into<String>, method: Method) -> Self {
        RangeScenario {
            name: name.into(),
            method,
            range: None,
            status: StatusCode::OK,
            expectation: Expectation::FullBody,
        }
    }

    /// Sets the raw `Range` header value sent with the request.
    pub fn range(mut self, value: impl Into<String>) -> Self {
        self.range = Some(value.into());
        self
    }

    pub fn expect(mut self, status: StatusCode, expectation: Expectation) -> Self {
        self.status = status;
        self.expectation = expectation;
        self
    }
}

/// The fixed battery run against a resource of `len` bytes, in report order.
pub fn catalog(len: u64) -> Vec<RangeScenario> {
    let tail = ByteSpan::suffix(100, len);

    vec![
        RangeScenario::head("HEAD request")
            .expect(StatusCode::OK, Expectation::Metadata),
        RangeScenario::get("Get all data without range")
            .expect(StatusCode::OK, Expectation::FullBody),
        RangeScenario::get("Get all data with range")
            .range("bytes=0-")
            .expect(StatusCode::PARTIAL_CONTENT, Expectation::SingleRange(ByteSpan::from_start(0, len))),
        RangeScenario::get("Get single absolute range")
            .range("bytes=0-99")
            .expect(StatusCode::PARTIAL_CONTENT, Expectation::SingleRange(ByteSpan::new(0, 99, len))),
        RangeScenario::get("Get single relative range with start index")
            .range("bytes=400-")
            .expect(StatusCode::PARTIAL_CONTENT, Expectation::SingleRange(ByteSpan::from_start(400, len))),
        RangeScenario::get("Get single relative range with end index")
            .range("bytes=-100")
            .expect(StatusCode::PARTIAL_CONTENT, Expectation::SingleRange(tail)),
        RangeScenario::get("Get multiple absolute ranges")
            .range("bytes=0-99,200-299,400-499")
            .expect(StatusCode::PARTIAL_CONTENT, Expectation::MultiRange(vec![
                ByteSpan::new(0, 99, len),
                ByteSpan::new(200, 299, len),
                ByteSpan::new(400, 499, len),
            ])),
        RangeScenario::get("Get multiple absolute and relative ranges")
            .range("bytes=0-99,-100")
            .expect(StatusCode::PARTIAL_CONTENT, Expectation::MultiRange(vec![
                ByteSpan::new(0, 99, len),
                tail,
            ])),
        // unknown units must be ignored, RFC 7233 section 3.1
        RangeScenario::get("Unsupported unit type")
            .range("centimeters=0-")
            .expect(StatusCode::OK, Expectation::FullBody),
        RangeScenario::get("Index out of range")
            .range(format!("bytes={}-{}", len + 200, len + 300))
            .expect(StatusCode::RANGE_NOT_SATISFIABLE, Expectation::ErrorStatus),
    ]
}
