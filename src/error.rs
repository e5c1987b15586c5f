use reqwest::StatusCode;

/// Everything that can make a single scenario fail.
///
/// The `Display` output is the detail line printed under `[FAIL]`, so the
/// messages follow an "Expected X got Y" shape wherever a value is compared.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("{}", error_chain(.0))]
    Transport(#[source] reqwest::Error),

    #[error("request timed out: {}", error_chain(.0))]
    Timeout(#[source] reqwest::Error),

    #[error("unexpected HTTP status code. Expected {} got {}", .expected.as_u16(), .got.as_u16())]
    Status { expected: StatusCode, got: StatusCode },

    #[error("incorrect value of content length header. Expected {expected} got {}", display_opt(.got))]
    ContentLength { expected: u64, got: Option<u64> },

    #[error("invalid content type header '{value}': {reason}")]
    MalformedMediaType { value: String, reason: String },

    #[error("incorrect value of content type header. Expected '{expected}' got '{got}'")]
    MediaType { expected: String, got: String },

    #[error("incorrect or missing Accept-Ranges header. Expected 'bytes' got '{}'", display_opt(.got))]
    AcceptRanges { got: Option<String> },

    #[error("incorrect or missing Content-Range header. Expected '{expected}' got '{}'", display_opt(.got))]
    ContentRange { expected: String, got: Option<String> },

    #[error("incorrect data length. Expected {expected} got {got}")]
    BodyLength { expected: usize, got: usize },

    #[error("invalid data returned")]
    BodyMismatch,

    #[error("missing multipart boundary")]
    MissingBoundary,

    #[error("unexpected number of data parts returned. Expected {expected} but got at least {got}")]
    ExcessParts { expected: usize, got: usize },

    #[error("unexpected number of data parts returned. Expected {expected} got {got}")]
    MissingParts { expected: usize, got: usize },

    #[error("invalid content type header value in part {part}. Expected '{expected}' got '{}'", display_opt(.got))]
    PartContentType { part: usize, expected: String, got: Option<String> },

    #[error("invalid content range header value in part {part}. Expected '{expected}' got '{}'", display_opt(.got))]
    PartContentRange { part: usize, expected: String, got: Option<String> },

    #[error("invalid data returned in part {part}")]
    PartBody { part: usize },

    #[error("error reading data from part {part}: {}", error_chain(.source))]
    PartRead { part: usize, #[source] source: multer::Error },

    #[error("error decoding multipart body: {}", error_chain(.0))]
    Decode(#[source] multer::Error),
}

impl From<reqwest::Error> for ScenarioError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScenarioError::Timeout(err)
        } else {
            ScenarioError::Transport(err)
        }
    }
}

/// Transport errors raised while multer pulls the response body are classified
/// like any other reqwest error, everything else is a decode error.
impl From<multer::Error> for ScenarioError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::StreamReadFailed(cause) => match cause.downcast::<reqwest::Error>() {
                Ok(err) => ScenarioError::from(*err),
                Err(cause) => ScenarioError::Decode(multer::Error::StreamReadFailed(cause)),
            },
            other => ScenarioError::Decode(other),
        }
    }
}

/// Fatal problems with the reference payload. Raised before any request is sent.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("reference payload is empty")]
    Empty,

    #[error("reference payload is {got} bytes, expected {expected}")]
    Length { expected: usize, got: usize },

    #[error("no media type known for reference payload '{0}'")]
    UnknownMediaType(String),
}

/// Joins an error with its sources, the outermost reqwest message rarely names the cause.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn display_opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "none".to_string(),
    }
}
