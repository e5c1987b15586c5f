use axum_extra::headers::{ContentLength, HeaderMapExt};
use bytes::Bytes;
use mime_guess::mime::Mime;
use reqwest::header::{HeaderMap, ACCEPT_RANGES, CONTENT_RANGE, CONTENT_TYPE};
use reqwest::{Response, StatusCode};

use crate::dataset::ReferenceDataset;
use crate::error::ScenarioError;
use crate::multipart::{self, PartDecoder};
use crate::scenario::{ByteSpan, Expectation, RangeScenario};

const MULTIPART_BYTERANGES: &str = "multipart/byteranges";

/// Checks `response` against `scenario`, stopping at the first mismatch.
///
/// The response, including its body, is consumed and released before this
/// returns.
pub async fn validate(
    scenario: &RangeScenario,
    dataset: &ReferenceDataset,
    response: Response,
) -> Result<(), ScenarioError> {
    expect_status(scenario.status, response.status())?;

    match &scenario.expectation {
        Expectation::ErrorStatus => Ok(()),
        Expectation::Metadata => {
            let headers = response.headers();
            expect_content_length(headers, dataset.len())?;
            expect_media_type(headers, dataset.media_type())?;
            expect_accept_ranges(headers)
        }
        Expectation::FullBody => {
            expect_content_length(response.headers(), dataset.len())?;
            expect_media_type(response.headers(), dataset.media_type())?;
            expect_body(response, dataset.bytes().clone()).await
        }
        Expectation::SingleRange(span) => {
            expect_content_length(response.headers(), span.len())?;
            expect_media_type(response.headers(), dataset.media_type())?;
            expect_content_range(response.headers(), span)?;
            expect_body(response, dataset.slice(span)).await
        }
        Expectation::MultiRange(spans) => expect_parts(response, dataset, spans).await,
    }
}

fn expect_status(expected: StatusCode, got: StatusCode) -> Result<(), ScenarioError> {
    if expected != got {
        return Err(ScenarioError::Status { expected, got });
    }
    Ok(())
}

fn expect_content_length(headers: &HeaderMap, expected: u64) -> Result<(), ScenarioError> {
    let got = headers.typed_get::<ContentLength>().map(|ContentLength(len)| len);
    if got != Some(expected) {
        return Err(ScenarioError::ContentLength { expected, got });
    }
    Ok(())
}

/// Parses `Content-Type`. A missing header is malformed, not a mismatch.
fn media_type(headers: &HeaderMap) -> Result<Mime, ScenarioError> {
    let value = headers
        .get(CONTENT_TYPE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default();

    if value.trim().is_empty() {
        return Err(ScenarioError::MalformedMediaType { value, reason: "no media type".into() });
    }

    value
        .parse::<Mime>()
        .map_err(|e| ScenarioError::MalformedMediaType { reason: e.to_string(), value })
}

fn expect_media_type(headers: &HeaderMap, expected: &str) -> Result<Mime, ScenarioError> {
    let media = media_type(headers)?;
    if !media.essence_str().eq_ignore_ascii_case(expected) {
        return Err(ScenarioError::MediaType {
            expected: expected.to_string(),
            got: media.essence_str().to_string(),
        });
    }
    Ok(media)
}

fn expect_accept_ranges(headers: &HeaderMap) -> Result<(), ScenarioError> {
    let got = header_str(headers, ACCEPT_RANGES);
    if got.as_deref() != Some("bytes") {
        return Err(ScenarioError::AcceptRanges { got });
    }
    Ok(())
}

fn expect_content_range(headers: &HeaderMap, span: &ByteSpan) -> Result<(), ScenarioError> {
    let expected = span.content_range();
    let got = header_str(headers, CONTENT_RANGE);
    if got.as_deref() != Some(expected.as_str()) {
        return Err(ScenarioError::ContentRange { expected, got });
    }
    Ok(())
}

async fn expect_body(response: Response, expected: Bytes) -> Result<(), ScenarioError> {
    let body = response.bytes().await?;
    if body.len() != expected.len() {
        return Err(ScenarioError::BodyLength { expected: expected.len(), got: body.len() });
    }
    if body != expected {
        return Err(ScenarioError::BodyMismatch);
    }
    Ok(())
}

async fn expect_parts(
    response: Response,
    dataset: &ReferenceDataset,
    spans: &[ByteSpan],
) -> Result<(), ScenarioError> {
    let media = expect_media_type(response.headers(), MULTIPART_BYTERANGES)?;
    let boundary = multipart::boundary(&media)?;

    let mut decoder = PartDecoder::new(response.bytes_stream(), boundary);
    while let Some(part) = decoder.next_part().await? {
        let number = part.number();
        let Some(span) = spans.get(number - 1) else {
            return Err(ScenarioError::ExcessParts { expected: spans.len(), got: number });
        };

        let content_type = part.content_type();
        let type_matches = content_type
            .and_then(|value| value.parse::<Mime>().ok())
            .is_some_and(|media| media.essence_str().eq_ignore_ascii_case(dataset.media_type()));
        if !type_matches {
            return Err(ScenarioError::PartContentType {
                part: number,
                expected: dataset.media_type().to_string(),
                got: content_type.map(str::to_string),
            });
        }

        let expected_range = span.content_range();
        if part.content_range() != Some(expected_range.as_str()) {
            return Err(ScenarioError::PartContentRange {
                part: number,
                expected: expected_range,
                got: part.content_range().map(str::to_string),
            });
        }

        if part.bytes().await? != dataset.slice(span) {
            return Err(ScenarioError::PartBody { part: number });
        }
    }

    if decoder.parts_seen() < spans.len() {
        return Err(ScenarioError::MissingParts { expected: spans.len(), got: decoder.parts_seen() });
    }
    Ok(())
}

fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers.get(name).map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}
