//! Local servers for the conformance tests.
//!
//! [`Behavior::Conforming`] answers range requests the way RFC 7233 asks for,
//! the other behaviors break one rule each.

use std::ops::Bound;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use axum_extra::headers::{HeaderMapExt, Range};
use bytes::{Bytes, BytesMut};
use rangetest::{ReferenceDataset, Url};
use tokio::task::JoinHandle;

const BOUNDARY: &str = "RANGE_BOUNDARY-3d6b6a416f9b5";

// small chunks so part boundaries land in the middle of reads
const CHUNK_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Conforming,
    /// Always answers 200 with the whole payload.
    IgnoreRanges,
    /// Sends multipart parts last to first.
    ReversedParts,
    /// Sends only the first part of a multipart answer.
    FirstPartOnly,
    /// Never answers within any reasonable deadline.
    Stall,
    /// Sends multipart headers and the first chunk of the body, then stalls.
    StallMidBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub method: Method,
    pub range: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone)]
struct Served {
    data: Bytes,
    media_type: String,
    behavior: Behavior,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

pub struct TestServer {
    pub url: Url,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn(behavior: Behavior) -> TestServer {
        let dataset = ReferenceDataset::embedded().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = Served {
            data: dataset.bytes().clone(),
            media_type: dataset.media_type().to_string(),
            behavior,
            seen: seen.clone(),
        };

        let app = Router::new().route("/data.txt", get(serve)).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let url = Url::parse(&format!("http://{}/data.txt", addr)).unwrap();
        TestServer { url, seen, handle }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(State(state): State<Served>, method: Method, headers: HeaderMap) -> Response {
    let text = |name: header::HeaderName| headers.get(name).and_then(|v: &HeaderValue| v.to_str().ok()).map(str::to_string);
    state.seen.lock().unwrap().push(SeenRequest {
        method,
        range: text(header::RANGE),
        user_agent: text(header::USER_AGENT),
    });

    if state.behavior == Behavior::Stall {
        tokio::time::sleep(Duration::from_secs(30)).await;
    }

    // an unknown unit fails to decode and is treated like no header at all
    let range = match headers.typed_try_get::<Range>() {
        Ok(Some(range)) if state.behavior != Behavior::IgnoreRanges => range,
        _ => return full(&state),
    };

    let len = state.data.len() as u64;
    let mut spans: Vec<(u64, u64)> = range
        .satisfiable_ranges(len)
        .filter_map(|bounds| resolve(bounds, len))
        .collect();

    match spans.len() {
        0 => {
            let headers = [(header::CONTENT_RANGE, format!("bytes */{}", len))];
            (StatusCode::RANGE_NOT_SATISFIABLE, headers).into_response()
        }
        1 => single(&state, spans[0]),
        _ => {
            match state.behavior {
                Behavior::ReversedParts => spans.reverse(),
                Behavior::FirstPartOnly => spans.truncate(1),
                _ => {}
            }
            multiple(&state, &spans)
        }
    }
}

/// Inclusive start and end, or `None` when the range lies past the end.
fn resolve((start, end): (Bound<u64>, Bound<u64>), len: u64) -> Option<(u64, u64)> {
    let start = match start {
        Bound::Included(start) => start,
        Bound::Excluded(start) => start + 1,
        Bound::Unbounded => 0,
    };
    let end = match end {
        Bound::Included(end) => end.min(len - 1),
        Bound::Excluded(end) => end.saturating_sub(1).min(len - 1),
        Bound::Unbounded => len - 1,
    };
    if start >= len || start > end {
        return None;
    }
    Some((start, end))
}

fn full(state: &Served) -> Response {
    let headers = [
        (header::ACCEPT_RANGES, "bytes".to_string()),
        (header::CONTENT_TYPE, state.media_type.clone()),
        (header::CONTENT_LENGTH, state.data.len().to_string()),
    ];
    (StatusCode::OK, headers, state.data.clone()).into_response()
}

fn single(state: &Served, (start, end): (u64, u64)) -> Response {
    let body = state.data.slice(start as usize..=end as usize);
    let headers = [
        (header::ACCEPT_RANGES, "bytes".to_string()),
        (header::CONTENT_TYPE, state.media_type.clone()),
        (header::CONTENT_RANGE, format!("bytes {}-{}/{}", start, end, state.data.len())),
        (header::CONTENT_LENGTH, body.len().to_string()),
    ];
    (StatusCode::PARTIAL_CONTENT, headers, body).into_response()
}

fn multiple(state: &Served, spans: &[(u64, u64)]) -> Response {
    let mut wire = BytesMut::new();
    for (i, (start, end)) in spans.iter().enumerate() {
        if i > 0 {
            wire.extend_from_slice(b"\r\n");
        }
        wire.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        wire.extend_from_slice(
            format!(
                "Content-Type: {}\r\nContent-Range: bytes {}-{}/{}\r\n\r\n",
                state.media_type,
                start,
                end,
                state.data.len()
            )
            .as_bytes(),
        );
        wire.extend_from_slice(&state.data[*start as usize..=*end as usize]);
    }
    wire.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    let wire = wire.freeze();

    let stall = state.behavior == Behavior::StallMidBody;
    let body = async_stream::stream! {
        for chunk in wire.chunks(CHUNK_LEN) {
            yield Ok::<_, std::io::Error>(Bytes::copy_from_slice(chunk));
            if stall {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        }
    };

    let headers = [
        (header::ACCEPT_RANGES, "bytes".to_string()),
        (header::CONTENT_TYPE, format!("multipart/byteranges; boundary={}", BOUNDARY)),
    ];
    (StatusCode::PARTIAL_CONTENT, headers, Body::from_stream(body)).into_response()
}
