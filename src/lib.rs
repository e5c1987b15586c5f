//! # rangetest
//!
//! Conformance checks for HTTP [Range requests][1] against a known payload.
//!
//! A [`Suite`] sends a fixed battery of requests, one per [`RangeScenario`],
//! to a server that serves the [`ReferenceDataset`] and checks status codes,
//! `Content-Length`, `Content-Type`, `Content-Range`, `Accept-Ranges` and the
//! body bytes of every answer. `multipart/byteranges` bodies are decoded part
//! by part with [`PartDecoder`].
//!
//! ```no_run
//! use rangetest::{ClientConfig, Dispatcher, ReferenceDataset, Suite};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let dataset = ReferenceDataset::embedded()?;
//!     let target = "https://localhost:8443/data.txt".parse()?;
//!     let dispatcher = Dispatcher::new(target, &ClientConfig::default())?;
//!
//!     let report = Suite::new(dispatcher, dataset)
//!         .run(&mut std::io::stdout())
//!         .await?;
//!     println!("{} of {} passed", report.passed(), report.outcomes.len());
//!     Ok(())
//! }
//! ```
//!
//! Scenarios are plain data, so checks beyond the standard [`catalog`] are a
//! matter of building more [`RangeScenario`] values and handing them to
//! [`Suite::with_scenarios`].
//!
//! [1]: https://www.rfc-editor.org/rfc/rfc7233

mod dataset;
mod dispatch;
mod error;
mod multipart;
mod scenario;
mod suite;
mod validate;

pub use dataset::{ReferenceDataset, EMBEDDED_LEN};
pub use dispatch::{ClientConfig, Dispatcher, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use error::{DatasetError, ScenarioError};
pub use multipart::{boundary, DecodedPart, Part, PartDecoder};
pub use scenario::{catalog, ByteSpan, Expectation, RangeScenario};
pub use suite::{Report, Suite, ValidationOutcome};
pub use validate::validate;

pub use reqwest::Url;
