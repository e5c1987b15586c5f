use std::time::Duration;

use reqwest::header::RANGE;
use reqwest::{Client, RequestBuilder, Response, Url};

use crate::error::ScenarioError;
use crate::scenario::RangeScenario;

pub const DEFAULT_USER_AGENT: &str = "rangetest/1.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the client owned by a [`Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Deadline for one scenario, from connecting until the body is read.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Sends scenario requests to one target URL.
///
/// The client skips certificate verification so targets with self-signed
/// certificates can be checked. It is owned here and never shared.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
    target: Url,
    timeout: Duration,
}

impl Dispatcher {
    /// Fails only when the client cannot be built, which is fatal for the whole run.
    pub fn new(target: Url, config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Dispatcher { client, target, timeout: config.timeout })
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Builds the request for `scenario` without sending it.
    pub fn request(&self, scenario: &RangeScenario) -> RequestBuilder {
        let mut request = self
            .client
            .request(scenario.method.clone(), self.target.clone())
            .timeout(self.timeout);

        if let Some(range) = &scenario.range {
            request = request.header(RANGE, range);
        }
        request
    }

    /// One round trip. No retries, the first transport error is the result.
    pub async fn send(&self, scenario: &RangeScenario) -> Result<Response, ScenarioError> {
        tracing::debug!(
            scenario = %scenario.name,
            method = %scenario.method,
            range = scenario.range.as_deref().unwrap_or("-"),
            url = %self.target,
            "sending request"
        );

        let response = self.request(scenario).send().await?;

        tracing::debug!(scenario = %scenario.name, status = %response.status(), headers = ?response.headers(), "received response");
        Ok(response)
    }

    /// Deadline applied to every request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
