use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use rangetest::{ClientConfig, Url, DEFAULT_USER_AGENT};

/// Checks that an HTTP server implements Range requests correctly.
///
/// The target URL must serve the reference payload bundled with this tool.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Args {
    /// Absolute URL of the reference payload on the server under test
    #[arg(short = 'u', long = "url", env = "RANGETEST_URL", value_name = "URL", value_parser = parse_absolute_url)]
    pub url: Url,

    /// Deadline for each request, including reading the body
    #[arg(long, env = "RANGETEST_TIMEOUT", value_name = "SECONDS", value_parser = parse_seconds, default_value = "30")]
    pub timeout: Duration,

    /// User-Agent sent with every request
    #[arg(long, env = "RANGETEST_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Exit with status 2 when any scenario fails
    #[arg(long, env = "RANGETEST_STRICT")]
    pub strict: bool,
}

impl Args {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
        }
    }
}

fn parse_absolute_url(s: &str) -> Result<Url> {
    let url = Url::parse(s)?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("unsupported scheme '{}', expected http or https", url.scheme());
    }
    Ok(url)
}

fn parse_seconds(s: &str) -> Result<Duration> {
    let secs: u64 = s.parse()?;
    if secs == 0 {
        bail!("timeout must be at least one second");
    }
    Ok(Duration::from_secs(secs))
}
