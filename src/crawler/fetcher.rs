//! HTTP fetcher implementation
//!
//! This module handles page requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests that time the full round trip including the body
//! - Classifying transport failures so the worker can log and move on

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};
use url::Url;

/// Result of a fetch operation
///
/// Failures are reported as a variant rather than an error so that a bad URL
/// never unwinds the worker that fetched it.
#[derive(Debug)]
pub enum FetchResult {
    /// A response was received (any status code)
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
        /// Time from sending the request to reading the whole body
        elapsed: Duration,
    },

    /// Transport failure (DNS, connection refused, timeout, unreadable body)
    NetworkError {
        /// Error description
        error: String,
        /// Time spent before the failure
        elapsed: Duration,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Page fetch collaborator
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, reporting any fault as [`FetchResult::NetworkError`]
    async fn fetch(&self, url: &Url) -> FetchResult;
}

/// [`PageFetcher`] backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}

/// Formats the user agent string: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Example
///
/// ```no_run
/// use geo_ripple::config::UserAgentConfig;
/// use geo_ripple::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "GeoRipple".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and times the request
///
/// | Condition | Result |
/// |-----------|--------|
/// | Any HTTP response | `Success` with its status code |
/// | Timeout | `NetworkError` |
/// | Connection refused / DNS failure | `NetworkError` |
/// | Body could not be read | `NetworkError` |
///
/// The page fetch itself is never retried; the caller abandons the URL.
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let start = Instant::now();

    let response = match client.get(url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                error: classify_error(&e),
                elapsed: start.elapsed(),
            }
        }
    };

    let status_code = response.status().as_u16();
    let final_url = response.url().to_string();

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code,
            body,
            elapsed: start.elapsed(),
        },
        Err(e) => FetchResult::NetworkError {
            error: format!("Failed to read body: {}", e),
            elapsed: start.elapsed(),
        },
    }
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_redirect() {
        format!("Redirect error: {}", e)
    } else {
        e.to_string()
    }
}
